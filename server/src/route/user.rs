mod response;

use crate::auth::Principal;
use crate::error::ErrorStatus;
use crate::handler::AppModule;
use crate::route::user::response::{EmployeeResponse, UserResponse};
use application::service::GetUserService;
use application::transfer::GetUserDto;
use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};

pub trait UserRouter {
    fn route_user(self) -> Self;
}

impl UserRouter for Router<AppModule> {
    fn route_user(self) -> Self {
        self.route(
            "/users",
            get(
                |State(module): State<AppModule>, _principal: Principal| async move {
                    module
                        .database()
                        .get_user_list()
                        .await
                        .map(|users| {
                            Json(
                                users
                                    .into_iter()
                                    .map(EmployeeResponse::from)
                                    .collect::<Vec<_>>(),
                            )
                        })
                        .map_err(ErrorStatus::from)
                },
            ),
        )
        .route(
            "/users/:id",
            get(
                |State(module): State<AppModule>,
                 _principal: Principal,
                 Path(id): Path<i32>| async move {
                    module
                        .database()
                        .get_user(GetUserDto { id })
                        .await
                        .map(UserResponse::from)
                        .map_err(ErrorStatus::from)
                },
            ),
        )
    }
}
