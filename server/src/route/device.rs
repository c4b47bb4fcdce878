mod request;
mod response;

use crate::auth::Principal;
use crate::error::ErrorStatus;
use crate::handler::AppModule;
use crate::route::device::request::DeviceListQuery;
use crate::route::device::response::DeviceRentalResponse;
use application::service::{GetDeviceListService, RentDeviceService, ReturnDeviceService};
use application::transfer::{GetDeviceListDto, RentDeviceDto, ReturnDeviceDto};
use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};

pub trait DeviceRouter {
    fn route_device(self) -> Self;
}

impl DeviceRouter for Router<AppModule> {
    fn route_device(self) -> Self {
        self.route(
            "/devices",
            get(
                |State(module): State<AppModule>,
                 _principal: Principal,
                 Query(query): Query<DeviceListQuery>| async move {
                    module
                        .database()
                        .get_device_list(GetDeviceListDto { os: query.os })
                        .await
                        .map(|devices| {
                            Json(
                                devices
                                    .into_iter()
                                    .map(DeviceRentalResponse::from)
                                    .collect::<Vec<_>>(),
                            )
                        })
                        .map_err(ErrorStatus::from)
                },
            ),
        )
        .route(
            "/devices/:id/rent",
            post(
                |State(module): State<AppModule>,
                 Principal(principal): Principal,
                 Path(id): Path<i32>| async move {
                    tracing::info!("user {} rents device {id}", principal.username);
                    module
                        .database()
                        .rent_device(RentDeviceDto {
                            device_id: id,
                            requester_id: principal.id,
                        })
                        .await
                        .map(DeviceRentalResponse::from)
                        .map_err(ErrorStatus::from)
                },
            ),
        )
        .route(
            "/devices/:id/return",
            post(
                |State(module): State<AppModule>,
                 Principal(principal): Principal,
                 Path(id): Path<i32>| async move {
                    tracing::info!("user {} returns device {id}", principal.username);
                    module
                        .database()
                        .return_device(ReturnDeviceDto {
                            device_id: id,
                            requester_id: principal.id,
                        })
                        .await
                        .map(DeviceRentalResponse::from)
                        .map_err(ErrorStatus::from)
                },
            ),
        )
    }
}
