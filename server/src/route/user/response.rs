use application::transfer::{EmployeeDto, UserDto};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct UserResponse {
    id: i32,
    username: String,
    display_name: String,
    email: String,
}

impl From<UserDto> for UserResponse {
    fn from(value: UserDto) -> Self {
        Self {
            id: value.id,
            username: value.username,
            display_name: value.display_name,
            email: value.email,
        }
    }
}

impl IntoResponse for UserResponse {
    fn into_response(self) -> Response {
        (StatusCode::OK, axum::Json(self)).into_response()
    }
}

#[derive(Debug, Serialize)]
pub struct EmployeeResponse {
    id: i32,
    display_name: String,
}

impl From<EmployeeDto> for EmployeeResponse {
    fn from(value: EmployeeDto) -> Self {
        Self {
            id: value.id,
            display_name: value.display_name,
        }
    }
}
