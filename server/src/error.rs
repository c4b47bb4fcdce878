use application::AppError;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use error_stack::Report;
use kernel::KernelError;
use serde::Serialize;
use std::process::{ExitCode, Termination};

#[derive(Debug)]
pub struct StackTrace(Report<KernelError>);

impl From<Report<KernelError>> for StackTrace {
    fn from(e: Report<KernelError>) -> Self {
        StackTrace(e)
    }
}

impl Termination for StackTrace {
    fn report(self) -> ExitCode {
        self.0.report()
    }
}

#[derive(Debug)]
pub struct ErrorStatus(Report<AppError>);

impl From<Report<AppError>> for ErrorStatus {
    fn from(e: Report<AppError>) -> Self {
        ErrorStatus(e)
    }
}

#[derive(Serialize)]
struct ErrorBody {
    detail: String,
}

impl IntoResponse for ErrorStatus {
    fn into_response(self) -> axum::response::Response {
        let status = match self.0.current_context() {
            AppError::DeviceNotFound | AppError::UserNotFound => StatusCode::NOT_FOUND,
            AppError::AlreadyRented | AppError::NotRented => StatusCode::CONFLICT,
            AppError::RenterMismatch => StatusCode::FORBIDDEN,
            AppError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::error!("{:?}", self.0);
        }
        let body = ErrorBody {
            detail: self.0.current_context().to_string(),
        };
        (status, Json(body)).into_response()
    }
}
