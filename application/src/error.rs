use std::fmt::Display;

use error_stack::Context;

/// Business-level outcome of a rental or directory request. The service
/// layer converts store errors into these; raw store errors never leave
/// the application crate.
#[derive(Debug)]
pub enum AppError {
    DeviceNotFound,
    UserNotFound,
    AlreadyRented,
    NotRented,
    RenterMismatch,
    Internal,
}

impl Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppError::DeviceNotFound => write!(f, "mobile device not found"),
            AppError::UserNotFound => write!(f, "user not found"),
            AppError::AlreadyRented => write!(f, "mobile device already rented"),
            AppError::NotRented => write!(f, "device is not rented"),
            AppError::RenterMismatch => write!(
                f,
                "the user who rented the device and who is trying to return are not the same"
            ),
            AppError::Internal => write!(f, "internal error"),
        }
    }
}

impl Context for AppError {}
