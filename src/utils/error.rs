use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::error;

use crate::utils::response::error as error_response;

pub type AppResult<T> = Result<T, AppError>;

/// Error taxonomy for the booking core. Every operation failure maps to
/// exactly one of these kinds; store internals never reach the client.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Not eligible: {0}")]
    NotEligible(String),

    #[error("Too late to book: {0}")]
    TooLateToBook(String),

    #[error("Insufficient capacity: {0}")]
    InsufficientCapacity(String),

    #[error("Store failure")]
    Store(#[from] sqlx::Error),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::NotEligible(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::TooLateToBook(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::InsufficientCapacity(_) => StatusCode::CONFLICT,
            AppError::Store(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::InvalidRequest(_) => "INVALID_REQUEST",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Conflict(_) => "CONFLICT",
            AppError::NotEligible(_) => "NOT_ELIGIBLE",
            AppError::TooLateToBook(_) => "TOO_LATE_TO_BOOK",
            AppError::InsufficientCapacity(_) => "INSUFFICIENT_CAPACITY",
            AppError::Store(_) => "TRANSIENT_STORE_FAILURE",
        }
    }

    fn log(&self) {
        match self {
            AppError::InvalidRequest(msg)
            | AppError::NotFound(msg)
            | AppError::Conflict(msg)
            | AppError::NotEligible(msg)
            | AppError::TooLateToBook(msg)
            | AppError::InsufficientCapacity(msg) => {
                error!(error = ?self, message = %msg, "Operation rejected");
            }
            AppError::Store(e) => {
                error!(error = ?e, "Store error");
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.code();

        // Log internal details
        self.log();

        // Only expose high-level message to the client
        let public_message = match &self {
            AppError::InvalidRequest(msg)
            | AppError::NotFound(msg)
            | AppError::Conflict(msg)
            | AppError::NotEligible(msg)
            | AppError::TooLateToBook(msg)
            | AppError::InsufficientCapacity(msg) => msg.clone(),
            AppError::Store(_) => {
                "The store could not complete the operation; retry the request".to_string()
            }
        };

        error_response(code, public_message, None, status)
    }
}
