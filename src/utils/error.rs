use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::{error, warn};

use crate::models::plate::InvalidPlate;
use crate::store::StoreError;
use crate::utils::response::error as error_response;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Duplicate active ticket: {0}")]
    DuplicateActive(String),

    #[error("Already exited: {0}")]
    AlreadyExited(String),

    #[error("Already paid: {0}")]
    AlreadyPaid(String),

    #[error("Payment before exit: {0}")]
    PayBeforeExit(String),

    #[error("Store unavailable")]
    StoreUnavailable(#[from] StoreError),

    #[error("Internal server error")]
    InternalServerError(String),
}

impl From<InvalidPlate> for AppError {
    fn from(err: InvalidPlate) -> Self {
        AppError::InvalidFormat(err.to_string())
    }
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidFormat(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::DuplicateActive(_)
            | AppError::AlreadyExited(_)
            | AppError::AlreadyPaid(_)
            | AppError::PayBeforeExit(_) => StatusCode::CONFLICT,
            AppError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::InvalidFormat(_) => "INVALID_FORMAT",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::DuplicateActive(_) => "DUPLICATE_ACTIVE",
            AppError::AlreadyExited(_) => "ALREADY_EXITED",
            AppError::AlreadyPaid(_) => "ALREADY_PAID",
            AppError::PayBeforeExit(_) => "PAY_BEFORE_EXIT",
            AppError::StoreUnavailable(_) => "STORE_UNAVAILABLE",
            AppError::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
        }
    }

    fn log(&self) {
        match self {
            AppError::InvalidFormat(msg)
            | AppError::NotFound(msg)
            | AppError::DuplicateActive(msg)
            | AppError::AlreadyExited(msg)
            | AppError::AlreadyPaid(msg)
            | AppError::PayBeforeExit(msg) => {
                warn!(code = self.code(), message = %msg, "Request rejected");
            }
            AppError::StoreUnavailable(e) => {
                error!(error = ?e, "Ticket store unavailable");
            }
            AppError::InternalServerError(msg) => {
                error!(message = %msg, "Internal error");
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

        // Only expose high-level messages to the client
        let public_message = match &self {
            AppError::InvalidFormat(msg)
            | AppError::NotFound(msg)
            | AppError::DuplicateActive(msg)
            | AppError::AlreadyExited(msg)
            | AppError::AlreadyPaid(msg)
            | AppError::PayBeforeExit(msg) => msg.clone(),
            AppError::StoreUnavailable(_) => "The ticket store is unavailable".to_string(),
            AppError::InternalServerError(_) => "Internal server error".to_string(),
        };

        error_response(code, public_message, None, status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflict_variants_map_to_409() {
        for err in [
            AppError::DuplicateActive("x".into()),
            AppError::AlreadyExited("x".into()),
            AppError::AlreadyPaid("x".into()),
            AppError::PayBeforeExit("x".into()),
        ] {
            assert_eq!(err.status_code(), StatusCode::CONFLICT);
        }
    }

    #[test]
    fn boundary_errors_keep_their_http_codes() {
        assert_eq!(
            AppError::InvalidFormat("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::NotFound("x".into()).status_code(),
            StatusCode::NOT_FOUND
        );
    }
}
