use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::services::booking::BookingError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Booking(#[from] BookingError),

    #[error("Unauthorized access - invalid token")]
    Unauthorized,

    #[error("invalid request body: {0}")]
    InvalidBody(#[from] JsonRejection),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::InvalidBody(_) => StatusCode::BAD_REQUEST,
            AppError::Booking(e) => match e {
                BookingError::Unauthorized => StatusCode::UNAUTHORIZED,
                BookingError::InvalidRange => StatusCode::BAD_REQUEST,
                BookingError::InvalidInput(_) => StatusCode::BAD_REQUEST,
                BookingError::SlotConflict { .. } => StatusCode::CONFLICT,
                BookingError::NotFound => StatusCode::NOT_FOUND,
                BookingError::DuplicateId(_) => StatusCode::SERVICE_UNAVAILABLE,
                BookingError::StorageUnavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        };

        let message = match &self {
            AppError::Booking(BookingError::StorageUnavailable(msg)) => {
                tracing::error!(error = %msg, "booking storage failure");
                "Internal server error".to_string()
            }
            AppError::Booking(BookingError::DuplicateId(id)) => {
                tracing::warn!(booking_id = %id, "booking id collision");
                self.to_string()
            }
            _ => self.to_string(),
        };

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}
