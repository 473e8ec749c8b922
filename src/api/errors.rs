use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use super::dto::ReadingError;
use crate::reading_store::StoreError;

/// Errors surfaced to HTTP clients as a status code plus a plain-text body.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid request: {0}")]
    InvalidRequest(#[from] ReadingError),
    #[error("device not found: {0}")]
    DeviceNotFound(String),
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(device_id) => Self::DeviceNotFound(device_id),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            Self::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "Invalid Request"),
            Self::DeviceNotFound(_) => (StatusCode::NOT_FOUND, "Device Not Found"),
        };
        (status, body).into_response()
    }
}
