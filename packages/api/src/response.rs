// ABOUTME: Shared API response types and error-to-status mapping
// ABOUTME: Provides consistent response format across all API endpoints

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json as ResponseJson},
};
use serde::Serialize;

use bountyboard_payments::SettlementError;
use bountyboard_requests::RequestError;
use bountyboard_storage::StorageError;

/// Standard API response wrapper
#[derive(Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        ApiResponse {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: String) -> ApiResponse<()> {
        ApiResponse {
            success: false,
            data: None,
            error: Some(message),
        }
    }
}

/// Error surface for every handler. Validation and authorization carry their
/// message to the client; internal failures do not.
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    fn internal(error: impl std::fmt::Display, public_message: &str) -> Self {
        tracing::error!("Internal error: {}", error);
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, public_message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (
            self.status,
            ResponseJson(ApiResponse::<()>::error(self.message)),
        )
            .into_response()
    }
}

impl From<RequestError> for ApiError {
    fn from(err: RequestError) -> Self {
        match err {
            RequestError::Validation(_) => ApiError::bad_request(err.to_string()),
            RequestError::Authorization(_) => ApiError::forbidden(err.to_string()),
            RequestError::NotFound(_) => ApiError::not_found(err.to_string()),
            RequestError::Storage(inner) => ApiError::internal(inner, "Database error"),
        }
    }
}

impl From<SettlementError> for ApiError {
    fn from(err: SettlementError) -> Self {
        match err {
            SettlementError::Validation(_) => ApiError::bad_request(err.to_string()),
            SettlementError::NotFound(_) => ApiError::not_found(err.to_string()),
            SettlementError::Consistency(inner) => {
                ApiError::internal(inner, "Settlement consistency error")
            }
            SettlementError::Request(inner) => inner.into(),
            SettlementError::Storage(inner) => ApiError::internal(inner, "Database error"),
        }
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound => ApiError::not_found("Record not found"),
            other => ApiError::internal(other, "Database error"),
        }
    }
}

pub type ApiResult<T> = Result<ResponseJson<ApiResponse<T>>, ApiError>;

pub fn ok<T>(data: T) -> ApiResult<T> {
    Ok(ResponseJson(ApiResponse::success(data)))
}
