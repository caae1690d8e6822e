//! Response envelope and error mapping.
//!
//! Every response, success or failure, is `{success, error, data}`.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use cosign::core::ValidationError;
use cosign::{CosignError, ErrorClass};
use serde::Serialize;

/// The response body of every endpoint.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub error: String,
    pub data: Option<T>,
}

impl<T: Serialize> Envelope<T> {
    pub fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            error: String::new(),
            data: Some(data),
        })
    }
}

/// A failed request, rendered as an envelope with no data.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

pub fn status_for(err: &CosignError) -> StatusCode {
    match err.class() {
        ErrorClass::Malformed => StatusCode::BAD_REQUEST,
        ErrorClass::NotFound => StatusCode::NOT_FOUND,
        ErrorClass::Upstream if err.is_timeout() => StatusCode::GATEWAY_TIMEOUT,
        ErrorClass::Upstream => StatusCode::BAD_GATEWAY,
        ErrorClass::Storage => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<CosignError> for ApiError {
    fn from(err: CosignError) -> Self {
        let status = status_for(&err);
        if status.is_server_error() {
            tracing::warn!(status = status.as_u16(), error = %err, "request failed");
        } else {
            tracing::debug!(status = status.as_u16(), error = %err, "request rejected");
        }
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        Self::bad_request(err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Envelope::<()> {
            success: false,
            error: self.message,
            data: None,
        };
        (self.status, Json(body)).into_response()
    }
}
