use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use service::auth::errors::AuthError;
use service::errors::ServiceError;
use service::payments::GatewayError;
use thiserror::Error;
use tracing::{error, warn};

/// JSON error body returned by every handler.
#[derive(Debug, Serialize)]
pub struct JsonApiError {
    #[serde(skip)]
    pub status: StatusCode,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl JsonApiError {
    pub fn new(status: StatusCode, error: &str, message: Option<String>) -> Self {
        Self { status, error: error.to_string(), message }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "Bad Request", Some(message.into()))
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "Unauthorized", Some(message.into()))
    }
}

impl IntoResponse for JsonApiError {
    fn into_response(self) -> Response {
        let status = self.status;
        (status, Json(self)).into_response()
    }
}

impl From<ServiceError> for JsonApiError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::Validation(m) => Self::new(StatusCode::BAD_REQUEST, "Validation Error", Some(m)),
            ServiceError::Model(models::errors::ModelError::Validation(m)) => {
                Self::new(StatusCode::BAD_REQUEST, "Validation Error", Some(m))
            }
            ServiceError::NotFound(m) => Self::new(StatusCode::NOT_FOUND, "Not Found", Some(m)),
            ServiceError::Conflict(m) => Self::new(StatusCode::CONFLICT, "Conflict", Some(m)),
            e @ ServiceError::InsufficientFunds { .. } => {
                Self::new(StatusCode::BAD_REQUEST, "Insufficient wallet balance", Some(e.to_string()))
            }
            ServiceError::Unauthorized(m) => Self::unauthorized(m),
            ServiceError::Gateway(GatewayError::Declined(m)) => {
                warn!(error = %m, "payment declined");
                Self::new(StatusCode::PAYMENT_REQUIRED, "Payment Declined", Some(m))
            }
            ServiceError::Gateway(GatewayError::NotFound(m)) => {
                Self::new(StatusCode::BAD_REQUEST, "Unknown Payment Intent", Some(m))
            }
            ServiceError::Gateway(e @ GatewayError::Transport(_)) => {
                error!(error = %e, "payment gateway unreachable");
                Self::new(StatusCode::BAD_GATEWAY, "Payment Gateway Error", Some(e.to_string()))
            }
            other => {
                error!(error = %other, "internal error");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error", Some(other.to_string()))
            }
        }
    }
}

impl From<models::errors::ModelError> for JsonApiError {
    fn from(e: models::errors::ModelError) -> Self { ServiceError::from(e).into() }
}

impl From<AuthError> for JsonApiError {
    fn from(e: AuthError) -> Self {
        let code = e.code();
        match e {
            AuthError::Validation(m) => Self::new(StatusCode::BAD_REQUEST, "Validation Error", Some(m)),
            AuthError::Conflict => Self::new(StatusCode::CONFLICT, "Conflict", Some("User already exists".into())),
            AuthError::NotFound => Self::new(StatusCode::NOT_FOUND, "Not Found", Some("User not found".into())),
            AuthError::Unauthorized => Self::unauthorized("invalid credentials"),
            AuthError::InvalidToken => Self::unauthorized("invalid or expired token"),
            other => {
                error!(code, error = %other, "auth failure");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error", Some(other.to_string()))
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("runtime check failed: {0}")]
    Runtime(String),
    #[error(transparent)]
    Any(#[from] anyhow::Error),
}
