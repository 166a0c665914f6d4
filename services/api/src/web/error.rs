//! services/api/src/web/error.rs
//!
//! Maps service and request errors onto HTTP responses shaped `{"error": "..."}`.

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use classtap_core::{PortError, ServiceError, ValidationError};
use serde::Serialize;
use tracing::error;
use utoipa::ToSchema;

/// The body of every error response.
#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

/// Errors a handler or the auth middleware can return.
#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    #[error(transparent)]
    Service(#[from] ServiceError),

    /// The bearer token is missing, malformed, or rejected by the identity provider.
    #[error("Unauthorized - {0}")]
    Unauthorized(&'static str),

    /// The request body or query string could not be decoded.
    #[error("Malformed request: {0}")]
    Malformed(String),
}

impl HttpError {
    /// Returns the HTTP status code for this error.
    ///
    /// - Validation / malformed input: 400
    /// - Missing or invalid token: 401
    /// - Acting on another user's data: 403
    /// - Missing room or student: 404
    /// - Storage temporarily unreachable: 503
    /// - Anything else: 500
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Malformed(_) | Self::Service(ServiceError::Validation(_)) => {
                StatusCode::BAD_REQUEST
            }
            Self::Unauthorized(_) | Self::Service(ServiceError::Storage(PortError::Unauthorized)) => {
                StatusCode::UNAUTHORIZED
            }
            Self::Service(ServiceError::Forbidden(_)) => StatusCode::FORBIDDEN,
            Self::Service(ServiceError::NotFound(_)) => StatusCode::NOT_FOUND,
            Self::Service(ServiceError::Storage(PortError::Unavailable(_))) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            Self::Service(ServiceError::Storage(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ValidationError> for HttpError {
    fn from(err: ValidationError) -> Self {
        Self::Service(err.into())
    }
}

impl From<JsonRejection> for HttpError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Malformed(rejection.body_text())
    }
}

impl From<QueryRejection> for HttpError {
    fn from(rejection: QueryRejection) -> Self {
        Self::Malformed(rejection.body_text())
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        // Server-side failures are logged in full and reported opaquely.
        let message = match status {
            StatusCode::INTERNAL_SERVER_ERROR => {
                error!("Request failed: {:?}", self);
                "Internal server error.".to_string()
            }
            StatusCode::SERVICE_UNAVAILABLE => {
                error!("Backing service unavailable: {:?}", self);
                "Service temporarily unavailable.".to_string()
            }
            _ => self.to_string(),
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}
