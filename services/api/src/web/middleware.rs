//! services/api/src/web/middleware.rs
//!
//! Authentication middleware for protecting routes.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use classtap_core::{PortError, ServiceError};
use std::sync::Arc;
use tracing::warn;

use crate::web::{error::HttpError, state::AppState};

/// Middleware that verifies the bearer token and extracts the caller's identity.
///
/// If valid, inserts the `Identity` into request extensions for handlers to use.
/// If missing or rejected, returns 401 Unauthorized.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, HttpError> {
    // 1. Extract the bearer token
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(bearer_token)
        .ok_or(HttpError::Unauthorized("No token provided or malformed"))?;

    // 2. Verify it with the identity provider
    let identity = state.identity.verify_token(token).await.map_err(|e| match e {
        PortError::Unauthorized | PortError::NotFound(_) => {
            warn!("Rejected bearer token: {:?}", e);
            HttpError::Unauthorized("Invalid token")
        }
        other => HttpError::Service(ServiceError::Storage(other)),
    })?;

    // 3. Insert the identity into request extensions
    req.extensions_mut().insert(identity);

    // 4. Continue to the handler
    Ok(next.run(req).await)
}

fn bearer_token(value: &str) -> Option<&str> {
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return None;
    }
    Some(token)
}
