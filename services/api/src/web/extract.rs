//! services/api/src/web/extract.rs
//!
//! Extractors whose rejections use the JSON error shape, plus the ownership check
//! every user-scoped handler runs.

use axum::extract::{FromRequest, FromRequestParts};
use classtap_core::{Identity, ServiceError, UserId};

use crate::web::error::HttpError;

/// `axum::Json` with malformed bodies reported as `HttpError::Malformed`.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(HttpError))]
pub struct ApiJson<T>(pub T);

/// `axum::extract::Query` with malformed query strings reported as `HttpError::Malformed`.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(HttpError))]
pub struct ApiQuery<T>(pub T);

/// Rejects requests whose `userId` is not the authenticated caller.
pub fn authorize(identity: &Identity, user_id: &UserId) -> Result<(), HttpError> {
    if &identity.uid == user_id {
        Ok(())
    } else {
        Err(ServiceError::Forbidden(format!("cannot act on behalf of user {}", user_id)).into())
    }
}
