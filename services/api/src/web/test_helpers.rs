//! Fixtures shared by the handler tests.

use axum::{
    body::Body,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        Method, Request, StatusCode,
    },
    Router,
};
use chrono::{FixedOffset, TimeZone, Utc};
use classtap_core::{
    ports::{AttendanceStore, MockIdentityProvider},
    FixedClock, Identity, Room, RoomId,
};
use http_body_util::BodyExt;
use serde_json::Value;
use std::sync::Arc;
use testresult::TestResult;
use tower::ServiceExt;

use crate::web::{api_router, AppState};

pub const TEST_USER: &str = "u1";
pub const TEST_TOKEN: &str = "token-u1";

/// An identity provider that accepts only `TEST_TOKEN`, issued to `TEST_USER`.
pub fn test_identity() -> MockIdentityProvider {
    let mut identity = MockIdentityProvider::new();

    identity
        .expect_verify_token()
        .withf(|token| token == TEST_TOKEN)
        .returning(|_| Ok(Identity::new(TEST_USER, None)));

    identity
}

/// Builds the full API router over `store`, pinned to Wednesday 2026-10-21 15:00 UTC.
pub fn router_with(store: impl AttendanceStore + 'static) -> Router {
    router_with_identity(store, test_identity())
}

pub fn router_with_identity(
    store: impl AttendanceStore + 'static,
    identity: MockIdentityProvider,
) -> Router {
    let clock = FixedClock(Utc.with_ymd_and_hms(2026, 10, 21, 15, 0, 0).unwrap());
    let state = AppState::new(
        Arc::new(store),
        Arc::new(identity),
        Arc::new(clock),
        FixedOffset::east_opt(0).unwrap(),
    );

    api_router(Arc::new(state))
}

/// A request carrying `TEST_TOKEN` and, when given, a JSON body.
pub fn authed(method: Method, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(AUTHORIZATION, format!("Bearer {TEST_TOKEN}"));

    match body {
        Some(json) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Sends one request and decodes the JSON response body.
pub async fn send(router: Router, request: Request<Body>) -> TestResult<(StatusCode, Value)> {
    let response = router.oneshot(request).await?;
    let status = response.status();
    let bytes = response.into_body().collect().await?.to_bytes();

    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)?
    };

    Ok((status, body))
}

pub fn make_room(id: RoomId, name: &str) -> Room {
    Room {
        id,
        room_name: name.to_string(),
        archived: false,
        created_at: Utc.with_ymd_and_hms(2026, 10, 19, 9, 0, 0).unwrap(),
    }
}
