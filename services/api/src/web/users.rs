//! services/api/src/web/users.rs
//!
//! Handler for the user profile upsert.

use axum::{
    extract::{Extension, State},
    response::Json,
};
use classtap_core::{Identity, UserId};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::web::{
    error::{ErrorResponse, HttpError},
    extract::{authorize, ApiJson},
    rest::MessageResponse,
    state::AppState,
};

#[derive(Deserialize, ToSchema)]
pub struct UpsertUserRequest {
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
}

/// Create or overwrite the caller's profile. Served at `PUT /users` and `PUT /logs`.
#[utoipa::path(
    put,
    path = "/users",
    tag = "users",
    request_body = UpsertUserRequest,
    responses(
        (status = 200, description = "Profile saved", body = MessageResponse),
        (status = 400, description = "Missing profile fields", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn upsert_user_handler(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    ApiJson(req): ApiJson<UpsertUserRequest>,
) -> Result<Json<MessageResponse>, HttpError> {
    let user_id = UserId::parse(req.user_id.as_deref())?;
    authorize(&identity, &user_id)?;

    state
        .users
        .upsert_user(
            user_id,
            req.first_name.as_deref(),
            req.last_name.as_deref(),
            req.email.as_deref(),
        )
        .await?;

    Ok(Json(MessageResponse::new("User saved successfully.")))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use classtap_core::ports::MockAttendanceStore;
    use serde_json::json;
    use testresult::TestResult;

    use crate::web::test_helpers::{authed, router_with, send, TEST_USER};

    fn profile() -> serde_json::Value {
        json!({
            "userId": TEST_USER,
            "first_name": "Ada",
            "last_name": "Lovelace",
            "email": "ada@example.com",
        })
    }

    #[tokio::test]
    async fn test_upsert_user_writes_the_profile() -> TestResult {
        let mut store = MockAttendanceStore::new();

        store
            .expect_upsert_user()
            .once()
            .withf(|user| user.user_id.as_str() == TEST_USER && user.first_name == "Ada")
            .return_once(|_| Ok(()));

        let (status, body) =
            send(router_with(store), authed(Method::PUT, "/users", Some(profile()))).await?;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "User saved successfully.");

        Ok(())
    }

    #[tokio::test]
    async fn test_put_logs_is_an_alias_for_user_upsert() -> TestResult {
        let mut store = MockAttendanceStore::new();
        store.expect_upsert_user().once().return_once(|_| Ok(()));

        let (status, _) =
            send(router_with(store), authed(Method::PUT, "/logs", Some(profile()))).await?;

        assert_eq!(status, StatusCode::OK);

        Ok(())
    }

    #[tokio::test]
    async fn test_missing_last_name_returns_400() -> TestResult {
        let mut store = MockAttendanceStore::new();
        store.expect_upsert_user().never();

        let (status, _) = send(
            router_with(store),
            authed(
                Method::PUT,
                "/users",
                Some(json!({ "userId": TEST_USER, "first_name": "Ada", "email": "ada@example.com" })),
            ),
        )
        .await?;

        assert_eq!(status, StatusCode::BAD_REQUEST);

        Ok(())
    }
}
