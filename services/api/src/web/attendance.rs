//! services/api/src/web/attendance.rs
//!
//! Handlers for recording attendance (`/logs`) and browsing it (`/logs`, `/weeks`).

use axum::{
    extract::{Extension, State},
    response::Json,
};
use classtap_core::{Identity, Log, RoomId, UserId, Week, WeekId};
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;
use utoipa::{IntoParams, ToSchema};

use crate::web::{
    error::{ErrorResponse, HttpError},
    extract::{authorize, ApiJson, ApiQuery},
    rest::MessageResponse,
    state::AppState,
};

//=========================================================================================
// API Payload Structs
//=========================================================================================

#[derive(Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct LogsQuery {
    pub user_id: Option<String>,
    pub room_id: Option<String>,
    /// `Week of MM-DD-YYYY`. Optional when recording; defaults to the current week.
    pub week_id: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct RecordAttendanceRequest {
    /// The scanned identity string.
    pub email: Option<String>,
}

#[derive(Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct WeeksQuery {
    pub user_id: Option<String>,
    pub room_id: Option<String>,
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// Record one attendance event in a room.
#[utoipa::path(
    post,
    path = "/logs",
    tag = "attendance",
    params(LogsQuery),
    request_body = RecordAttendanceRequest,
    responses(
        (status = 200, description = "Attendance logged", body = MessageResponse),
        (status = 400, description = "Missing or invalid parameters", body = ErrorResponse),
        (status = 404, description = "Room not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn record_attendance_handler(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    ApiQuery(query): ApiQuery<LogsQuery>,
    ApiJson(req): ApiJson<RecordAttendanceRequest>,
) -> Result<Json<MessageResponse>, HttpError> {
    let user_id = UserId::parse(query.user_id.as_deref())?;
    let room_id = RoomId::parse(query.room_id.as_deref())?;
    // A blank weekId means "the current week", same as leaving it out.
    let week_id = match query.week_id.as_deref().filter(|w| !w.trim().is_empty()) {
        Some(raw) => Some(WeekId::parse(Some(raw))?),
        None => None,
    };
    authorize(&identity, &user_id)?;

    let log = state
        .attendance
        .record_attendance(&user_id, room_id, req.email.as_deref(), week_id)
        .await?;
    debug!("Recorded log {} in room {}", log.id, room_id);

    Ok(Json(MessageResponse::new("Attendance logged successfully.")))
}

/// List the logs recorded in one week of a room.
#[utoipa::path(
    get,
    path = "/logs",
    tag = "attendance",
    params(LogsQuery),
    responses(
        (status = 200, description = "Logs for the week", body = [Log]),
        (status = 400, description = "Missing or invalid parameters", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_logs_handler(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    ApiQuery(query): ApiQuery<LogsQuery>,
) -> Result<Json<Vec<Log>>, HttpError> {
    let user_id = UserId::parse(query.user_id.as_deref())?;
    let room_id = RoomId::parse(query.room_id.as_deref())?;
    let week_id = WeekId::parse(query.week_id.as_deref())?;
    authorize(&identity, &user_id)?;

    let logs = state
        .attendance
        .list_logs(&user_id, room_id, &week_id)
        .await?;
    Ok(Json(logs))
}

/// List the weeks with recorded attendance for a room.
#[utoipa::path(
    get,
    path = "/weeks",
    tag = "attendance",
    params(WeeksQuery),
    responses(
        (status = 200, description = "Weeks, earliest first", body = [Week]),
        (status = 400, description = "Missing or invalid parameters", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_weeks_handler(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    ApiQuery(query): ApiQuery<WeeksQuery>,
) -> Result<Json<Vec<Week>>, HttpError> {
    let user_id = UserId::parse(query.user_id.as_deref())?;
    let room_id = RoomId::parse(query.room_id.as_deref())?;
    authorize(&identity, &user_id)?;

    let weeks = state.attendance.list_weeks(&user_id, room_id).await?;
    Ok(Json(weeks))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use classtap_core::ports::MockAttendanceStore;
    use serde_json::json;
    use testresult::TestResult;

    use crate::adapters::MemoryAdapter;
    use crate::web::test_helpers::{authed, router_with, send, TEST_USER};

    use super::*;

    #[tokio::test]
    async fn test_recorded_log_lands_in_the_current_week() -> TestResult {
        let router = router_with(MemoryAdapter::new());

        let (_, created) = send(
            router.clone(),
            authed(
                Method::PUT,
                "/rooms",
                Some(json!({ "userId": TEST_USER, "roomName": "Physics" })),
            ),
        )
        .await?;
        let room_id = created["id"].as_str().unwrap_or_default().to_string();

        let (status, body) = send(
            router.clone(),
            authed(
                Method::POST,
                &format!("/logs?userId={TEST_USER}&roomId={room_id}"),
                Some(json!({ "email": "ada@cix.edu" })),
            ),
        )
        .await?;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Attendance logged successfully.");

        let (status, weeks) = send(
            router.clone(),
            authed(
                Method::GET,
                &format!("/weeks?userId={TEST_USER}&roomId={room_id}"),
                None,
            ),
        )
        .await?;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(weeks.as_array().map(Vec::len), Some(1));
        assert_eq!(weeks[0]["id"], "Week of 10-18-2026");

        let (status, logs) = send(
            router,
            authed(
                Method::GET,
                &format!("/logs?userId={TEST_USER}&roomId={room_id}&weekId=Week%20of%2010-18-2026"),
                None,
            ),
        )
        .await?;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(logs.as_array().map(Vec::len), Some(1));
        assert_eq!(logs[0]["email"], "ada@cix.edu");

        Ok(())
    }

    #[tokio::test]
    async fn test_weeks_for_unknown_room_are_empty() -> TestResult {
        let room_id = RoomId::new();

        let (status, weeks) = send(
            router_with(MemoryAdapter::new()),
            authed(
                Method::GET,
                &format!("/weeks?userId={TEST_USER}&roomId={room_id}"),
                None,
            ),
        )
        .await?;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(weeks, json!([]));

        Ok(())
    }

    #[tokio::test]
    async fn test_record_without_email_returns_400() -> TestResult {
        let mut store = MockAttendanceStore::new();
        store.expect_record_log().never();

        let (status, _) = send(
            router_with(store),
            authed(
                Method::POST,
                &format!("/logs?userId={TEST_USER}&roomId={}", RoomId::new()),
                Some(json!({ "email": "  " })),
            ),
        )
        .await?;

        assert_eq!(status, StatusCode::BAD_REQUEST);

        Ok(())
    }

    #[tokio::test]
    async fn test_explicit_week_id_must_be_a_sunday() -> TestResult {
        let mut store = MockAttendanceStore::new();
        store.expect_record_log().never();

        let (status, _) = send(
            router_with(store),
            authed(
                Method::POST,
                &format!(
                    "/logs?userId={TEST_USER}&roomId={}&weekId=Week%20of%2010-21-2026",
                    RoomId::new()
                ),
                Some(json!({ "email": "ada@cix.edu" })),
            ),
        )
        .await?;

        assert_eq!(status, StatusCode::BAD_REQUEST);

        Ok(())
    }

    #[tokio::test]
    async fn test_list_logs_requires_week_id() -> TestResult {
        let mut store = MockAttendanceStore::new();
        store.expect_list_logs().never();

        let (status, body) = send(
            router_with(store),
            authed(
                Method::GET,
                &format!("/logs?userId={TEST_USER}&roomId={}", RoomId::new()),
                None,
            ),
        )
        .await?;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().is_some());

        Ok(())
    }
}
