//! services/api/src/web/rest.rs
//!
//! Assembles the REST router and holds the master definition for the OpenAPI
//! specification.

use axum::{
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};
use classtap_core::{Log, Room, RoomId, Student, Week};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi, ToSchema,
};

use crate::web::{
    attendance::{self, RecordAttendanceRequest},
    error::ErrorResponse,
    middleware::require_auth,
    rooms::{self, CreateRoomRequest, CreateRoomResponse, RenameRoomRequest, RoomRequest},
    state::AppState,
    students,
    users::{self, UpsertUserRequest},
};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    info(title = "ClassTAP Attendance API", description = "Rooms, weekly attendance logs, and the student directory."),
    paths(
        students::get_student_handler,
        students::upsert_student_handler,
        students::delete_student_handler,
        attendance::record_attendance_handler,
        attendance::list_logs_handler,
        attendance::list_weeks_handler,
        users::upsert_user_handler,
        rooms::list_active_rooms_handler,
        rooms::list_archived_rooms_handler,
        rooms::create_room_handler,
        rooms::rename_room_handler,
        rooms::archive_room_handler,
        rooms::unarchive_room_handler,
        rooms::delete_room_handler,
    ),
    components(
        schemas(
            Room, RoomId, Week, Log, Student,
            MessageResponse, ErrorResponse, CreateRoomResponse,
            CreateRoomRequest, RenameRoomRequest, RoomRequest,
            RecordAttendanceRequest, UpsertUserRequest
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "rooms", description = "Room lifecycle"),
        (name = "attendance", description = "Weekly attendance logs"),
        (name = "students", description = "Student directory"),
        (name = "users", description = "User profiles")
    )
)]
pub struct ApiDoc;

/// Registers the `bearer_auth` scheme referenced by every path.
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
        );
    }
}

//=========================================================================================
// Shared Response Structs
//=========================================================================================

/// The response payload sent after a successful write.
#[derive(Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

//=========================================================================================
// Router
//=========================================================================================

/// Builds every API route behind the bearer-token middleware.
pub fn api_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route(
            "/students",
            get(students::get_student_handler)
                .put(students::upsert_student_handler)
                .delete(students::delete_student_handler),
        )
        .route(
            "/logs",
            post(attendance::record_attendance_handler)
                .get(attendance::list_logs_handler)
                .put(users::upsert_user_handler),
        )
        .route("/users", put(users::upsert_user_handler))
        .route("/weeks", get(attendance::list_weeks_handler))
        .route(
            "/rooms",
            get(rooms::list_active_rooms_handler)
                .put(rooms::create_room_handler)
                .post(rooms::rename_room_handler)
                .delete(rooms::delete_room_handler),
        )
        .route(
            "/rooms/archive",
            get(rooms::list_archived_rooms_handler).post(rooms::archive_room_handler),
        )
        .route("/rooms/unarchive", post(rooms::unarchive_room_handler))
        .layer(axum_middleware::from_fn_with_state(state.clone(), require_auth))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
