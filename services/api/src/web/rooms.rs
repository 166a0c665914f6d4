//! services/api/src/web/rooms.rs
//!
//! Handlers for the `/rooms` endpoints: room lifecycle and active/archived listings.

use axum::{
    extract::{Extension, State},
    response::Json,
};
use classtap_core::{Identity, Room, RoomId, UserId};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
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
pub struct RoomsQuery {
    /// The owning user's id.
    pub user_id: Option<String>,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomRequest {
    pub user_id: Option<String>,
    pub room_name: Option<String>,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RenameRoomRequest {
    pub user_id: Option<String>,
    pub room_id: Option<String>,
    /// The name the client currently shows for the room.
    pub room_name: Option<String>,
    pub new_room_name: Option<String>,
}

/// Addresses one room; used by archive, unarchive, and delete.
#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoomRequest {
    pub user_id: Option<String>,
    pub room_id: Option<String>,
}

/// The response sent after creating a room.
#[derive(Serialize, Deserialize, ToSchema)]
pub struct CreateRoomResponse {
    pub message: String,
    pub id: RoomId,
}

impl RoomRequest {
    fn parse(&self) -> Result<(UserId, RoomId), HttpError> {
        Ok((
            UserId::parse(self.user_id.as_deref())?,
            RoomId::parse(self.room_id.as_deref())?,
        ))
    }
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// List a user's active rooms.
#[utoipa::path(
    get,
    path = "/rooms",
    tag = "rooms",
    params(RoomsQuery),
    responses(
        (status = 200, description = "Active rooms", body = [Room]),
        (status = 400, description = "Missing userId", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_active_rooms_handler(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    ApiQuery(query): ApiQuery<RoomsQuery>,
) -> Result<Json<Vec<Room>>, HttpError> {
    list_rooms(&state, &identity, query, false).await
}

/// List a user's archived rooms.
#[utoipa::path(
    get,
    path = "/rooms/archive",
    tag = "rooms",
    params(RoomsQuery),
    responses(
        (status = 200, description = "Archived rooms", body = [Room]),
        (status = 400, description = "Missing userId", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_archived_rooms_handler(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    ApiQuery(query): ApiQuery<RoomsQuery>,
) -> Result<Json<Vec<Room>>, HttpError> {
    list_rooms(&state, &identity, query, true).await
}

async fn list_rooms(
    state: &AppState,
    identity: &Identity,
    query: RoomsQuery,
    archived: bool,
) -> Result<Json<Vec<Room>>, HttpError> {
    let user_id = UserId::parse(query.user_id.as_deref())?;
    authorize(identity, &user_id)?;

    let rooms = state.rooms.list_rooms(&user_id, archived).await?;
    Ok(Json(rooms))
}

/// Create a room.
#[utoipa::path(
    put,
    path = "/rooms",
    tag = "rooms",
    request_body = CreateRoomRequest,
    responses(
        (status = 200, description = "Room saved", body = CreateRoomResponse),
        (status = 400, description = "Missing userId or roomName", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_room_handler(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    ApiJson(req): ApiJson<CreateRoomRequest>,
) -> Result<Json<CreateRoomResponse>, HttpError> {
    let user_id = UserId::parse(req.user_id.as_deref())?;
    authorize(&identity, &user_id)?;

    let room = state
        .rooms
        .create_room(&user_id, req.room_name.as_deref())
        .await?;
    info!("Created room {} for user {}", room.id, user_id);

    Ok(Json(CreateRoomResponse {
        message: "Room saved successfully.".to_string(),
        id: room.id,
    }))
}

/// Rename a room.
#[utoipa::path(
    post,
    path = "/rooms",
    tag = "rooms",
    request_body = RenameRoomRequest,
    responses(
        (status = 200, description = "Room renamed", body = MessageResponse),
        (status = 400, description = "Missing parameters or unchanged name", body = ErrorResponse),
        (status = 404, description = "Room not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn rename_room_handler(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    ApiJson(req): ApiJson<RenameRoomRequest>,
) -> Result<Json<MessageResponse>, HttpError> {
    let user_id = UserId::parse(req.user_id.as_deref())?;
    let room_id = RoomId::parse(req.room_id.as_deref())?;
    authorize(&identity, &user_id)?;

    state
        .rooms
        .rename_room(
            &user_id,
            room_id,
            req.room_name.as_deref(),
            req.new_room_name.as_deref(),
        )
        .await?;

    Ok(Json(MessageResponse::new("Room name updated successfully.")))
}

/// Archive a room.
#[utoipa::path(
    post,
    path = "/rooms/archive",
    tag = "rooms",
    request_body = RoomRequest,
    responses(
        (status = 200, description = "Room archived", body = MessageResponse),
        (status = 400, description = "Missing userId or roomId", body = ErrorResponse),
        (status = 404, description = "Room not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn archive_room_handler(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    ApiJson(req): ApiJson<RoomRequest>,
) -> Result<Json<MessageResponse>, HttpError> {
    let (user_id, room_id) = req.parse()?;
    authorize(&identity, &user_id)?;

    state.rooms.archive_room(&user_id, room_id).await?;
    Ok(Json(MessageResponse::new("Room archived successfully.")))
}

/// Restore an archived room to the active listing.
#[utoipa::path(
    post,
    path = "/rooms/unarchive",
    tag = "rooms",
    request_body = RoomRequest,
    responses(
        (status = 200, description = "Room unarchived", body = MessageResponse),
        (status = 400, description = "Missing userId or roomId", body = ErrorResponse),
        (status = 404, description = "Room not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn unarchive_room_handler(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    ApiJson(req): ApiJson<RoomRequest>,
) -> Result<Json<MessageResponse>, HttpError> {
    let (user_id, room_id) = req.parse()?;
    authorize(&identity, &user_id)?;

    state.rooms.unarchive_room(&user_id, room_id).await?;
    Ok(Json(MessageResponse::new("Room unarchived successfully.")))
}

/// Delete a room together with its weeks and logs.
#[utoipa::path(
    delete,
    path = "/rooms",
    tag = "rooms",
    request_body = RoomRequest,
    responses(
        (status = 200, description = "Room deleted", body = MessageResponse),
        (status = 400, description = "Missing userId or roomId", body = ErrorResponse),
        (status = 404, description = "Room not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_room_handler(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    ApiJson(req): ApiJson<RoomRequest>,
) -> Result<Json<MessageResponse>, HttpError> {
    let (user_id, room_id) = req.parse()?;
    authorize(&identity, &user_id)?;

    state.rooms.delete_room(&user_id, room_id).await?;
    info!("Deleted room {} for user {}", room_id, user_id);

    Ok(Json(MessageResponse::new("Room deleted successfully.")))
}
