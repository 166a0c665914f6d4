//! crates/classtap_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! Storage and identity verification sit behind these traits so the core
//! stays independent of the database and the identity provider.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockall::automock;
use serde_json::{Map, Value};

use crate::domain::{
    Identity, Log, Room, RoomId, Student, UpsertOutcome, User, UserId, Week, WeekId,
};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Conflicting write: {0}")]
    Conflict(String),
    /// A transient failure: the backing service could not be reached in time.
    #[error("Service unavailable: {0}")]
    Unavailable(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
    #[error("Unauthorized")]
    Unauthorized,
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[automock]
#[async_trait]
pub trait AttendanceStore: Send + Sync {
    // --- Users ---
    /// Writes the user's profile, replacing the fields sent. Never touches their rooms.
    async fn upsert_user(&self, user: User) -> PortResult<()>;

    // --- Rooms ---
    /// Inserts a new active room, creating the owning user record if needed.
    async fn create_room(
        &self,
        user_id: &UserId,
        room_name: &str,
        created_at: DateTime<Utc>,
    ) -> PortResult<Room>;

    async fn get_room(&self, user_id: &UserId, room_id: RoomId) -> PortResult<Room>;

    /// Rooms owned by the user whose `archived` flag equals `archived`.
    async fn list_rooms(&self, user_id: &UserId, archived: bool) -> PortResult<Vec<Room>>;

    async fn rename_room(
        &self,
        user_id: &UserId,
        room_id: RoomId,
        new_room_name: &str,
    ) -> PortResult<()>;

    async fn set_room_archived(
        &self,
        user_id: &UserId,
        room_id: RoomId,
        archived: bool,
    ) -> PortResult<()>;

    /// Removes the room together with all of its weeks and logs.
    async fn delete_room(&self, user_id: &UserId, room_id: RoomId) -> PortResult<()>;

    // --- Weeks and Logs ---
    /// Ensures the week exists and appends one log to it, as a single atomic write.
    async fn record_log(
        &self,
        user_id: &UserId,
        room_id: RoomId,
        week_id: &WeekId,
        email: &str,
        timestamp: DateTime<Utc>,
    ) -> PortResult<Log>;

    async fn list_weeks(&self, user_id: &UserId, room_id: RoomId) -> PortResult<Vec<Week>>;

    async fn list_logs(
        &self,
        user_id: &UserId,
        room_id: RoomId,
        week_id: &WeekId,
    ) -> PortResult<Vec<Log>>;

    // --- Students ---
    async fn find_students(&self, cix_email: &str) -> PortResult<Vec<Student>>;

    /// Inserts the student or merges `fields` into the existing record, atomically.
    async fn upsert_student(
        &self,
        cix_email: &str,
        fields: Map<String, Value>,
    ) -> PortResult<UpsertOutcome>;

    async fn delete_student(&self, cix_email: &str) -> PortResult<()>;
}

#[automock]
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Verifies a bearer token and returns the identity it was issued to.
    async fn verify_token(&self, token: &str) -> PortResult<Identity>;
}
