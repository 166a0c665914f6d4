//! crates/classtap_core/src/domain.rs
//!
//! Defines the core data structures for attendance tracking.
//! Ownership nests `User -> Room -> Week -> Log`; `Student` records live
//! in their own directory keyed by institutional email.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

pub use crate::week::WeekId;

//=========================================================================================
// Validation
//=========================================================================================

/// A request parameter that is absent or malformed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Missing required parameter: {0}")]
    Missing(&'static str),
    #[error("Invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Returns the trimmed value of a required parameter, rejecting absent or blank input.
pub fn required<'a>(field: &'static str, value: Option<&'a str>) -> Result<&'a str, ValidationError> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => {
            storable(field, v)?;
            Ok(v)
        }
        _ => Err(ValidationError::Missing(field)),
    }
}

/// Rejects text the store cannot hold. Postgres TEXT and JSONB refuse U+0000.
pub fn storable(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.contains('\0') {
        return Err(ValidationError::Invalid {
            field,
            reason: "contains a NUL character".to_string(),
        });
    }
    Ok(())
}

//=========================================================================================
// Identifiers
//=========================================================================================

/// The externally-issued identifier of a user (the identity provider's uid).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn parse(value: Option<&str>) -> Result<Self, ValidationError> {
        required("userId", value).map(|v| Self(v.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A room's generated identifier. Room names are display attributes only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(transparent)]
pub struct RoomId(Uuid);

impl RoomId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn parse(value: Option<&str>) -> Result<Self, ValidationError> {
        let raw = required("roomId", value)?;
        Uuid::parse_str(raw)
            .map(Self)
            .map_err(|e| ValidationError::Invalid {
                field: "roomId",
                reason: e.to_string(),
            })
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for RoomId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for RoomId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for RoomId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

//=========================================================================================
// Entities
//=========================================================================================

/// A user's profile. Rooms are owned through the room collection, not stored here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct User {
    pub user_id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

/// A named attendance-tracked space owned by one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Room {
    pub id: RoomId,
    pub room_name: String,
    pub archived: bool,
    pub created_at: DateTime<Utc>,
}

/// A seven-day attendance bucket, keyed by its starting Sunday.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Week {
    #[cfg_attr(feature = "openapi", schema(value_type = String, example = "Week of 10-18-2026"))]
    pub id: WeekId,
    pub starts_on: NaiveDate,
    pub created_at: DateTime<Utc>,
}

/// One attendance event: the scanned identity plus its server-side capture time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Log {
    pub id: Uuid,
    pub email: String,
    pub timestamp: DateTime<Utc>,
}

/// A directory record keyed by `cix_email`. Any other submitted fields are kept verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Student {
    pub id: Uuid,
    pub cix_email: String,
    #[serde(flatten)]
    #[cfg_attr(feature = "openapi", schema(value_type = Object))]
    pub fields: Map<String, Value>,
}

/// Whether an upsert inserted a new record or merged into an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created,
    Updated,
}

/// The verified caller, as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub uid: UserId,
    pub email: Option<String>,
}

impl Identity {
    pub fn new(uid: impl Into<String>, email: Option<String>) -> Self {
        Self {
            uid: UserId(uid.into()),
            email,
        }
    }
}
