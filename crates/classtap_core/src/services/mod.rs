//! crates/classtap_core/src/services/mod.rs
//!
//! The attendance components: room lifecycle, attendance recording, and the
//! student and user directories. Each one validates its inputs before it
//! touches the store.

pub mod attendance;
pub mod rooms;
pub mod students;
pub mod users;

pub use attendance::AttendanceService;
pub use rooms::RoomService;
pub use students::StudentDirectory;
pub use users::UserDirectory;

use crate::domain::ValidationError;
use crate::ports::PortError;

/// Errors returned by the component services.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Storage error: {0}")]
    Storage(PortError),
}

impl From<PortError> for ServiceError {
    fn from(err: PortError) -> Self {
        match err {
            PortError::NotFound(what) => Self::NotFound(what),
            other => Self::Storage(other),
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
