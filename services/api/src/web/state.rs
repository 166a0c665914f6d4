//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use chrono::FixedOffset;
use classtap_core::ports::{AttendanceStore, IdentityProvider};
use classtap_core::services::{AttendanceService, RoomService, StudentDirectory, UserDirectory};
use classtap_core::week::Clock;
use std::sync::Arc;

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub rooms: RoomService,
    pub attendance: AttendanceService,
    pub students: StudentDirectory,
    pub users: UserDirectory,
    pub identity: Arc<dyn IdentityProvider>,
}

impl AppState {
    /// Wires every component service to the one storage handle.
    pub fn new(
        store: Arc<dyn AttendanceStore>,
        identity: Arc<dyn IdentityProvider>,
        clock: Arc<dyn Clock>,
        week_offset: FixedOffset,
    ) -> Self {
        Self {
            rooms: RoomService::new(store.clone(), clock.clone()),
            attendance: AttendanceService::new(store.clone(), clock, week_offset),
            students: StudentDirectory::new(store.clone()),
            users: UserDirectory::new(store),
            identity,
        }
    }
}
