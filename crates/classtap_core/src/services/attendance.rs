//! Attendance recording: resolve the week for "now" and append a log to it.

use std::sync::Arc;

use chrono::FixedOffset;

use crate::domain::{storable, Log, RoomId, UserId, ValidationError, Week};
use crate::ports::AttendanceStore;
use crate::services::ServiceResult;
use crate::week::{Clock, WeekId};

#[derive(Clone)]
pub struct AttendanceService {
    store: Arc<dyn AttendanceStore>,
    clock: Arc<dyn Clock>,
    week_offset: FixedOffset,
}

impl AttendanceService {
    /// `week_offset` is the UTC offset at which calendar weeks are observed.
    pub fn new(store: Arc<dyn AttendanceStore>, clock: Arc<dyn Clock>, week_offset: FixedOffset) -> Self {
        Self {
            store,
            clock,
            week_offset,
        }
    }

    /// The id of the week containing the current instant.
    pub fn current_week(&self) -> WeekId {
        WeekId::at(self.clock.now(), self.week_offset)
    }

    /// Records one attendance event. Without an explicit `week_id` the current week is used.
    pub async fn record_attendance(
        &self,
        user_id: &UserId,
        room_id: RoomId,
        email: Option<&str>,
        week_id: Option<WeekId>,
    ) -> ServiceResult<Log> {
        // The scanned value is stored verbatim, so it is only checked for blankness.
        let email = email
            .filter(|e| !e.trim().is_empty())
            .ok_or(ValidationError::Missing("email"))?;
        storable("email", email)?;

        let now = self.clock.now();
        let week_id = week_id.unwrap_or_else(|| WeekId::at(now, self.week_offset));

        let log = self
            .store
            .record_log(user_id, room_id, &week_id, email, now)
            .await?;
        Ok(log)
    }

    /// Weeks recorded for a room, earliest first.
    pub async fn list_weeks(&self, user_id: &UserId, room_id: RoomId) -> ServiceResult<Vec<Week>> {
        let mut weeks = self.store.list_weeks(user_id, room_id).await?;
        weeks.sort_by_key(|w| w.starts_on);
        Ok(weeks)
    }

    /// Logs recorded in one week of a room, in capture order.
    pub async fn list_logs(
        &self,
        user_id: &UserId,
        room_id: RoomId,
        week_id: &WeekId,
    ) -> ServiceResult<Vec<Log>> {
        let mut logs = self.store.list_logs(user_id, room_id, week_id).await?;
        logs.sort_by_key(|l| l.timestamp);
        Ok(logs)
    }
}
