//! Room lifecycle: create, rename, archive, unarchive, delete, and list.

use std::sync::Arc;

use crate::domain::{required, Room, RoomId, UserId, ValidationError};
use crate::ports::AttendanceStore;
use crate::services::ServiceResult;
use crate::week::Clock;

#[derive(Clone)]
pub struct RoomService {
    store: Arc<dyn AttendanceStore>,
    clock: Arc<dyn Clock>,
}

impl RoomService {
    pub fn new(store: Arc<dyn AttendanceStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Creates an active room. Duplicate names are allowed.
    pub async fn create_room(&self, user_id: &UserId, room_name: Option<&str>) -> ServiceResult<Room> {
        let room_name = required("roomName", room_name)?;
        let room = self
            .store
            .create_room(user_id, room_name, self.clock.now())
            .await?;
        Ok(room)
    }

    /// Renames a room addressed by id.
    ///
    /// `current_name` is the name the caller believes the room has; when it, or the
    /// stored name, already equals `new_room_name` the rename is rejected without a write.
    pub async fn rename_room(
        &self,
        user_id: &UserId,
        room_id: RoomId,
        current_name: Option<&str>,
        new_room_name: Option<&str>,
    ) -> ServiceResult<()> {
        let new_room_name = required("newRoomName", new_room_name)?;
        // The room may be named by the caller or addressed by its id; either counts as the old name.
        if current_name.map(str::trim) == Some(new_room_name)
            || new_room_name == room_id.to_string()
        {
            return Err(same_name().into());
        }

        let room = self.store.get_room(user_id, room_id).await?;
        if room.room_name == new_room_name {
            return Err(same_name().into());
        }

        self.store.rename_room(user_id, room_id, new_room_name).await?;
        Ok(())
    }

    pub async fn archive_room(&self, user_id: &UserId, room_id: RoomId) -> ServiceResult<()> {
        self.store.set_room_archived(user_id, room_id, true).await?;
        Ok(())
    }

    pub async fn unarchive_room(&self, user_id: &UserId, room_id: RoomId) -> ServiceResult<()> {
        self.store.set_room_archived(user_id, room_id, false).await?;
        Ok(())
    }

    /// Deletes the room and everything recorded under it.
    pub async fn delete_room(&self, user_id: &UserId, room_id: RoomId) -> ServiceResult<()> {
        self.store.delete_room(user_id, room_id).await?;
        Ok(())
    }

    pub async fn list_rooms(&self, user_id: &UserId, archived: bool) -> ServiceResult<Vec<Room>> {
        Ok(self.store.list_rooms(user_id, archived).await?)
    }
}

fn same_name() -> ValidationError {
    ValidationError::Invalid {
        field: "newRoomName",
        reason: "New room name is the same as the old one".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use testresult::TestResult;

    use super::*;
    use crate::ports::{MockAttendanceStore, PortError};
    use crate::services::ServiceError;
    use crate::week::FixedClock;

    fn service(store: MockAttendanceStore) -> RoomService {
        let now = Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap();
        RoomService::new(Arc::new(store), Arc::new(FixedClock(now)))
    }

    fn user() -> UserId {
        UserId::parse(Some("u1")).unwrap()
    }

    fn room(id: RoomId, name: &str) -> Room {
        Room {
            id,
            room_name: name.to_string(),
            archived: false,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn create_room_requires_a_name_before_touching_storage() {
        let rooms = service(MockAttendanceStore::new());

        let err = rooms.create_room(&user(), Some("  ")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(ValidationError::Missing("roomName"))));
    }

    #[tokio::test]
    async fn create_room_uses_the_clock_for_created_at() -> TestResult {
        let mut store = MockAttendanceStore::new();
        store
            .expect_create_room()
            .once()
            .withf(|user, name, at| {
                user.as_str() == "u1"
                    && name == "Lab A"
                    && *at == Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap()
            })
            .returning(|_, name, at| {
                Ok(Room {
                    id: RoomId::new(),
                    room_name: name.to_string(),
                    archived: false,
                    created_at: at,
                })
            });

        let created = service(store).create_room(&user(), Some("Lab A")).await?;
        assert_eq!(created.room_name, "Lab A");
        assert!(!created.archived);

        Ok(())
    }

    #[tokio::test]
    async fn rename_to_the_supplied_current_name_never_writes() {
        let rooms = service(MockAttendanceStore::new());

        let err = rooms
            .rename_room(&user(), RoomId::new(), Some("Lab A"), Some("Lab A"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(ValidationError::Invalid { .. })));
    }

    #[tokio::test]
    async fn rename_to_the_room_id_never_writes() {
        let id = RoomId::new();
        let mut store = MockAttendanceStore::new();
        store.expect_get_room().never();
        store.expect_rename_room().never();

        let err = service(store)
            .rename_room(&user(), id, None, Some(&id.to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(ValidationError::Invalid { .. })));
    }

    #[tokio::test]
    async fn rename_to_the_stored_name_never_writes() {
        let id = RoomId::new();
        let mut store = MockAttendanceStore::new();
        store
            .expect_get_room()
            .once()
            .returning(move |_, _| Ok(room(id, "Lab A")));
        store.expect_rename_room().never();

        let err = service(store)
            .rename_room(&user(), id, None, Some("Lab A"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[tokio::test]
    async fn rename_writes_the_new_name() -> TestResult {
        let id = RoomId::new();
        let mut store = MockAttendanceStore::new();
        store
            .expect_get_room()
            .once()
            .returning(move |_, _| Ok(room(id, "Lab A")));
        store
            .expect_rename_room()
            .once()
            .withf(move |_, room_id, name| *room_id == id && name == "Lab B")
            .returning(|_, _, _| Ok(()));

        service(store)
            .rename_room(&user(), id, Some("Lab A"), Some("Lab B"))
            .await?;

        Ok(())
    }

    #[tokio::test]
    async fn rename_of_a_missing_room_is_not_found() {
        let mut store = MockAttendanceStore::new();
        store
            .expect_get_room()
            .once()
            .returning(|_, room_id| Err(PortError::NotFound(format!("Room {room_id}"))));

        let err = service(store)
            .rename_room(&user(), RoomId::new(), None, Some("Lab B"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn archive_and_unarchive_flip_the_flag() -> TestResult {
        let id = RoomId::new();
        let mut store = MockAttendanceStore::new();
        store
            .expect_set_room_archived()
            .once()
            .withf(move |_, room_id, archived| *room_id == id && *archived)
            .returning(|_, _, _| Ok(()));
        store
            .expect_set_room_archived()
            .once()
            .withf(move |_, room_id, archived| *room_id == id && !*archived)
            .returning(|_, _, _| Ok(()));

        let rooms = service(store);
        rooms.archive_room(&user(), id).await?;
        rooms.unarchive_room(&user(), id).await?;

        Ok(())
    }

    #[tokio::test]
    async fn storage_failures_are_not_reported_as_not_found() {
        let mut store = MockAttendanceStore::new();
        store
            .expect_list_rooms()
            .returning(|_, _| Err(PortError::Unavailable("pool timed out".into())));

        let err = service(store).list_rooms(&user(), false).await.unwrap_err();
        assert!(matches!(err, ServiceError::Storage(PortError::Unavailable(_))));
    }
}
