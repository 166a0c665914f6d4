//! services/api/src/adapters/memory.rs
//!
//! An in-process `AttendanceStore`, used for local development and tests.
//! Every operation runs under one lock, which makes each of them atomic.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use classtap_core::domain::{Log, Room, RoomId, Student, UpsertOutcome, User, UserId, Week};
use classtap_core::ports::{AttendanceStore, PortError, PortResult};
use classtap_core::week::WeekId;
use serde_json::{Map, Value};
use tokio::sync::RwLock;
use uuid::Uuid;

struct RoomEntry {
    owner: UserId,
    room: Room,
    weeks: BTreeMap<WeekId, WeekEntry>,
}

struct WeekEntry {
    week: Week,
    logs: Vec<Log>,
}

#[derive(Default)]
struct Collections {
    users: HashMap<UserId, Option<User>>,
    rooms: HashMap<RoomId, RoomEntry>,
    students: HashMap<String, Student>,
}

impl Collections {
    fn owned_room(&self, user_id: &UserId, room_id: RoomId) -> PortResult<&RoomEntry> {
        self.rooms
            .get(&room_id)
            .filter(|entry| &entry.owner == user_id)
            .ok_or_else(|| room_not_found(room_id))
    }

    fn owned_room_mut(&mut self, user_id: &UserId, room_id: RoomId) -> PortResult<&mut RoomEntry> {
        self.rooms
            .get_mut(&room_id)
            .filter(|entry| &entry.owner == user_id)
            .ok_or_else(|| room_not_found(room_id))
    }
}

fn room_not_found(room_id: RoomId) -> PortError {
    PortError::NotFound(format!("Room {} not found", room_id))
}

/// An `AttendanceStore` kept entirely in memory.
#[derive(Default)]
pub struct MemoryAdapter {
    inner: RwLock<Collections>,
}

impl MemoryAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// The stored profile for a user, if one was ever upserted.
    pub async fn user(&self, user_id: &UserId) -> Option<User> {
        self.inner.read().await.users.get(user_id).cloned().flatten()
    }
}

#[async_trait]
impl AttendanceStore for MemoryAdapter {
    async fn upsert_user(&self, user: User) -> PortResult<()> {
        let mut inner = self.inner.write().await;
        inner.users.insert(user.user_id.clone(), Some(user));
        Ok(())
    }

    async fn create_room(
        &self,
        user_id: &UserId,
        room_name: &str,
        created_at: DateTime<Utc>,
    ) -> PortResult<Room> {
        let mut inner = self.inner.write().await;
        inner.users.entry(user_id.clone()).or_insert(None);

        let room = Room {
            id: RoomId::new(),
            room_name: room_name.to_string(),
            archived: false,
            created_at,
        };
        inner.rooms.insert(
            room.id,
            RoomEntry {
                owner: user_id.clone(),
                room: room.clone(),
                weeks: BTreeMap::new(),
            },
        );
        Ok(room)
    }

    async fn get_room(&self, user_id: &UserId, room_id: RoomId) -> PortResult<Room> {
        let inner = self.inner.read().await;
        Ok(inner.owned_room(user_id, room_id)?.room.clone())
    }

    async fn list_rooms(&self, user_id: &UserId, archived: bool) -> PortResult<Vec<Room>> {
        let inner = self.inner.read().await;
        let mut rooms: Vec<Room> = inner
            .rooms
            .values()
            .filter(|entry| &entry.owner == user_id && entry.room.archived == archived)
            .map(|entry| entry.room.clone())
            .collect();
        rooms.sort_by_key(|r| r.created_at);
        Ok(rooms)
    }

    async fn rename_room(
        &self,
        user_id: &UserId,
        room_id: RoomId,
        new_room_name: &str,
    ) -> PortResult<()> {
        let mut inner = self.inner.write().await;
        inner.owned_room_mut(user_id, room_id)?.room.room_name = new_room_name.to_string();
        Ok(())
    }

    async fn set_room_archived(
        &self,
        user_id: &UserId,
        room_id: RoomId,
        archived: bool,
    ) -> PortResult<()> {
        let mut inner = self.inner.write().await;
        inner.owned_room_mut(user_id, room_id)?.room.archived = archived;
        Ok(())
    }

    async fn delete_room(&self, user_id: &UserId, room_id: RoomId) -> PortResult<()> {
        let mut inner = self.inner.write().await;
        inner.owned_room(user_id, room_id)?;
        inner.rooms.remove(&room_id);
        Ok(())
    }

    async fn record_log(
        &self,
        user_id: &UserId,
        room_id: RoomId,
        week_id: &WeekId,
        email: &str,
        timestamp: DateTime<Utc>,
    ) -> PortResult<Log> {
        let mut inner = self.inner.write().await;
        let entry = inner.owned_room_mut(user_id, room_id)?;

        let week = entry
            .weeks
            .entry(week_id.clone())
            .or_insert_with(|| WeekEntry {
                week: Week {
                    id: week_id.clone(),
                    starts_on: week_id.starts_on(),
                    created_at: timestamp,
                },
                logs: Vec::new(),
            });

        let log = Log {
            id: Uuid::new_v4(),
            email: email.to_string(),
            timestamp,
        };
        week.logs.push(log.clone());
        Ok(log)
    }

    async fn list_weeks(&self, user_id: &UserId, room_id: RoomId) -> PortResult<Vec<Week>> {
        let inner = self.inner.read().await;
        Ok(match inner.owned_room(user_id, room_id) {
            Ok(entry) => entry.weeks.values().map(|w| w.week.clone()).collect(),
            Err(_) => Vec::new(),
        })
    }

    async fn list_logs(
        &self,
        user_id: &UserId,
        room_id: RoomId,
        week_id: &WeekId,
    ) -> PortResult<Vec<Log>> {
        let inner = self.inner.read().await;
        Ok(inner
            .owned_room(user_id, room_id)
            .ok()
            .and_then(|entry| entry.weeks.get(week_id))
            .map(|w| w.logs.clone())
            .unwrap_or_default())
    }

    async fn find_students(&self, cix_email: &str) -> PortResult<Vec<Student>> {
        let inner = self.inner.read().await;
        Ok(inner.students.get(cix_email).cloned().into_iter().collect())
    }

    async fn upsert_student(
        &self,
        cix_email: &str,
        fields: Map<String, Value>,
    ) -> PortResult<UpsertOutcome> {
        let mut inner = self.inner.write().await;
        match inner.students.get_mut(cix_email) {
            Some(existing) => {
                existing.fields.extend(fields);
                Ok(UpsertOutcome::Updated)
            }
            None => {
                inner.students.insert(
                    cix_email.to_string(),
                    Student {
                        id: Uuid::new_v4(),
                        cix_email: cix_email.to_string(),
                        fields,
                    },
                );
                Ok(UpsertOutcome::Created)
            }
        }
    }

    async fn delete_student(&self, cix_email: &str) -> PortResult<()> {
        let mut inner = self.inner.write().await;
        inner
            .students
            .remove(cix_email)
            .map(|_| ())
            .ok_or_else(|| PortError::NotFound(format!("Student {} not found", cix_email)))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;
    use testresult::TestResult;

    use super::*;

    fn user(id: &str) -> UserId {
        UserId::parse(Some(id)).unwrap()
    }

    fn week(id: &str) -> WeekId {
        WeekId::parse(Some(id)).unwrap()
    }

    #[tokio::test]
    async fn rooms_are_partitioned_by_archived_flag() -> TestResult {
        let store = MemoryAdapter::new();
        let u1 = user("u1");
        let room = store.create_room(&u1, "Lab A", Utc::now()).await?;

        assert_eq!(store.list_rooms(&u1, false).await?, vec![room.clone()]);
        assert!(store.list_rooms(&u1, true).await?.is_empty());

        store.set_room_archived(&u1, room.id, true).await?;
        assert!(store.list_rooms(&u1, false).await?.is_empty());
        assert_eq!(store.list_rooms(&u1, true).await?.len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn rooms_are_invisible_to_other_users() -> TestResult {
        let store = MemoryAdapter::new();
        let room = store.create_room(&user("u1"), "Lab A", Utc::now()).await?;

        assert!(store.list_rooms(&user("u2"), false).await?.is_empty());
        assert!(matches!(
            store.delete_room(&user("u2"), room.id).await,
            Err(PortError::NotFound(_))
        ));

        Ok(())
    }

    #[tokio::test]
    async fn deleting_a_room_removes_its_weeks_and_logs() -> TestResult {
        let store = MemoryAdapter::new();
        let u1 = user("u1");
        let room = store.create_room(&u1, "Lab A", Utc::now()).await?;
        let w = week("Week of 10-18-2026");
        store.record_log(&u1, room.id, &w, "a@x.edu", Utc::now()).await?;

        store.delete_room(&u1, room.id).await?;

        assert!(store.list_weeks(&u1, room.id).await?.is_empty());
        assert!(store.list_logs(&u1, room.id, &w).await?.is_empty());
        assert!(matches!(
            store.record_log(&u1, room.id, &w, "a@x.edu", Utc::now()).await,
            Err(PortError::NotFound(_))
        ));

        Ok(())
    }

    #[tokio::test]
    async fn repeated_logs_share_one_week() -> TestResult {
        let store = MemoryAdapter::new();
        let u1 = user("u1");
        let room = store.create_room(&u1, "Lab A", Utc::now()).await?;
        let w = week("Week of 10-18-2026");

        for email in ["a@x.edu", "b@x.edu", "c@x.edu"] {
            store.record_log(&u1, room.id, &w, email, Utc::now()).await?;
        }

        assert_eq!(store.list_weeks(&u1, room.id).await?.len(), 1);
        let emails: Vec<_> = store
            .list_logs(&u1, room.id, &w)
            .await?
            .into_iter()
            .map(|l| l.email)
            .collect();
        assert_eq!(emails, ["a@x.edu", "b@x.edu", "c@x.edu"]);

        Ok(())
    }

    #[tokio::test]
    async fn concurrent_student_upserts_leave_one_record() -> TestResult {
        let store = Arc::new(MemoryAdapter::new());

        let tasks: Vec<_> = (0..16)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move {
                    let mut fields = Map::new();
                    fields.insert(format!("field_{}", i), json!(i));
                    store.upsert_student("ada@cix.edu", fields).await
                })
            })
            .collect();

        let mut created = 0;
        for task in tasks {
            if task.await?? == UpsertOutcome::Created {
                created += 1;
            }
        }

        assert_eq!(created, 1);
        let students = store.find_students("ada@cix.edu").await?;
        assert_eq!(students.len(), 1);
        assert_eq!(students[0].fields.len(), 16);

        Ok(())
    }

    #[tokio::test]
    async fn user_upsert_replaces_the_profile() -> TestResult {
        let store = MemoryAdapter::new();
        let u1 = user("u1");
        store.create_room(&u1, "Lab A", Utc::now()).await?;
        assert_eq!(store.user(&u1).await, None);

        for first_name in ["Ada", "Augusta"] {
            store
                .upsert_user(User {
                    user_id: u1.clone(),
                    first_name: first_name.into(),
                    last_name: "Lovelace".into(),
                    email: "ada@example.com".into(),
                })
                .await?;
        }

        assert_eq!(store.user(&u1).await.map(|u| u.first_name), Some("Augusta".into()));
        assert_eq!(store.list_rooms(&u1, false).await?.len(), 1);

        Ok(())
    }
}
