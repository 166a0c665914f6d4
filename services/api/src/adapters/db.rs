//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `AttendanceStore` port from the `core` crate. It handles all interactions
//! with the PostgreSQL database using `sqlx`.
//!
//! The document hierarchy `users/rooms/weeks/logs` maps onto one table per level,
//! with cascading foreign keys so deleting a room removes its weeks and logs.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use classtap_core::domain::{Log, Room, RoomId, Student, UpsertOutcome, User, UserId, Week};
use classtap_core::ports::{AttendanceStore, PortError, PortResult};
use classtap_core::week::WeekId;
use serde_json::{Map, Value};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `AttendanceStore` port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

/// Classifies a `sqlx` failure into the port's error taxonomy.
fn port_error(err: sqlx::Error) -> PortError {
    match err {
        sqlx::Error::RowNotFound => PortError::NotFound("row not found".to_string()),
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            PortError::Unavailable(err.to_string())
        }
        sqlx::Error::Database(ref db) if db.is_unique_violation() => {
            PortError::Conflict(err.to_string())
        }
        _ => PortError::Unexpected(err.to_string()),
    }
}

fn room_not_found(room_id: RoomId) -> PortError {
    PortError::NotFound(format!("Room {} not found", room_id))
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct RoomRecord {
    id: Uuid,
    room_name: String,
    archived: bool,
    created_at: DateTime<Utc>,
}
impl RoomRecord {
    fn to_domain(self) -> Room {
        Room {
            id: RoomId::from(self.id),
            room_name: self.room_name,
            archived: self.archived,
            created_at: self.created_at,
        }
    }
}

#[derive(FromRow)]
struct WeekRecord {
    week_id: String,
    starts_on: NaiveDate,
    created_at: DateTime<Utc>,
}
impl WeekRecord {
    fn to_domain(self) -> PortResult<Week> {
        let id = WeekId::parse(Some(&self.week_id))
            .map_err(|e| PortError::Unexpected(format!("Stored week id is corrupt: {}", e)))?;
        Ok(Week {
            id,
            starts_on: self.starts_on,
            created_at: self.created_at,
        })
    }
}

#[derive(FromRow)]
struct LogRecord {
    id: Uuid,
    email: String,
    recorded_at: DateTime<Utc>,
}
impl LogRecord {
    fn to_domain(self) -> Log {
        Log {
            id: self.id,
            email: self.email,
            timestamp: self.recorded_at,
        }
    }
}

#[derive(FromRow)]
struct StudentRecord {
    id: Uuid,
    cix_email: String,
    fields: Json<Map<String, Value>>,
}
impl StudentRecord {
    fn to_domain(self) -> Student {
        Student {
            id: self.id,
            cix_email: self.cix_email,
            fields: self.fields.0,
        }
    }
}

//=========================================================================================
// `AttendanceStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl AttendanceStore for DbAdapter {
    async fn upsert_user(&self, user: User) -> PortResult<()> {
        sqlx::query(
            "INSERT INTO users (user_id, first_name, last_name, email) VALUES ($1, $2, $3, $4) \
             ON CONFLICT (user_id) DO UPDATE SET first_name = EXCLUDED.first_name, \
             last_name = EXCLUDED.last_name, email = EXCLUDED.email, updated_at = now()",
        )
        .bind(user.user_id.as_str())
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.email)
        .execute(&self.pool)
        .await
        .map_err(port_error)?;
        Ok(())
    }

    async fn create_room(
        &self,
        user_id: &UserId,
        room_name: &str,
        created_at: DateTime<Utc>,
    ) -> PortResult<Room> {
        let mut tx = self.pool.begin().await.map_err(port_error)?;

        sqlx::query("INSERT INTO users (user_id) VALUES ($1) ON CONFLICT (user_id) DO NOTHING")
            .bind(user_id.as_str())
            .execute(&mut *tx)
            .await
            .map_err(port_error)?;

        let record = sqlx::query_as::<_, RoomRecord>(
            "INSERT INTO rooms (id, user_id, room_name, archived, created_at) \
             VALUES ($1, $2, $3, FALSE, $4) RETURNING id, room_name, archived, created_at",
        )
        .bind(RoomId::new().as_uuid())
        .bind(user_id.as_str())
        .bind(room_name)
        .bind(created_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(port_error)?;

        tx.commit().await.map_err(port_error)?;
        Ok(record.to_domain())
    }

    async fn get_room(&self, user_id: &UserId, room_id: RoomId) -> PortResult<Room> {
        let record = sqlx::query_as::<_, RoomRecord>(
            "SELECT id, room_name, archived, created_at FROM rooms WHERE id = $1 AND user_id = $2",
        )
        .bind(room_id.as_uuid())
        .bind(user_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(port_error)?
        .ok_or_else(|| room_not_found(room_id))?;
        Ok(record.to_domain())
    }

    async fn list_rooms(&self, user_id: &UserId, archived: bool) -> PortResult<Vec<Room>> {
        let records = sqlx::query_as::<_, RoomRecord>(
            "SELECT id, room_name, archived, created_at FROM rooms \
             WHERE user_id = $1 AND archived = $2 ORDER BY created_at ASC",
        )
        .bind(user_id.as_str())
        .bind(archived)
        .fetch_all(&self.pool)
        .await
        .map_err(port_error)?;

        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn rename_room(
        &self,
        user_id: &UserId,
        room_id: RoomId,
        new_room_name: &str,
    ) -> PortResult<()> {
        let result = sqlx::query("UPDATE rooms SET room_name = $3 WHERE id = $1 AND user_id = $2")
            .bind(room_id.as_uuid())
            .bind(user_id.as_str())
            .bind(new_room_name)
            .execute(&self.pool)
            .await
            .map_err(port_error)?;

        if result.rows_affected() == 0 {
            return Err(room_not_found(room_id));
        }
        Ok(())
    }

    async fn set_room_archived(
        &self,
        user_id: &UserId,
        room_id: RoomId,
        archived: bool,
    ) -> PortResult<()> {
        let result = sqlx::query("UPDATE rooms SET archived = $3 WHERE id = $1 AND user_id = $2")
            .bind(room_id.as_uuid())
            .bind(user_id.as_str())
            .bind(archived)
            .execute(&self.pool)
            .await
            .map_err(port_error)?;

        if result.rows_affected() == 0 {
            return Err(room_not_found(room_id));
        }
        Ok(())
    }

    async fn delete_room(&self, user_id: &UserId, room_id: RoomId) -> PortResult<()> {
        // Weeks and logs go with the room through ON DELETE CASCADE.
        let result = sqlx::query("DELETE FROM rooms WHERE id = $1 AND user_id = $2")
            .bind(room_id.as_uuid())
            .bind(user_id.as_str())
            .execute(&self.pool)
            .await
            .map_err(port_error)?;

        if result.rows_affected() == 0 {
            return Err(room_not_found(room_id));
        }
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
        let mut tx = self.pool.begin().await.map_err(port_error)?;

        // Holds the room against a concurrent delete until the log is written.
        sqlx::query("SELECT id FROM rooms WHERE id = $1 AND user_id = $2 FOR SHARE")
            .bind(room_id.as_uuid())
            .bind(user_id.as_str())
            .fetch_optional(&mut *tx)
            .await
            .map_err(port_error)?
            .ok_or_else(|| room_not_found(room_id))?;

        sqlx::query(
            "INSERT INTO weeks (room_id, week_id, starts_on, created_at) VALUES ($1, $2, $3, $4) \
             ON CONFLICT (room_id, week_id) DO NOTHING",
        )
        .bind(room_id.as_uuid())
        .bind(week_id.as_str())
        .bind(week_id.starts_on())
        .bind(timestamp)
        .execute(&mut *tx)
        .await
        .map_err(port_error)?;

        let record = sqlx::query_as::<_, LogRecord>(
            "INSERT INTO logs (id, room_id, week_id, email, recorded_at) VALUES ($1, $2, $3, $4, $5) \
             RETURNING id, email, recorded_at",
        )
        .bind(Uuid::new_v4())
        .bind(room_id.as_uuid())
        .bind(week_id.as_str())
        .bind(email)
        .bind(timestamp)
        .fetch_one(&mut *tx)
        .await
        .map_err(port_error)?;

        tx.commit().await.map_err(port_error)?;
        Ok(record.to_domain())
    }

    async fn list_weeks(&self, user_id: &UserId, room_id: RoomId) -> PortResult<Vec<Week>> {
        let records = sqlx::query_as::<_, WeekRecord>(
            "SELECT w.week_id, w.starts_on, w.created_at FROM weeks w \
             JOIN rooms r ON r.id = w.room_id \
             WHERE w.room_id = $1 AND r.user_id = $2 ORDER BY w.starts_on ASC",
        )
        .bind(room_id.as_uuid())
        .bind(user_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(port_error)?;

        records.into_iter().map(|r| r.to_domain()).collect()
    }

    async fn list_logs(
        &self,
        user_id: &UserId,
        room_id: RoomId,
        week_id: &WeekId,
    ) -> PortResult<Vec<Log>> {
        let records = sqlx::query_as::<_, LogRecord>(
            "SELECT l.id, l.email, l.recorded_at FROM logs l \
             JOIN rooms r ON r.id = l.room_id \
             WHERE l.room_id = $1 AND r.user_id = $2 AND l.week_id = $3 \
             ORDER BY l.recorded_at ASC",
        )
        .bind(room_id.as_uuid())
        .bind(user_id.as_str())
        .bind(week_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(port_error)?;

        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn find_students(&self, cix_email: &str) -> PortResult<Vec<Student>> {
        let records = sqlx::query_as::<_, StudentRecord>(
            "SELECT id, cix_email, fields FROM students WHERE cix_email = $1",
        )
        .bind(cix_email)
        .fetch_all(&self.pool)
        .await
        .map_err(port_error)?;

        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn upsert_student(
        &self,
        cix_email: &str,
        fields: Map<String, Value>,
    ) -> PortResult<UpsertOutcome> {
        // `xmax = 0` holds only for a freshly inserted row version.
        let inserted = sqlx::query_scalar::<_, bool>(
            "INSERT INTO students (id, cix_email, fields) VALUES ($1, $2, $3) \
             ON CONFLICT (cix_email) DO UPDATE SET fields = students.fields || EXCLUDED.fields \
             RETURNING (xmax = 0)",
        )
        .bind(Uuid::new_v4())
        .bind(cix_email)
        .bind(Json(fields))
        .fetch_one(&self.pool)
        .await
        .map_err(port_error)?;

        Ok(if inserted {
            UpsertOutcome::Created
        } else {
            UpsertOutcome::Updated
        })
    }

    async fn delete_student(&self, cix_email: &str) -> PortResult<()> {
        let result = sqlx::query("DELETE FROM students WHERE cix_email = $1")
            .bind(cix_email)
            .execute(&self.pool)
            .await
            .map_err(port_error)?;

        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!("Student {} not found", cix_email)));
        }
        Ok(())
    }
}
