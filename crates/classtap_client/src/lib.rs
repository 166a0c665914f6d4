//! crates/classtap_client/src/lib.rs
//!
//! The client data layer: a typed wrapper over every ClassTAP endpoint.
//! Frontends call these methods and re-fetch the affected listing after a write.

use chrono::{FixedOffset, Utc};
use classtap_core::{Log, Room, RoomId, Student, Week, WeekId};
use reqwest::{Client, RequestBuilder};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    /// The server answered with a non-success status and an `{"error": ...}` body.
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },
}

pub type ClientResult<T> = Result<T, ClientError>;

#[derive(Deserialize)]
struct MessageBody {
    message: String,
}

#[derive(Deserialize)]
struct CreatedRoomBody {
    id: RoomId,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RoomRef<'a> {
    user_id: &'a str,
    room_id: RoomId,
}

/// An authenticated ClassTAP API client.
#[derive(Clone, Debug)]
pub struct ClassTapClient {
    http: Client,
    base_url: String,
    token: String,
}

impl ClassTapClient {
    /// `base_url` is the server root, e.g. `http://localhost:8000`.
    pub fn new(http: Client, base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    /// The week the scanner should log into right now, observed at `offset`.
    pub fn current_week(offset: FixedOffset) -> WeekId {
        WeekId::at(Utc::now(), offset)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> ClientResult<T> {
        let response = request.bearer_auth(&self.token).send().await?;
        let status = response.status();
        debug!("{} {}", status, response.url());

        if status.is_success() {
            return Ok(response.json().await?);
        }

        let message = match response.json::<ErrorBody>().await {
            Ok(body) => body.error,
            Err(_) => status.to_string(),
        };
        Err(ClientError::Api {
            status: status.as_u16(),
            message,
        })
    }

    async fn send_message(&self, request: RequestBuilder) -> ClientResult<String> {
        let body: MessageBody = self.send(request).await?;
        Ok(body.message)
    }

    // --- Students ---

    pub async fn get_students(&self, email: &str) -> ClientResult<Vec<Student>> {
        self.send(self.http.get(self.url("/students")).query(&[("email", email)]))
            .await
    }

    pub async fn upsert_student(&self, email: &str, fields: Map<String, Value>) -> ClientResult<String> {
        self.send_message(
            self.http
                .put(self.url("/students"))
                .query(&[("email", email)])
                .json(&fields),
        )
        .await
    }

    pub async fn delete_student(&self, email: &str) -> ClientResult<String> {
        self.send_message(self.http.delete(self.url("/students")).query(&[("email", email)]))
            .await
    }

    // --- Attendance ---

    /// Logs a scanned identity. Without `week_id` the server picks the current week.
    pub async fn record_attendance(
        &self,
        user_id: &str,
        room_id: RoomId,
        week_id: Option<&WeekId>,
        email: &str,
    ) -> ClientResult<String> {
        let room_id = room_id.to_string();
        let mut query = vec![("userId", user_id), ("roomId", room_id.as_str())];
        if let Some(week_id) = week_id {
            query.push(("weekId", week_id.as_str()));
        }

        self.send_message(
            self.http
                .post(self.url("/logs"))
                .query(&query)
                .json(&json!({ "email": email })),
        )
        .await
    }

    pub async fn list_logs(&self, user_id: &str, room_id: RoomId, week_id: &WeekId) -> ClientResult<Vec<Log>> {
        let room_id = room_id.to_string();
        self.send(self.http.get(self.url("/logs")).query(&[
            ("userId", user_id),
            ("roomId", room_id.as_str()),
            ("weekId", week_id.as_str()),
        ]))
        .await
    }

    pub async fn list_weeks(&self, user_id: &str, room_id: RoomId) -> ClientResult<Vec<Week>> {
        let room_id = room_id.to_string();
        self.send(
            self.http
                .get(self.url("/weeks"))
                .query(&[("userId", user_id), ("roomId", room_id.as_str())]),
        )
        .await
    }

    // --- Users ---

    pub async fn upsert_user(
        &self,
        user_id: &str,
        first_name: &str,
        last_name: &str,
        email: &str,
    ) -> ClientResult<String> {
        self.send_message(self.http.put(self.url("/users")).json(&json!({
            "userId": user_id,
            "first_name": first_name,
            "last_name": last_name,
            "email": email,
        })))
        .await
    }

    // --- Rooms ---

    pub async fn list_active_rooms(&self, user_id: &str) -> ClientResult<Vec<Room>> {
        self.send(self.http.get(self.url("/rooms")).query(&[("userId", user_id)]))
            .await
    }

    pub async fn list_archived_rooms(&self, user_id: &str) -> ClientResult<Vec<Room>> {
        self.send(self.http.get(self.url("/rooms/archive")).query(&[("userId", user_id)]))
            .await
    }

    /// Creates a room and returns its generated id.
    pub async fn create_room(&self, user_id: &str, room_name: &str) -> ClientResult<RoomId> {
        let body: CreatedRoomBody = self
            .send(self.http.put(self.url("/rooms")).json(&json!({
                "userId": user_id,
                "roomName": room_name,
            })))
            .await?;
        Ok(body.id)
    }

    pub async fn rename_room(
        &self,
        user_id: &str,
        room_id: RoomId,
        current_name: Option<&str>,
        new_room_name: &str,
    ) -> ClientResult<String> {
        self.send_message(self.http.post(self.url("/rooms")).json(&json!({
            "userId": user_id,
            "roomId": room_id,
            "roomName": current_name,
            "newRoomName": new_room_name,
        })))
        .await
    }

    pub async fn archive_room(&self, user_id: &str, room_id: RoomId) -> ClientResult<String> {
        self.send_message(
            self.http
                .post(self.url("/rooms/archive"))
                .json(&RoomRef { user_id, room_id }),
        )
        .await
    }

    pub async fn unarchive_room(&self, user_id: &str, room_id: RoomId) -> ClientResult<String> {
        self.send_message(
            self.http
                .post(self.url("/rooms/unarchive"))
                .json(&RoomRef { user_id, room_id }),
        )
        .await
    }

    pub async fn delete_room(&self, user_id: &str, room_id: RoomId) -> ClientResult<String> {
        self.send_message(self.http.delete(self.url("/rooms")).json(&RoomRef { user_id, room_id }))
            .await
    }
}
