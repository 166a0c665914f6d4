//! services/api/src/web/students.rs
//!
//! Handlers for the `/students` directory, keyed by `cix_email`.

use axum::{extract::State, response::Json};
use classtap_core::{Student, UpsertOutcome};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use utoipa::IntoParams;

use crate::web::{
    error::{ErrorResponse, HttpError},
    extract::{ApiJson, ApiQuery},
    rest::MessageResponse,
    state::AppState,
};

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct StudentQuery {
    /// The student's institutional (`cix_email`) address.
    pub email: Option<String>,
}

/// Look up a student by email.
#[utoipa::path(
    get,
    path = "/students",
    tag = "students",
    params(StudentQuery),
    responses(
        (status = 200, description = "Matching students (zero or one)", body = [Student]),
        (status = 400, description = "Missing email", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_student_handler(
    State(state): State<Arc<AppState>>,
    ApiQuery(query): ApiQuery<StudentQuery>,
) -> Result<Json<Vec<Student>>, HttpError> {
    let students = state.students.get_student(query.email.as_deref()).await?;
    Ok(Json(students))
}

/// Add a student, or merge the submitted fields into the existing record.
#[utoipa::path(
    put,
    path = "/students",
    tag = "students",
    params(StudentQuery),
    request_body(content = Object, description = "Student fields to store or merge."),
    responses(
        (status = 200, description = "Student added or updated", body = MessageResponse),
        (status = 400, description = "Missing email or non-object body", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn upsert_student_handler(
    State(state): State<Arc<AppState>>,
    ApiQuery(query): ApiQuery<StudentQuery>,
    ApiJson(fields): ApiJson<Map<String, Value>>,
) -> Result<Json<MessageResponse>, HttpError> {
    let outcome = state
        .students
        .upsert_student(query.email.as_deref(), fields)
        .await?;

    let message = match outcome {
        UpsertOutcome::Created => "Student added successfully",
        UpsertOutcome::Updated => "Student updated successfully",
    };
    Ok(Json(MessageResponse::new(message)))
}

/// Delete a student by email.
#[utoipa::path(
    delete,
    path = "/students",
    tag = "students",
    params(StudentQuery),
    responses(
        (status = 200, description = "Student deleted", body = MessageResponse),
        (status = 400, description = "Missing email", body = ErrorResponse),
        (status = 404, description = "No student with that email", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_student_handler(
    State(state): State<Arc<AppState>>,
    ApiQuery(query): ApiQuery<StudentQuery>,
) -> Result<Json<MessageResponse>, HttpError> {
    state.students.delete_student(query.email.as_deref()).await?;
    Ok(Json(MessageResponse::new("Student deleted successfully")))
}
