//! Student directory, keyed by `cix_email`.

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::domain::{required, Student, UpsertOutcome, ValidationError};
use crate::ports::AttendanceStore;
use crate::services::ServiceResult;

/// Keys owned by the directory itself; submitted values for them are dropped.
const RESERVED_FIELDS: [&str; 2] = ["id", "cix_email"];

#[derive(Clone)]
pub struct StudentDirectory {
    store: Arc<dyn AttendanceStore>,
}

impl StudentDirectory {
    pub fn new(store: Arc<dyn AttendanceStore>) -> Self {
        Self { store }
    }

    /// All students with the given email. At most one exists.
    pub async fn get_student(&self, email: Option<&str>) -> ServiceResult<Vec<Student>> {
        let email = required("email", email)?;
        Ok(self.store.find_students(email).await?)
    }

    /// Creates the student with `fields`, or merges `fields` into the existing record.
    pub async fn upsert_student(
        &self,
        email: Option<&str>,
        mut fields: Map<String, Value>,
    ) -> ServiceResult<UpsertOutcome> {
        let email = required("email", email)?;
        for key in RESERVED_FIELDS {
            fields.remove(key);
        }
        if fields.iter().any(|(key, value)| key.contains('\0') || holds_nul(value)) {
            return Err(ValidationError::Invalid {
                field: "student",
                reason: "contains a NUL character".to_string(),
            }
            .into());
        }
        Ok(self.store.upsert_student(email, fields).await?)
    }

    pub async fn delete_student(&self, email: Option<&str>) -> ServiceResult<()> {
        let email = required("email", email)?;
        self.store.delete_student(email).await?;
        Ok(())
    }
}

/// Whether any string or key nested in `value` contains U+0000.
fn holds_nul(value: &Value) -> bool {
    match value {
        Value::String(s) => s.contains('\0'),
        Value::Array(items) => items.iter().any(holds_nul),
        Value::Object(map) => map
            .iter()
            .any(|(key, value)| key.contains('\0') || holds_nul(value)),
        Value::Null | Value::Bool(_) | Value::Number(_) => false,
    }
}
