//! User directory: profile upserts keyed by the identity provider's uid.

use std::sync::Arc;

use crate::domain::{required, User, UserId};
use crate::ports::AttendanceStore;
use crate::services::ServiceResult;

#[derive(Clone)]
pub struct UserDirectory {
    store: Arc<dyn AttendanceStore>,
}

impl UserDirectory {
    pub fn new(store: Arc<dyn AttendanceStore>) -> Self {
        Self { store }
    }

    /// Writes the user's profile. Existing rooms are left untouched.
    pub async fn upsert_user(
        &self,
        user_id: UserId,
        first_name: Option<&str>,
        last_name: Option<&str>,
        email: Option<&str>,
    ) -> ServiceResult<User> {
        let user = User {
            user_id,
            first_name: required("first_name", first_name)?.to_string(),
            last_name: required("last_name", last_name)?.to_string(),
            email: required("email", email)?.to_string(),
        };
        self.store.upsert_user(user.clone()).await?;
        Ok(user)
    }
}
