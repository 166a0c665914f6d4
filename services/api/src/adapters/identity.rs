//! services/api/src/adapters/identity.rs
//!
//! Verifies bearer tokens against the identity provider's `accounts:lookup`
//! endpoint (Google Identity Toolkit / Firebase Auth REST API).

use async_trait::async_trait;
use classtap_core::domain::Identity;
use classtap_core::ports::{IdentityProvider, PortError, PortResult};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LookupRequest<'a> {
    id_token: &'a str,
}

#[derive(Deserialize)]
struct LookupResponse {
    #[serde(default)]
    users: Vec<LookupUser>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LookupUser {
    local_id: String,
    email: Option<String>,
}

/// An `IdentityProvider` backed by the Identity Toolkit REST API.
#[derive(Clone)]
pub struct IdentityToolkitAdapter {
    client: Client,
    lookup_url: String,
    api_key: String,
}

impl IdentityToolkitAdapter {
    pub fn new(client: Client, lookup_url: String, api_key: String) -> Self {
        Self {
            client,
            lookup_url,
            api_key,
        }
    }
}

#[async_trait]
impl IdentityProvider for IdentityToolkitAdapter {
    async fn verify_token(&self, token: &str) -> PortResult<Identity> {
        let response = self
            .client
            .post(&self.lookup_url)
            .query(&[("key", self.api_key.as_str())])
            .json(&LookupRequest { id_token: token })
            .send()
            .await
            .map_err(|e| PortError::Unavailable(format!("Identity lookup failed: {}", e)))?;

        match response.status() {
            status if status.is_success() => {}
            // The provider answers 400 for expired, revoked or malformed tokens.
            StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(PortError::Unauthorized)
            }
            status if status.is_server_error() => {
                return Err(PortError::Unavailable(format!(
                    "Identity provider returned {}",
                    status
                )))
            }
            status => {
                warn!("Unexpected identity provider status: {}", status);
                return Err(PortError::Unexpected(format!(
                    "Identity provider returned {}",
                    status
                )));
            }
        }

        let body: LookupResponse = response
            .json()
            .await
            .map_err(|e| PortError::Unexpected(format!("Malformed identity response: {}", e)))?;

        identity_from(body)
    }
}

fn identity_from(body: LookupResponse) -> PortResult<Identity> {
    body.users
        .into_iter()
        .find(|u| !u.local_id.trim().is_empty())
        .map(|u| Identity::new(u.local_id, u.email))
        .ok_or(PortError::Unauthorized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_response_maps_to_identity() {
        let body: LookupResponse = serde_json::from_str(
            r#"{"kind":"identitytoolkit#GetAccountInfoResponse",
                "users":[{"localId":"u1","email":"ada@example.com","emailVerified":true}]}"#,
        )
        .unwrap();

        let identity = identity_from(body).unwrap();
        assert_eq!(identity.uid.as_str(), "u1");
        assert_eq!(identity.email.as_deref(), Some("ada@example.com"));
    }

    #[test]
    fn empty_lookup_is_unauthorized() {
        let body: LookupResponse = serde_json::from_str("{}").unwrap();
        assert!(matches!(identity_from(body), Err(PortError::Unauthorized)));
    }
}
