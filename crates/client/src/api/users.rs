//! User endpoints (plain JSON CRUD).

use secrecy::{ExposeSecret, SecretString};
use serde::{Serialize, Serializer};
use tracing::instrument;

use pitii_core::{Email, User, UserId};

use super::{ApiClient, ApiError};

const USERS_PATH: &str = "/api/users";

/// Body for creating or updating a user.
///
/// The password is only exposed while serialising the request.
#[derive(Clone, Serialize)]
pub struct UserPayload {
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: Email,
    /// Password, omitted on updates that do not change it.
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_password"
    )]
    pub password: Option<SecretString>,
}

impl std::fmt::Debug for UserPayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserPayload")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

#[allow(clippy::ref_option)] // signature dictated by serde's serialize_with
fn serialize_password<S: Serializer>(
    password: &Option<SecretString>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match password {
        Some(secret) => serializer.serialize_str(secret.expose_secret()),
        None => serializer.serialize_none(),
    }
}

impl ApiClient {
    /// Fetch every user.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is not a user list.
    #[instrument(skip(self))]
    pub async fn list_users(&self) -> Result<Vec<User>, ApiError> {
        self.get(USERS_PATH).await
    }

    /// Create a user.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend rejects it.
    #[instrument(skip(self, user), fields(email = %user.email))]
    pub async fn create_user(&self, user: &UserPayload) -> Result<User, ApiError> {
        self.post_json(USERS_PATH, user).await
    }

    /// Update a user.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend rejects it.
    #[instrument(skip(self, user), fields(email = %user.email))]
    pub async fn update_user(&self, id: UserId, user: &UserPayload) -> Result<User, ApiError> {
        self.put_json(&format!("{USERS_PATH}/{id}"), user).await
    }

    /// Delete a user.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend rejects it.
    #[instrument(skip(self))]
    pub async fn delete_user(&self, id: UserId) -> Result<(), ApiError> {
        self.delete(&format!("{USERS_PATH}/{id}")).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn payload(password: Option<&str>) -> UserPayload {
        UserPayload {
            name: "Ana".to_owned(),
            email: Email::parse("ana@pitii.com").unwrap(),
            password: password.map(|p| SecretString::from(p.to_owned())),
        }
    }

    #[test]
    fn test_payload_serializes_password_when_present() {
        let json = serde_json::to_value(payload(Some("s3cret"))).unwrap();
        assert_eq!(json["password"], "s3cret");
        assert_eq!(json["email"], "ana@pitii.com");
    }

    #[test]
    fn test_payload_omits_missing_password() {
        let json = serde_json::to_value(payload(None)).unwrap();
        assert!(json.get("password").is_none());
    }

    #[test]
    fn test_payload_debug_redacts_password() {
        let debug_output = format!("{:?}", payload(Some("s3cret")));
        assert!(!debug_output.contains("s3cret"));
        assert!(debug_output.contains("[REDACTED]"));
    }
}
