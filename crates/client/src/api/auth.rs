//! Registration and staff login endpoints.

use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use pitii_core::{Email, User};

use super::{ApiClient, ApiError};

const REGISTER_PATH: &str = "/api/register";
const LOGIN_PATH: &str = "/api/login";

/// Registration form contents.
#[derive(Clone)]
pub struct RegisterRequest {
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: Email,
    /// Chosen password.
    pub password: SecretString,
}

impl std::fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Wire body shared by register and login.
#[derive(Serialize)]
struct CredentialsBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    email: &'a str,
    password: &'a str,
}

/// Response from `POST /api/login`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    /// Bearer token for subsequent requests.
    pub token: String,
    /// When the token stops being accepted.
    pub expires_at: DateTime<Utc>,
    /// The authenticated staff member.
    pub user: User,
}

impl ApiClient {
    /// Register a new user. Returns the created user.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend rejects it.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn register(&self, request: &RegisterRequest) -> Result<User, ApiError> {
        let body = CredentialsBody {
            name: Some(&request.name),
            email: request.email.as_str(),
            password: request.password.expose_secret(),
        };
        self.post_json(REGISTER_PATH, &body).await
    }

    /// Exchange staff credentials for a bearer token.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Unauthorized`] for bad credentials, or any
    /// transport/parse error.
    #[instrument(skip(self, password))]
    pub async fn login(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<LoginResponse, ApiError> {
        let body = CredentialsBody {
            name: None,
            email,
            password: password.expose_secret(),
        };
        self.post_json(LOGIN_PATH, &body).await
    }
}
