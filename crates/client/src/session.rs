//! Staff sessions and access levels.
//!
//! The menu is public; product and ingredient editing is staff-only. Rather
//! than a shared mutable flag, a view is handed an [`Access`] value: either
//! [`Access::Visitor`] or [`Access::Staff`] carrying the [`Session`] obtained
//! from [`login`].

use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use tracing::{info, instrument, warn};

use pitii_core::User;

use crate::api::{ApiClient, ApiError};

/// An authenticated staff session.
#[derive(Clone)]
pub struct Session {
    /// The logged-in staff member.
    pub user: User,
    /// Bearer token issued by the backend.
    token: SecretString,
    /// When the token expires.
    pub expires_at: DateTime<Utc>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("user", &self.user)
            .field("token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

impl Session {
    /// Build a session from its parts.
    #[must_use]
    pub fn new(user: User, token: SecretString, expires_at: DateTime<Utc>) -> Self {
        Self {
            user,
            token,
            expires_at,
        }
    }

    /// Whether the token has expired at `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Whether the token has expired.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// A client that authenticates as this session.
    #[must_use]
    pub fn authorize(&self, client: &ApiClient) -> ApiClient {
        client.with_token(SecretString::from(self.token.expose_secret().to_owned()))
    }
}

/// What the current user may do.
#[derive(Debug, Clone, Default)]
pub enum Access {
    /// Browse the menu and read ingredients.
    #[default]
    Visitor,
    /// Everything a visitor can, plus create/edit/delete.
    Staff(Session),
}

impl Access {
    /// Staff access only while the session is still valid at `now`.
    #[must_use]
    pub fn effective_at(&self, now: DateTime<Utc>) -> Self {
        match self {
            Self::Staff(session) if session.is_expired_at(now) => Self::Visitor,
            other => other.clone(),
        }
    }

    /// Whether this grants staff rights right now.
    #[must_use]
    pub fn is_staff(&self) -> bool {
        self.session().is_some()
    }

    /// Log a warning if this is a staff session that has already expired.
    ///
    /// Returns whether it had expired.
    pub fn warn_if_expired(&self) -> bool {
        match self {
            Self::Staff(session) if session.is_expired() => {
                warn!(user = %session.user.email, "staff session expired, continuing as visitor");
                true
            }
            _ => false,
        }
    }

    /// The session, if staff and not expired.
    #[must_use]
    pub fn session(&self) -> Option<&Session> {
        match self {
            Self::Staff(session) if !session.is_expired() => Some(session),
            _ => None,
        }
    }

    /// The client to use for requests made with this access level.
    #[must_use]
    pub fn client_for(&self, client: &ApiClient) -> ApiClient {
        self.session()
            .map_or_else(|| client.anonymous(), |session| session.authorize(client))
    }
}

/// Log in as staff.
///
/// # Errors
///
/// Returns the backend error if the credentials are rejected or the request fails.
#[instrument(skip(client, password))]
pub async fn login(
    client: &ApiClient,
    email: &str,
    password: &SecretString,
) -> Result<Session, ApiError> {
    let response = client.login(email, password).await?;
    info!(user = %response.user.email, expires_at = %response.expires_at, "staff logged in");

    Ok(Session::new(
        response.user,
        SecretString::from(response.token),
        response.expires_at,
    ))
}
