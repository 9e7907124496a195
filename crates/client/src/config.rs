//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `PITII_API_BASE_URL` - Menu backend origin (default: `https://backend-pitii-v2.vercel.app`)
//! - `PITII_HTTP_TIMEOUT_SECS` - Per-request timeout in seconds (default: 30)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//!
//! ## Optional (staff login - must be set together)
//! - `PITII_STAFF_EMAIL` - Staff account email
//! - `PITII_STAFF_PASSWORD` - Staff account password

use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

/// Production backend origin.
pub const DEFAULT_BASE_URL: &str = "https://backend-pitii-v2.vercel.app";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend origin all `/api/...` paths are joined onto.
    pub base_url: Url,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Staff credentials used to log in before staff-only commands.
    pub staff: Option<StaffCredentials>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "production")
    pub sentry_environment: Option<String>,
}

/// Staff login credentials.
///
/// Implements `Debug` manually to redact the password.
#[derive(Clone)]
pub struct StaffCredentials {
    /// Staff account email.
    pub email: String,
    /// Staff account password.
    pub password: SecretString,
}

impl std::fmt::Debug for StaffCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaffCredentials")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl StaffCredentials {
    fn from_env() -> Result<Option<Self>, ConfigError> {
        let email = get_optional_env("PITII_STAFF_EMAIL");
        let password = get_optional_env("PITII_STAFF_PASSWORD");

        match (email, password) {
            (Some(email), Some(password)) => Ok(Some(Self {
                email,
                password: SecretString::from(password),
            })),
            (None, None) => Ok(None),
            _ => Err(ConfigError::InvalidEnvVar(
                "PITII_STAFF_*".to_string(),
                "Both PITII_STAFF_EMAIL and PITII_STAFF_PASSWORD must be set together".to_string(),
            )),
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value or the
    /// staff credentials are only half configured.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let base_url = parse_base_url(&get_env_or_default("PITII_API_BASE_URL", DEFAULT_BASE_URL))?;
        let timeout_secs =
            parse_timeout_secs(get_optional_env("PITII_HTTP_TIMEOUT_SECS").as_deref())?;

        Ok(Self {
            base_url,
            timeout: Duration::from_secs(timeout_secs),
            staff: StaffCredentials::from_env()?,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Configuration pointing at an explicit origin, with defaults elsewhere.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if `base_url` is not an http(s) URL.
    pub fn for_base_url(base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: parse_base_url(base_url)?,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            staff: None,
            sentry_dsn: None,
            sentry_environment: None,
        })
    }

    /// Returns the staff credentials, if configured.
    #[must_use]
    pub const fn staff(&self) -> Option<&StaffCredentials> {
        self.staff.as_ref()
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse and check the backend origin.
fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw)
        .map_err(|e| ConfigError::InvalidEnvVar("PITII_API_BASE_URL".to_string(), e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            "PITII_API_BASE_URL".to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }

    Ok(url)
}

/// Get an optional environment variable.
/// Parse the timeout variable, falling back to [`DEFAULT_TIMEOUT_SECS`] when unset.
fn parse_timeout_secs(raw: Option<&str>) -> Result<u64, ConfigError> {
    raw.map_or(Ok(DEFAULT_TIMEOUT_SECS), |v| {
        v.trim().parse::<u64>().map_err(|e| {
            ConfigError::InvalidEnvVar("PITII_HTTP_TIMEOUT_SECS".to_string(), e.to_string())
        })
    })
}

fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_for_base_url_defaults() {
        let config = ClientConfig::for_base_url("http://localhost:5000").unwrap();
        assert_eq!(config.base_url.as_str(), "http://localhost:5000/");
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(config.staff().is_none());
    }

    #[test]
    fn test_default_base_url_parses() {
        assert!(parse_base_url(DEFAULT_BASE_URL).is_ok());
    }

    #[test]
    fn test_rejects_non_http_scheme() {
        let err = parse_base_url("ftp://menu.example").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(_, _)));
    }

    #[test]
    fn test_timeout_defaults_when_unset() {
        assert_eq!(parse_timeout_secs(None).unwrap(), DEFAULT_TIMEOUT_SECS);
        assert_eq!(parse_timeout_secs(Some(" 5 ")).unwrap(), 5);
    }

    #[test]
    fn test_timeout_rejects_non_numeric() {
        let err = parse_timeout_secs(Some("soon")).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref var, _) if var == "PITII_HTTP_TIMEOUT_SECS"));
    }

    #[test]
    fn test_rejects_garbage_url() {
        assert!(parse_base_url("not a url").is_err());
    }

    #[test]
    fn test_staff_credentials_debug_redacts_password() {
        let creds = StaffCredentials {
            email: "staff@pitii.com".to_string(),
            password: SecretString::from("correct-horse-battery"),
        };

        let debug_output = format!("{creds:?}");

        assert!(debug_output.contains("staff@pitii.com"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("correct-horse-battery"));
    }
}
