//! Menu backend REST client.
//!
//! One [`ApiClient`] covers the four resource groups the backend exposes:
//!
//! - **products** - `GET/POST /api/products`, `PUT/DELETE /api/products/{id}` (multipart writes)
//! - **ingredients** - `GET/POST /api/products/{id}/ingredients`, `DELETE .../{ingredient_id}`
//! - **users** - `GET/POST /api/users`, `PUT/DELETE /api/users/{id}`
//! - **auth** - `POST /api/register`, `POST /api/login`
//!
//! Every call is a single request. Nothing is retried or cached; failures
//! come back as [`ApiError`] for the caller to log or surface.

mod auth;
mod ingredients;
mod products;
mod users;

pub use auth::{LoginResponse, RegisterRequest};
pub use users::UserPayload;

use std::sync::Arc;

use reqwest::multipart::Form;
use secrecy::{ExposeSecret, SecretString};
use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;
use tracing::debug;

use crate::config::ClientConfig;

/// Errors that can occur when talking to the menu backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport failure (connection refused, timeout, TLS, ...).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    ///
    /// `message` is the raw response body, which carries the backend's
    /// structured error when it sends one.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Resource not found. `message` is the response body.
    #[error("Not found: {path} - {message}")]
    NotFound { path: String, message: String },

    /// The backend refused the request (401/403). `message` is the response body.
    #[error("Unauthorized ({status}): {message}")]
    Unauthorized { status: u16, message: String },

    /// The response body could not be decoded.
    #[error("Parse error: {0}")]
    Parse(String),
}

impl ApiError {
    /// HTTP status returned by the backend, if the request got that far.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } | Self::Unauthorized { status, .. } => Some(*status),
            Self::NotFound { .. } => Some(404),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            Self::Parse(_) => None,
        }
    }
}

/// Menu backend API client.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
    /// Bearer token of the logged-in staff member, if any.
    token: Option<SecretString>,
}

struct ApiClientInner {
    client: reqwest::Client,
    /// Origin without a trailing slash.
    base_url: String,
}

impl ApiClient {
    /// Create a new client for the configured backend.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url: config.base_url.as_str().trim_end_matches('/').to_owned(),
            }),
            token: None,
        })
    }

    /// A client that sends `token` as a bearer credential on every request.
    #[must_use]
    pub fn with_token(&self, token: SecretString) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            token: Some(token),
        }
    }

    /// A client that sends no credentials.
    #[must_use]
    pub fn anonymous(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            token: None,
        }
    }

    /// Whether a bearer token is attached.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// The configured backend origin.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.inner.base_url)
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let builder = self.inner.client.request(method, self.url(path));
        match &self.token {
            Some(token) => builder.bearer_auth(token.expose_secret()),
            None => builder,
        }
    }

    /// Execute a GET request and decode the JSON body.
    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self.request(reqwest::Method::GET, path).send().await?;
        Self::handle_response(path, response).await
    }

    /// Execute a POST request with a JSON body.
    pub(crate) async fn post_json<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let response = self
            .request(reqwest::Method::POST, path)
            .json(body)
            .send()
            .await?;
        Self::handle_response(path, response).await
    }

    /// Execute a PUT request with a JSON body.
    pub(crate) async fn put_json<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let response = self
            .request(reqwest::Method::PUT, path)
            .json(body)
            .send()
            .await?;
        Self::handle_response(path, response).await
    }

    /// Execute a POST request with a multipart body.
    pub(crate) async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: Form,
    ) -> Result<T, ApiError> {
        let response = self
            .request(reqwest::Method::POST, path)
            .multipart(form)
            .send()
            .await?;
        Self::handle_response(path, response).await
    }

    /// Execute a PUT request with a multipart body.
    pub(crate) async fn put_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: Form,
    ) -> Result<T, ApiError> {
        let response = self
            .request(reqwest::Method::PUT, path)
            .multipart(form)
            .send()
            .await?;
        Self::handle_response(path, response).await
    }

    /// Execute a DELETE request. Any response body is ignored.
    pub(crate) async fn delete(&self, path: &str) -> Result<(), ApiError> {
        let response = self.request(reqwest::Method::DELETE, path).send().await?;

        if response.status().is_success() {
            debug!(path, "delete acknowledged");
            return Ok(());
        }

        Err(Self::parse_error(path, response).await)
    }

    /// Handle API response and parse JSON.
    async fn handle_response<T: DeserializeOwned>(
        path: &str,
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        if response.status().is_success() {
            let bytes = response.bytes().await?;
            return serde_json::from_slice(&bytes)
                .map_err(|e| ApiError::Parse(format!("Failed to parse response from {path}: {e}")));
        }

        Err(Self::parse_error(path, response).await)
    }

    /// Turn a non-success response into an [`ApiError`].
    async fn parse_error(path: &str, response: reqwest::Response) -> ApiError {
        let status = response.status().as_u16();
        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());

        match status {
            401 | 403 => ApiError::Unauthorized { status, message },
            404 => ApiError::NotFound {
                path: path.to_owned(),
                message,
            },
            _ => ApiError::Api { status, message },
        }
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}
