//! Command implementations.
//!
//! Every command builds the stores and views the library provides and
//! reports through `tracing`.

pub mod ingredients;
pub mod menu;
pub mod users;

use std::path::Path;

use thiserror::Error;

use pitii_client::{
    Access, ApiClient, ApiError, AppError, ClientConfig, ProductStore, UserStore, session,
};
use pitii_core::{ImageUpload, ProductId};

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// A view or store operation failed.
    #[error(transparent)]
    App(#[from] AppError),

    /// Staff credentials are not configured.
    #[error("This command needs PITII_STAFF_EMAIL and PITII_STAFF_PASSWORD")]
    MissingStaffCredentials,

    /// No product with this id on the menu.
    #[error("No product with id {0}")]
    UnknownProduct(ProductId),

    /// Image file could not be read.
    #[error("Cannot read image {path}: {source}")]
    Image {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl From<ApiError> for CommandError {
    fn from(e: ApiError) -> Self {
        Self::App(AppError::Api(e))
    }
}

/// Shared state for one CLI invocation.
pub struct Context {
    config: ClientConfig,
    client: ApiClient,
    products: ProductStore,
    users: UserStore,
}

impl Context {
    /// Build the client and empty stores.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self, CommandError> {
        let client = ApiClient::new(&config)?;
        Ok(Self {
            products: ProductStore::new(client.clone()),
            users: UserStore::new(client.clone()),
            client,
            config,
        })
    }

    /// The shared product store.
    pub const fn products(&self) -> &ProductStore {
        &self.products
    }

    /// The shared user store.
    pub const fn users(&self) -> &UserStore {
        &self.users
    }

    /// Log in with the configured staff credentials.
    ///
    /// # Errors
    ///
    /// Returns `MissingStaffCredentials` if none are configured, or the
    /// backend error if the login is rejected.
    pub async fn staff_access(&self) -> Result<Access, CommandError> {
        let creds = self
            .config
            .staff()
            .ok_or(CommandError::MissingStaffCredentials)?;
        let session = session::login(&self.client, &creds.email, &creds.password).await?;
        Ok(Access::Staff(session))
    }
}

/// Read an image from disk for upload.
pub fn read_image(path: &Path) -> Result<ImageUpload, CommandError> {
    let bytes = std::fs::read(path).map_err(|source| CommandError::Image {
        path: path.display().to_string(),
        source,
    })?;
    let file_name = path
        .file_name()
        .map_or_else(|| "image".to_owned(), |n| n.to_string_lossy().into_owned());
    let content_type = mime_guess::from_path(path)
        .first_or_octet_stream()
        .essence_str()
        .to_owned();

    Ok(ImageUpload::new(file_name, content_type, bytes))
}
