//! User store.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{error, instrument, warn};

use pitii_core::{User, UserId};

use super::{remove_by_key, replace_by_key};
use crate::api::{ApiClient, ApiError, UserPayload};

/// Shared, in-memory list of users.
#[derive(Clone)]
pub struct UserStore {
    client: ApiClient,
    users: Arc<RwLock<Vec<User>>>,
}

impl UserStore {
    /// Create an empty store.
    #[must_use]
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            users: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// The same list, accessed through another client.
    #[must_use]
    pub fn with_client(&self, client: ApiClient) -> Self {
        Self {
            client,
            users: Arc::clone(&self.users),
        }
    }

    /// The client requests are issued with.
    #[must_use]
    pub const fn client(&self) -> &ApiClient {
        &self.client
    }

    /// A copy of the current list.
    pub async fn snapshot(&self) -> Vec<User> {
        self.users.read().await.clone()
    }

    /// Number of users currently held.
    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    /// Whether the store holds no users.
    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }

    /// Append a user that was created elsewhere (e.g. by registration).
    pub async fn push(&self, user: User) {
        self.users.write().await.push(user);
    }

    /// Fetch all users and replace the local list.
    ///
    /// # Errors
    ///
    /// Returns the backend error; the list is left as it was.
    #[instrument(skip(self))]
    pub async fn load(&self) -> Result<(), ApiError> {
        match self.client.list_users().await {
            Ok(users) => {
                *self.users.write().await = users;
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "Error fetching users");
                Err(e)
            }
        }
    }

    /// Create a user and append the server's representation.
    ///
    /// # Errors
    ///
    /// Returns the backend error; the list is unchanged.
    #[instrument(skip(self, user), fields(email = %user.email))]
    pub async fn add(&self, user: &UserPayload) -> Result<User, ApiError> {
        match self.client.create_user(user).await {
            Ok(created) => {
                self.users.write().await.push(created.clone());
                Ok(created)
            }
            Err(e) => {
                error!(error = %e, "Error adding user");
                Err(e)
            }
        }
    }

    /// Update a user and replace the matching entry with the server's representation.
    ///
    /// # Errors
    ///
    /// Returns the backend error; the list is unchanged.
    #[instrument(skip(self, user), fields(email = %user.email))]
    pub async fn update(&self, id: UserId, user: &UserPayload) -> Result<User, ApiError> {
        match self.client.update_user(id, user).await {
            Ok(updated) => {
                let mut users = self.users.write().await;
                if !replace_by_key(users.as_mut_slice(), updated.clone()) {
                    warn!(%id, "updated user is not in the local list");
                }
                Ok(updated)
            }
            Err(e) => {
                error!(error = %e, "Error updating user");
                Err(e)
            }
        }
    }

    /// Delete a user and remove it from the list.
    ///
    /// # Errors
    ///
    /// Returns the backend error; the list is unchanged.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: UserId) -> Result<(), ApiError> {
        match self.client.delete_user(id).await {
            Ok(()) => {
                let mut users = self.users.write().await;
                remove_by_key(&mut *users, id);
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "Error deleting user");
                Err(e)
            }
        }
    }
}

impl std::fmt::Debug for UserStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserStore")
            .field("client", &self.client)
            .finish_non_exhaustive()
    }
}
