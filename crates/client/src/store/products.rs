//! Product store.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, error, instrument, warn};

use pitii_core::{Product, ProductDraft, ProductId};

use super::{remove_by_key, replace_by_key};
use crate::api::{ApiClient, ApiError};

/// Shared, in-memory list of menu products.
///
/// Clones share the same list. Use [`ProductStore::with_client`] to issue
/// requests with different credentials against the same list.
#[derive(Clone)]
pub struct ProductStore {
    client: ApiClient,
    products: Arc<RwLock<Vec<Product>>>,
}

impl ProductStore {
    /// Create an empty store.
    #[must_use]
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            products: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// The same list, accessed through another client.
    #[must_use]
    pub fn with_client(&self, client: ApiClient) -> Self {
        Self {
            client,
            products: Arc::clone(&self.products),
        }
    }

    /// The client requests are issued with.
    #[must_use]
    pub const fn client(&self) -> &ApiClient {
        &self.client
    }

    /// A copy of the current list.
    pub async fn snapshot(&self) -> Vec<Product> {
        self.products.read().await.clone()
    }

    /// Look up one product by id.
    pub async fn get(&self, id: ProductId) -> Option<Product> {
        self.products
            .read()
            .await
            .iter()
            .find(|p| p.id == id)
            .cloned()
    }

    /// Number of products currently held.
    pub async fn len(&self) -> usize {
        self.products.read().await.len()
    }

    /// Whether the store holds no products.
    pub async fn is_empty(&self) -> bool {
        self.products.read().await.is_empty()
    }

    /// Fetch the full menu and replace the local list with it.
    ///
    /// # Errors
    ///
    /// Returns the backend error; the list is left as it was (empty on first load).
    #[instrument(skip(self))]
    pub async fn load(&self) -> Result<(), ApiError> {
        match self.client.list_products().await {
            Ok(products) => {
                debug!(count = products.len(), "products loaded");
                *self.products.write().await = products;
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "Error fetching products");
                Err(e)
            }
        }
    }

    /// Create a product and append the server's representation.
    ///
    /// # Errors
    ///
    /// Returns the backend error; the list is unchanged.
    #[instrument(skip(self, draft), fields(name = %draft.name))]
    pub async fn add(&self, draft: &ProductDraft) -> Result<Product, ApiError> {
        match self.client.create_product(draft).await {
            Ok(created) => {
                self.products.write().await.push(created.clone());
                debug!(id = %created.id, "product added");
                Ok(created)
            }
            Err(e) => {
                error!(error = %e, "Error adding product");
                Err(e)
            }
        }
    }

    /// Update a product and replace the matching entry with the server's representation.
    ///
    /// # Errors
    ///
    /// Returns the backend error; the list is unchanged.
    #[instrument(skip(self, draft), fields(name = %draft.name))]
    pub async fn update(&self, id: ProductId, draft: &ProductDraft) -> Result<Product, ApiError> {
        match self.client.update_product(id, draft).await {
            Ok(updated) => {
                let mut products = self.products.write().await;
                if !replace_by_key(products.as_mut_slice(), updated.clone()) {
                    warn!(%id, "updated product is not in the local list");
                }
                Ok(updated)
            }
            Err(e) => {
                error!(error = %e, "Error updating product");
                Err(e)
            }
        }
    }

    /// Delete a product and remove it from the list.
    ///
    /// # Errors
    ///
    /// Returns the backend error; the list is unchanged.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: ProductId) -> Result<(), ApiError> {
        match self.client.delete_product(id).await {
            Ok(()) => {
                let mut products = self.products.write().await;
                remove_by_key(&mut *products, id);
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "Error deleting product");
                Err(e)
            }
        }
    }
}

impl std::fmt::Debug for ProductStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProductStore")
            .field("client", &self.client)
            .finish_non_exhaustive()
    }
}
