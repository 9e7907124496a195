//! Product endpoints.
//!
//! Writes go out as `multipart/form-data` because they may carry an image
//! file; the backend answers with the stored product as JSON.

use reqwest::multipart::{Form, Part};
use tracing::instrument;

use pitii_core::{Product, ProductDraft, ProductId, ProductImage};

use super::{ApiClient, ApiError};

const PRODUCTS_PATH: &str = "/api/products";

fn product_path(id: ProductId) -> String {
    format!("{PRODUCTS_PATH}/{id}")
}

/// Build the multipart body for a create or update.
///
/// Fields: `name`, `price`, then either an `image` file part or an
/// `imageUrl` text field with the URL the backend already stores.
fn product_form(draft: &ProductDraft) -> Result<Form, ApiError> {
    let form = Form::new()
        .text("name", draft.name.clone())
        .text("price", draft.price.to_string());

    let form = match &draft.image {
        ProductImage::None => form,
        ProductImage::Existing(url) => form.text("imageUrl", url.clone()),
        ProductImage::Upload(upload) => {
            let part = Part::bytes(upload.bytes.clone())
                .file_name(upload.file_name.clone())
                .mime_str(&upload.content_type)?;
            form.part("image", part)
        }
    };

    Ok(form)
}

impl ApiClient {
    /// Fetch every product on the menu.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is not a product list.
    #[instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Vec<Product>, ApiError> {
        self.get(PRODUCTS_PATH).await
    }

    /// Create a product. Returns the backend's stored representation.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend rejects it.
    #[instrument(skip(self, draft), fields(name = %draft.name))]
    pub async fn create_product(&self, draft: &ProductDraft) -> Result<Product, ApiError> {
        self.post_multipart(PRODUCTS_PATH, product_form(draft)?).await
    }

    /// Update a product. Returns the backend's stored representation.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend rejects it.
    #[instrument(skip(self, draft), fields(name = %draft.name))]
    pub async fn update_product(
        &self,
        id: ProductId,
        draft: &ProductDraft,
    ) -> Result<Product, ApiError> {
        self.put_multipart(&product_path(id), product_form(draft)?)
            .await
    }

    /// Delete a product.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend rejects it.
    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: ProductId) -> Result<(), ApiError> {
        self.delete(&product_path(id)).await
    }
}
