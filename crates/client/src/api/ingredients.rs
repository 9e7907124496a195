//! Ingredient endpoints, scoped to one product.

use serde::Serialize;
use tracing::instrument;

use pitii_core::{Ingredient, IngredientId, ProductId};

use super::{ApiClient, ApiError};

fn ingredients_path(product: ProductId) -> String {
    format!("/api/products/{product}/ingredients")
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct NewIngredient<'a> {
    ingredient_name: &'a str,
}

impl ApiClient {
    /// Fetch the ingredients of a product.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is not an ingredient list.
    #[instrument(skip(self))]
    pub async fn list_ingredients(&self, product: ProductId) -> Result<Vec<Ingredient>, ApiError> {
        self.get(&ingredients_path(product)).await
    }

    /// Add an ingredient to a product.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Api`] with the backend's error body when it
    /// rejects the ingredient, or any transport error.
    #[instrument(skip(self))]
    pub async fn create_ingredient(
        &self,
        product: ProductId,
        name: &str,
    ) -> Result<Ingredient, ApiError> {
        let body = NewIngredient {
            ingredient_name: name,
        };
        self.post_json(&ingredients_path(product), &body).await
    }

    /// Remove an ingredient from a product.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend rejects it.
    #[instrument(skip(self))]
    pub async fn delete_ingredient(
        &self,
        product: ProductId,
        ingredient: IngredientId,
    ) -> Result<(), ApiError> {
        self.delete(&format!("{}/{ingredient}", ingredients_path(product)))
            .await
    }
}
