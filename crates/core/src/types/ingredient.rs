//! Per-product ingredients.

use serde::{Deserialize, Serialize};

use super::IngredientId;

/// An ingredient belonging to exactly one product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    /// Server-assigned identifier.
    pub id: IngredientId,
    /// Ingredient name.
    #[serde(alias = "ingredientName")]
    pub name: String,
}
