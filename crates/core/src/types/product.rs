//! Menu products.

use serde::{Deserialize, Serialize};

use super::{Price, ProductId, ProductImage};

/// A product as the backend lists and echoes it.
///
/// Ingredients are not embedded; they are fetched per product when the
/// ingredient panel opens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Server-assigned identifier.
    pub id: ProductId,
    /// Display name on the menu.
    pub name: String,
    /// Menu price.
    pub price: Price,
    /// URL of the stored image, if one was ever uploaded.
    #[serde(default, alias = "imageUrl", skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// The fields submitted by the product form on create or update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductDraft {
    /// Product name.
    pub name: String,
    /// Parsed price.
    pub price: Price,
    /// New upload, forwarded stored URL, or nothing.
    pub image: ProductImage,
}

impl ProductDraft {
    /// Create a draft without an image.
    #[must_use]
    pub fn new(name: impl Into<String>, price: Price) -> Self {
        Self {
            name: name.into(),
            price,
            image: ProductImage::None,
        }
    }

    /// Attach an image.
    #[must_use]
    pub fn with_image(mut self, image: ProductImage) -> Self {
        self.image = image;
        self
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_backend_listing() {
        let json = r#"[
            {"id": 1, "name": "Burger", "price": "10", "image_url": "https://cdn/burger.png"},
            {"id": 2, "name": "Soda", "price": 3}
        ]"#;
        let products: Vec<Product> = serde_json::from_str(json).unwrap();

        assert_eq!(products.len(), 2);
        assert_eq!(products[0].image_url.as_deref(), Some("https://cdn/burger.png"));
        assert_eq!(products[1].price, Price::parse("3").unwrap());
        assert!(products[1].image_url.is_none());
    }

    #[test]
    fn test_deserialize_camel_case_image_url() {
        let json = r#"{"id": 5, "name": "Fries", "price": "6.5", "imageUrl": "https://cdn/f.png"}"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.image_url.as_deref(), Some("https://cdn/f.png"));
    }
}
