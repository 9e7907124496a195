//! Product management view.
//!
//! Everyone sees the menu and can open a product's ingredient panel. Staff
//! additionally get the create/edit form, delete, and ingredient editing.
//!
//! # Ingredient panel
//!
//! ```text
//! Closed --open_ingredients(P)--> Open { subject: P, .. } --close_ingredients--> Closed
//! ```
//!
//! Opening always fetches fresh and always lands in `Open`, even when the
//! fetch fails (the panel then shows an empty list). Closing discards the
//! subject and its ingredients.

use std::mem;

use tracing::{error, instrument, warn};

use pitii_core::{
    ImageUpload, Ingredient, IngredientId, Price, Product, ProductDraft, ProductId, ProductImage,
};

use crate::error::AppError;
use crate::session::Access;
use crate::store::{ProductStore, remove_by_key};

/// Transient product form fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductForm {
    /// Name field.
    pub name: String,
    /// Price field, as typed.
    pub price: String,
    /// Newly picked image file.
    pub image: Option<ImageUpload>,
    /// The product being edited; `None` means the form creates.
    pub editing: Option<Product>,
}

impl ProductForm {
    /// Whether submitting will update rather than create.
    #[must_use]
    pub const fn is_editing(&self) -> bool {
        self.editing.is_some()
    }

    /// Whether every field is blank.
    #[must_use]
    pub fn is_clear(&self) -> bool {
        *self == Self::default()
    }
}

/// State of the ingredient sub-view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum IngredientPanel {
    /// No product selected.
    #[default]
    Closed,
    /// Showing one product's ingredients.
    Open {
        /// The product whose ingredients are shown.
        subject: Product,
        /// Ingredients fetched when the panel opened, plus local edits.
        ingredients: Vec<Ingredient>,
        /// The "new ingredient" input.
        draft: String,
    },
}

impl IngredientPanel {
    /// Whether a product is selected.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        matches!(self, Self::Open { .. })
    }

    /// The selected product.
    #[must_use]
    pub const fn subject(&self) -> Option<&Product> {
        match self {
            Self::Open { subject, .. } => Some(subject),
            Self::Closed => None,
        }
    }

    /// Ingredients on display (empty when closed).
    #[must_use]
    pub fn ingredients(&self) -> &[Ingredient] {
        match self {
            Self::Open { ingredients, .. } => ingredients,
            Self::Closed => &[],
        }
    }
}

/// Menu listing, product form and ingredient panel.
#[derive(Debug)]
pub struct ProductManagementView {
    store: ProductStore,
    access: Access,
    form: ProductForm,
    panel: IngredientPanel,
}

impl ProductManagementView {
    /// Create a view over `store`, issuing requests with `access`'s credentials.
    #[must_use]
    pub fn new(store: &ProductStore, access: Access) -> Self {
        access.warn_if_expired();
        let client = access.client_for(store.client());
        Self {
            store: store.with_client(client),
            access,
            form: ProductForm::default(),
            panel: IngredientPanel::Closed,
        }
    }

    /// Load the menu from the backend (the view's activation step).
    ///
    /// # Errors
    ///
    /// Returns the backend error; the menu stays as it was.
    pub async fn refresh(&self) -> Result<(), AppError> {
        Ok(self.store.load().await?)
    }

    /// The current menu.
    pub async fn menu(&self) -> Vec<Product> {
        self.store.snapshot().await
    }

    /// Whether the form, delete and ingredient editing are available.
    #[must_use]
    pub fn can_manage(&self) -> bool {
        self.access.is_staff()
    }

    /// Current form state.
    #[must_use]
    pub const fn form(&self) -> &ProductForm {
        &self.form
    }

    /// Mutable form state, for filling fields.
    pub const fn form_mut(&mut self) -> &mut ProductForm {
        &mut self.form
    }

    /// Current ingredient panel state.
    #[must_use]
    pub const fn panel(&self) -> &IngredientPanel {
        &self.panel
    }

    fn require_staff(&self, action: &str) -> Result<(), AppError> {
        if self.can_manage() {
            Ok(())
        } else {
            Err(AppError::Unauthorized(format!("{action} requires staff access")))
        }
    }

    /// Put `product` into the form for editing.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Unauthorized` for visitors.
    pub fn begin_edit(&mut self, product: &Product) -> Result<(), AppError> {
        self.require_staff("editing a product")?;
        self.form = ProductForm {
            name: product.name.clone(),
            price: product.price.to_string(),
            image: None,
            editing: Some(product.clone()),
        };
        Ok(())
    }

    /// Abandon the form without submitting.
    pub fn cancel_edit(&mut self) {
        self.form = ProductForm::default();
    }

    /// Submit the form: update when editing, create otherwise.
    ///
    /// The form is cleared whatever the outcome.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Unauthorized` for visitors (form untouched),
    /// `AppError::InvalidInput` for an unparsable price, or the backend error.
    #[instrument(skip(self), fields(editing = self.form.is_editing()))]
    pub async fn submit(&mut self) -> Result<Product, AppError> {
        self.require_staff("saving a product")?;

        let ProductForm {
            name,
            price,
            image,
            editing,
        } = mem::take(&mut self.form);

        let price = Price::parse(&price)?;

        match editing {
            Some(current) => {
                let image = ProductImage::for_update(image, current.image_url.as_deref());
                let draft = ProductDraft::new(name, price).with_image(image);
                Ok(self.store.update(current.id, &draft).await?)
            }
            None => {
                let image = image.map_or(ProductImage::None, ProductImage::Upload);
                let draft = ProductDraft::new(name, price).with_image(image);
                Ok(self.store.add(&draft).await?)
            }
        }
    }

    /// Delete a product from the menu.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Unauthorized` for visitors, or the backend error.
    pub async fn delete(&self, id: ProductId) -> Result<(), AppError> {
        self.require_staff("deleting a product")?;
        Ok(self.store.delete(id).await?)
    }

    /// Select `product` and show its ingredients, fetched fresh.
    ///
    /// The panel opens even if the fetch fails, showing an empty list.
    ///
    /// # Errors
    ///
    /// Returns the fetch error after the panel has opened.
    #[instrument(skip(self, product), fields(product = %product.id))]
    pub async fn open_ingredients(&mut self, product: Product) -> Result<(), AppError> {
        let fetched = self.store.client().list_ingredients(product.id).await;

        let (ingredients, outcome) = match fetched {
            Ok(ingredients) => (ingredients, Ok(())),
            Err(e) => {
                error!(error = %e, "Failed to fetch ingredients");
                (Vec::new(), Err(e.into()))
            }
        };

        self.panel = IngredientPanel::Open {
            subject: product,
            ingredients,
            draft: String::new(),
        };
        outcome
    }

    /// Fill the "new ingredient" input. Ignored while the panel is closed.
    pub fn set_ingredient_draft(&mut self, name: impl Into<String>) {
        if let IngredientPanel::Open { draft, .. } = &mut self.panel {
            *draft = name.into();
        }
    }

    /// Create the drafted ingredient on the selected product.
    ///
    /// On success the ingredient is appended and the input cleared; on
    /// failure the input keeps its text.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Unauthorized` for visitors, `AppError::NoSubject`
    /// when the panel is closed, or the backend error (whose message holds
    /// the server's error body).
    #[instrument(skip(self))]
    pub async fn add_ingredient(&mut self) -> Result<Ingredient, AppError> {
        self.require_staff("adding an ingredient")?;
        let IngredientPanel::Open { subject, draft, .. } = &self.panel else {
            return Err(AppError::NoSubject);
        };
        let product_id = subject.id;
        let name = draft.clone();

        match self.store.client().create_ingredient(product_id, &name).await {
            Ok(created) => {
                if let IngredientPanel::Open {
                    ingredients, draft, ..
                } = &mut self.panel
                {
                    ingredients.push(created.clone());
                    draft.clear();
                }
                Ok(created)
            }
            Err(e) => {
                error!(error = %e, product = %product_id, "Failed to add ingredient");
                Err(e.into())
            }
        }
    }

    /// Remove an ingredient from the selected product.
    ///
    /// Once the backend has answered, the entry is dropped from the panel
    /// whatever the status. If no response arrived at all (timeout, refused
    /// connection) the entry stays.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Unauthorized` for visitors, `AppError::NoSubject`
    /// when the panel is closed, or the backend or transport error.
    #[instrument(skip(self))]
    pub async fn remove_ingredient(&mut self, ingredient: IngredientId) -> Result<(), AppError> {
        self.require_staff("removing an ingredient")?;
        let product_id = self.panel.subject().ok_or(AppError::NoSubject)?.id;

        let outcome = self
            .store
            .client()
            .delete_ingredient(product_id, ingredient)
            .await;

        let answered = match &outcome {
            Ok(()) => true,
            Err(e) => e.status().is_some(),
        };
        if answered {
            if let IngredientPanel::Open { ingredients, .. } = &mut self.panel {
                remove_by_key(ingredients, ingredient);
            }
        }

        outcome.map_err(|e| {
            if answered {
                warn!(error = %e, product = %product_id, %ingredient, "ingredient delete rejected, removed locally anyway");
            } else {
                error!(error = %e, product = %product_id, %ingredient, "ingredient delete got no response");
            }
            e.into()
        })
    }

    /// Close the panel, discarding the subject and its ingredients.
    pub fn close_ingredients(&mut self) {
        self.panel = IngredientPanel::Closed;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pitii_core::{IngredientId, Price};

    use super::*;

    fn product() -> Product {
        Product {
            id: ProductId::new(1),
            name: "Burger".to_owned(),
            price: Price::parse("10").unwrap(),
            image_url: Some("https://cdn/burger.png".to_owned()),
        }
    }

    #[test]
    fn test_default_form_is_clear() {
        assert!(ProductForm::default().is_clear());
        let form = ProductForm {
            name: "x".to_owned(),
            ..ProductForm::default()
        };
        assert!(!form.is_clear());
        assert!(!form.is_editing());
    }

    #[test]
    fn test_closed_panel_accessors() {
        let panel = IngredientPanel::Closed;
        assert!(!panel.is_open());
        assert!(panel.subject().is_none());
        assert!(panel.ingredients().is_empty());
    }

    #[test]
    fn test_open_panel_accessors() {
        let panel = IngredientPanel::Open {
            subject: product(),
            ingredients: vec![Ingredient {
                id: IngredientId::new(4),
                name: "Cheese".to_owned(),
            }],
            draft: String::new(),
        };
        assert!(panel.is_open());
        assert_eq!(panel.subject().unwrap().name, "Burger");
        assert_eq!(panel.ingredients().len(), 1);
    }
}
