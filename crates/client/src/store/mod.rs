//! In-memory stores synchronised with the menu backend.
//!
//! Each store exclusively owns one entity list. Lists change only by applying
//! what the server returned:
//!
//! - create: append the echoed entity
//! - update: replace the entry with the echoed id
//! - delete: drop the entry once the server acknowledged
//!
//! On failure the list is left untouched and the error is logged and handed
//! back to the caller. Echoes are applied to the list as it stands when the
//! response arrives, under the write lock, so overlapping mutations do not
//! overwrite each other.

mod products;
mod users;

pub use products::ProductStore;
pub use users::UserStore;

use pitii_core::{Ingredient, IngredientId, Product, ProductId, User, UserId};

/// An entity with a server-assigned id.
pub trait Keyed {
    /// Identifier type.
    type Key: Copy + Eq + std::fmt::Debug;

    /// The entity's id.
    fn key(&self) -> Self::Key;
}

impl Keyed for Product {
    type Key = ProductId;

    fn key(&self) -> ProductId {
        self.id
    }
}

impl Keyed for User {
    type Key = UserId;

    fn key(&self) -> UserId {
        self.id
    }
}

impl Keyed for Ingredient {
    type Key = IngredientId;

    fn key(&self) -> IngredientId {
        self.id
    }
}

/// Replace the entry whose id matches `echo` in place. Returns whether one matched.
pub(crate) fn replace_by_key<T: Keyed>(items: &mut [T], echo: T) -> bool {
    match items.iter_mut().find(|item| item.key() == echo.key()) {
        Some(slot) => {
            *slot = echo;
            true
        }
        None => false,
    }
}

/// Remove every entry with `key`. Returns how many were removed.
pub(crate) fn remove_by_key<T: Keyed>(items: &mut Vec<T>, key: T::Key) -> usize {
    let before = items.len();
    items.retain(|item| item.key() != key);
    before - items.len()
}
