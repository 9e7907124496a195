//! Front-end flows without a UI toolkit.
//!
//! A view owns transient form state and a handle to the shared store(s). It
//! never keeps its own copy of persisted data: the menu is always read back
//! from the [`ProductStore`](crate::store::ProductStore).
//!
//! - [`ProductManagementView`] - menu, product form, ingredient panel
//! - [`RegistrationView`] - new-user sign-up

mod products;
mod register;

pub use products::{IngredientPanel, ProductForm, ProductManagementView};
pub use register::{REGISTERED_ACKNOWLEDGEMENT, Registered, RegistrationForm, RegistrationView};
