//! Core types for the Pitii menu.
//!
//! This module provides type-safe wrappers for the menu domain.

pub mod email;
pub mod id;
pub mod image;
pub mod ingredient;
pub mod price;
pub mod product;
pub mod user;

pub use email::{Email, EmailError};
pub use id::*;
pub use image::{ImageUpload, ProductImage};
pub use ingredient::Ingredient;
pub use price::{Price, PriceError};
pub use product::{Product, ProductDraft};
pub use user::User;
