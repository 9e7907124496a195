//! Pitii Core - Shared menu domain types.
//!
//! This crate provides the types shared by every Pitii component:
//! - `client` - Remote resource client, stores and views
//! - `cli` - Command-line front end for staff and visitors
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O and no HTTP clients. Every
//! entity here mirrors the JSON the menu backend sends, with server-assigned
//! identifiers wrapped in newtypes.
//!
//! # Modules
//!
//! - [`types`] - Ids, prices, emails, products, ingredients and users

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
