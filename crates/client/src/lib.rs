//! Pitii client library.
//!
//! Everything a menu front end needs, without the front end:
//!
//! - [`api`] - Typed HTTP client for the menu backend
//! - [`store`] - Product and user stores kept in sync with server echoes
//! - [`session`] - Staff login and the visitor/staff access level
//! - [`views`] - Product management and registration flows
//! - [`config`] - Environment-driven configuration
//!
//! # Data flow
//!
//! Views call store operations; stores call the [`api::ApiClient`] and then
//! update their list from whatever the server returned, never from the draft
//! that was submitted.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod config;
pub mod error;
pub mod session;
pub mod store;
pub mod views;

pub use api::{ApiClient, ApiError};
pub use config::{ClientConfig, ConfigError};
pub use error::AppError;
pub use session::{Access, Session};
pub use store::{ProductStore, UserStore};
