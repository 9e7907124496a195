//! Unified error handling for stores and views.

use thiserror::Error;

use crate::api::ApiError;

/// Application-level error type returned by views.
#[derive(Debug, Error)]
pub enum AppError {
    /// The backend call failed.
    #[error("Backend error: {0}")]
    Api(#[from] ApiError),

    /// The operation needs a staff session.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Form input was rejected before any request was sent.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// An ingredient operation was attempted with no product selected.
    #[error("No product selected")]
    NoSubject,
}

impl AppError {
    /// Whether the error came from the backend rather than local checks.
    #[must_use]
    pub const fn is_remote(&self) -> bool {
        matches!(self, Self::Api(_))
    }
}

impl From<pitii_core::PriceError> for AppError {
    fn from(e: pitii_core::PriceError) -> Self {
        Self::InvalidInput(e.to_string())
    }
}

impl From<pitii_core::EmailError> for AppError {
    fn from(e: pitii_core::EmailError) -> Self {
        Self::InvalidInput(e.to_string())
    }
}
