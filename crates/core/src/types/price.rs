//! Menu prices using decimal arithmetic.
//!
//! The product form collects the price as free text; the backend echoes it
//! back either as a JSON string (`"10"`) or a number (`10.5`). [`Price`]
//! accepts both on the way in and always sends the decimal text on the way out.

use core::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Price`] from form input.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The price field was left blank.
    #[error("price cannot be empty")]
    Empty,
    /// The text is not a decimal number.
    #[error("price is not a number: {0}")]
    NotANumber(String),
    /// Menu items cannot cost less than nothing.
    #[error("price cannot be negative")]
    Negative,
}

/// The price of a menu item, in the restaurant's currency.
///
/// ```
/// use pitii_core::Price;
///
/// let price = Price::parse("12.50").unwrap();
/// assert_eq!(price.to_string(), "12.50");
/// assert!(Price::parse("-1").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// Create a price from a decimal amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Parse the text typed into the price field.
    ///
    /// A comma is accepted as the decimal separator (`"12,50"`).
    ///
    /// # Errors
    ///
    /// Returns an error if the input is blank, not a number, or negative.
    pub fn parse(input: &str) -> Result<Self, PriceError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(PriceError::Empty);
        }

        let normalized = trimmed.replace(',', ".");
        let amount = Decimal::from_str(&normalized)
            .map_err(|_| PriceError::NotANumber(trimmed.to_owned()))?;

        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative);
        }

        Ok(Self(amount))
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Price {
    type Err = PriceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}
