//! Type-safe price representation using decimal arithmetic.

use core::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Errors that can occur when parsing a [`Price`] from form input.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The input is empty or only whitespace.
    #[error("price cannot be empty")]
    Empty,
    /// The input is not a decimal number.
    #[error("price must be a number")]
    NotNumeric,
    /// The amount is zero or negative.
    #[error("price must be greater than zero")]
    NotPositive,
}

/// A price in US dollars.
///
/// Prices travel to and from the backend as JSON numbers. Values read from
/// the backend are taken as-is; values typed into a form go through
/// [`Price::parse`], which only admits strictly positive amounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Price(Decimal);

impl Price {
    /// Parse a price typed by a user.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, not a decimal number, or not
    /// strictly positive.
    pub fn parse(input: &str) -> Result<Self, PriceError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(PriceError::Empty);
        }

        let amount = Decimal::from_str(trimmed).map_err(|_| PriceError::NotNumeric)?;
        if amount <= Decimal::ZERO {
            return Err(PriceError::NotPositive);
        }

        Ok(Self(amount))
    }

    /// Wrap a decimal amount without validation.
    #[must_use]
    pub const fn from_decimal(amount: Decimal) -> Self {
        Self(amount)
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Format for display (e.g., "$19.99").
    #[must_use]
    pub fn display(&self) -> String {
        format!("${:.2}", self.0)
    }

    /// Plain two-decimal form for prefilling an input (e.g., "19.99").
    #[must_use]
    pub fn to_input_value(&self) -> String {
        format!("{:.2}", self.0)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        rust_decimal::serde::float::serialize(&self.0, serializer)
    }
}

/// Backend documents sometimes carry prices as strings.
#[derive(Deserialize)]
#[serde(untagged)]
enum WirePrice {
    Number(f64),
    Text(String),
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let amount = match WirePrice::deserialize(deserializer)? {
            WirePrice::Number(n) => Decimal::from_f64(n)
                .ok_or_else(|| serde::de::Error::custom(format!("price out of range: {n}")))?,
            WirePrice::Text(s) => Decimal::from_str(s.trim()).map_err(serde::de::Error::custom)?,
        };
        Ok(Self(amount.normalize()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accepts_positive_decimals() {
        assert_eq!(Price::parse("19.99").unwrap().display(), "$19.99");
        assert_eq!(Price::parse(" 5 ").unwrap().display(), "$5.00");
        assert_eq!(Price::parse("0.01").unwrap().display(), "$0.01");
    }

    #[test]
    fn test_parse_rejects_empty() {
        assert_eq!(Price::parse(""), Err(PriceError::Empty));
        assert_eq!(Price::parse("   "), Err(PriceError::Empty));
    }

    #[test]
    fn test_parse_rejects_non_numeric() {
        assert_eq!(Price::parse("abc"), Err(PriceError::NotNumeric));
        assert_eq!(Price::parse("12abc"), Err(PriceError::NotNumeric));
    }

    #[test]
    fn test_parse_rejects_zero_and_negative() {
        assert_eq!(Price::parse("0"), Err(PriceError::NotPositive));
        assert_eq!(Price::parse("0.00"), Err(PriceError::NotPositive));
        assert_eq!(Price::parse("-3"), Err(PriceError::NotPositive));
    }

    #[test]
    fn test_serializes_as_json_number() {
        let price = Price::parse("29.99").unwrap();
        let json = serde_json::to_value(price).unwrap();
        assert!(json.is_number());
        assert!((json.as_f64().unwrap() - 29.99).abs() < f64::EPSILON);
    }

    #[test]
    fn test_deserializes_number_or_string() {
        let from_number: Price = serde_json::from_str("29.99").unwrap();
        let from_string: Price = serde_json::from_str("\"29.99\"").unwrap();
        assert_eq!(from_number.display(), "$29.99");
        assert_eq!(from_string, from_number);
    }

    #[test]
    fn test_input_value() {
        assert_eq!(Price::parse("7.5").unwrap().to_input_value(), "7.50");
    }
}
