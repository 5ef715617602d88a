//! Quantity type for numeric cells such as energy, cost and odometer readings.
//!
//! Uploaded files come from spreadsheets in different locales, so a cell may use either `.` or
//! `,` as its decimal separator. `Quantity` normalizes both to an exact `Decimal`.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::error::Error;
use std::fmt;
use std::fmt::{Debug, Display, Formatter};
use std::str::FromStr;

/// An exact, non-locale-specific decimal number parsed from a text cell.
///
/// # Examples
///
/// Decimal comma:
/// ```
/// # use chargebook::model::Quantity;
/// # use std::str::FromStr;
/// let q = Quantity::from_str("12,5").unwrap();
/// assert_eq!(q.to_string(), "12.5");
/// ```
///
/// Decimal point with surrounding whitespace:
/// ```
/// # use chargebook::model::Quantity;
/// # use std::str::FromStr;
/// let q = Quantity::from_str("  40.10 ").unwrap();
/// assert_eq!(q.to_string(), "40.10");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Quantity(Decimal);

impl Quantity {
    pub const ZERO: Quantity = Quantity(Decimal::ZERO);

    pub const fn new(value: Decimal) -> Self {
        Self(value)
    }

    /// Returns the underlying Decimal value.
    pub fn value(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// True for values strictly greater than zero.
    pub fn is_positive(&self) -> bool {
        !self.is_zero() && self.0.is_sign_positive()
    }

    /// True for values strictly less than zero.
    pub fn is_negative(&self) -> bool {
        !self.is_zero() && self.0.is_sign_negative()
    }
}

/// An error that can occur when a cell cannot be parsed into a `Quantity`.
pub struct QuantityError {
    input: String,
    source: Option<rust_decimal::Error>,
}

impl Debug for QuantityError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(self, f)
    }
}

impl Display for QuantityError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.source {
            Some(e) => write!(f, "'{}' is not a number ({e})", self.input),
            None => write!(f, "'{}' is not a number", self.input),
        }
    }
}

impl Error for QuantityError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.source.as_ref().map(|e| e as &(dyn Error + 'static))
    }
}

impl FromStr for Quantity {
    type Err = QuantityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();

        // Unlike a monetary amount, an empty numeric cell is not zero
        if trimmed.is_empty() {
            return Err(QuantityError {
                input: s.to_string(),
                source: None,
            });
        }

        // Decimal comma -> decimal point
        let normalized = trimmed.replace(',', ".");

        let value = Decimal::from_str(&normalized).map_err(|e| QuantityError {
            input: s.to_string(),
            source: Some(e),
        })?;
        Ok(Quantity(value))
    }
}

impl Display for Quantity {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl Serialize for Quantity {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Quantity {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Quantity::from_str(&s).map_err(serde::de::Error::custom)
    }
}

impl From<Decimal> for Quantity {
    fn from(value: Decimal) -> Self {
        Quantity::new(value)
    }
}

impl From<Quantity> for Decimal {
    fn from(q: Quantity) -> Self {
        q.value()
    }
}
