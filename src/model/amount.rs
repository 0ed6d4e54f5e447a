//! Amount type for monetary values.
//!
//! This module provides the `Amount` type which wraps `Decimal`. Because a `Decimal` can never be
//! NaN or infinite, an `Amount` that exists is always a finite number.
//!
//! Parsed amounts are below 10^15 in magnitude and carry at most 15 significant digits. Every such
//! value survives the trip through a JSON number unchanged.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::fmt::{Debug, Display, Formatter};
use std::iter::Sum;
use std::ops::{Add, AddAssign};
use std::str::FromStr;

/// The most significant digits an amount may carry.
pub const MAX_DIGITS: u32 = 15;

/// Represents a signed monetary amount, stored at full precision.
///
/// Equality is numeric, so `10.5` and `10.50` are equal.
///
/// # Examples
///
/// ```
/// # use expense_tracker::model::Amount;
/// # use std::str::FromStr;
/// let amount = Amount::from_str("12.345").unwrap();
/// assert_eq!(amount.to_string(), "12.35");
/// assert!(Amount::from_str("NaN").is_err());
/// assert!(Amount::from_str("5e28").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount(Decimal);

impl Amount {
    pub const ZERO: Amount = Amount(Decimal::ZERO);

    /// Returns the underlying Decimal value.
    pub fn value(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// The amount with trailing zeros removed, e.g. `10.50` becomes `10.5`. This is how amounts
    /// are written to delimited exports.
    pub fn normalized(&self) -> String {
        self.0.normalize().to_string()
    }

    fn from_f64(value: f64) -> Result<Self, AmountError> {
        if !value.is_finite() {
            return Err(AmountError::NotFinite);
        }
        // The shortest representation that round-trips is what a user typed or what was exported.
        Amount::from_str(&value.to_string())
    }

    /// Accepts `value` only if it is within the magnitude and precision an amount may have.
    fn bounded(value: Decimal) -> Result<Self, AmountError> {
        let limit = Decimal::from(10_i64.pow(MAX_DIGITS));
        if value.abs() >= limit {
            return Err(AmountError::TooLarge(value.normalize().to_string()));
        }
        let normalized = value.normalize();
        let digits = normalized.mantissa().unsigned_abs().to_string().len();
        if digits > MAX_DIGITS as usize {
            return Err(AmountError::TooPrecise(normalized.to_string()));
        }
        Ok(Amount(value))
    }

    fn to_f64(self) -> f64 {
        f64::from_str(&self.0.to_string()).unwrap_or_default()
    }
}

/// An error that can occur when parsing text into an `Amount`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AmountError {
    Empty,
    NotFinite,
    Invalid(String),
    TooLarge(String),
    TooPrecise(String),
}

impl Display for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            AmountError::Empty => write!(f, "An amount is required"),
            AmountError::NotFinite => write!(f, "The amount must be a finite number"),
            AmountError::Invalid(s) => write!(f, "'{s}' is not a valid amount"),
            AmountError::TooLarge(s) => {
                write!(f, "'{s}' is too large, amounts must be below 10^{MAX_DIGITS}")
            }
            AmountError::TooPrecise(s) => write!(
                f,
                "'{s}' has more than {MAX_DIGITS} significant digits"
            ),
        }
    }
}

impl std::error::Error for AmountError {}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(AmountError::Empty);
        }

        let unsigned = trimmed.trim_start_matches(['-', '+']).to_ascii_lowercase();
        if unsigned.starts_with("nan") || unsigned.starts_with("inf") {
            return Err(AmountError::NotFinite);
        }

        let parsed = if trimmed.contains(['e', 'E']) {
            Decimal::from_scientific(trimmed)
        } else {
            Decimal::from_str(trimmed)
        };
        let value = parsed.map_err(|_| AmountError::Invalid(trimmed.to_string()))?;
        Amount::bounded(value)
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.2}",
            self.0
                .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
        )
    }
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        // Stored and exported as a plain JSON number.
        if self.0.fract().is_zero() {
            if let Some(whole) = self.0.to_i64() {
                return serializer.serialize_i64(whole);
            }
        }
        serializer.serialize_f64(self.to_f64())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(AmountVisitor)
    }
}

struct AmountVisitor;

impl<'de> Visitor<'de> for AmountVisitor {
    type Value = Amount;

    fn expecting(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "a finite number")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Amount, E> {
        Amount::bounded(Decimal::from(v)).map_err(E::custom)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Amount, E> {
        Amount::bounded(Decimal::from(v)).map_err(E::custom)
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Amount, E> {
        Amount::from_f64(v).map_err(E::custom)
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = AmountError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Amount::bounded(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.value()
    }
}

// Sums stay exact until they pass the largest `Decimal`, and then stop there.
impl Add for Amount {
    type Output = Amount;

    fn add(self, rhs: Amount) -> Amount {
        Amount(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Amount {
    fn add_assign(&mut self, rhs: Amount) {
        *self = *self + rhs;
    }
}

impl Sum for Amount {
    fn sum<I: Iterator<Item = Amount>>(iter: I) -> Amount {
        iter.fold(Amount::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Amount> for Amount {
    fn sum<I: Iterator<Item = &'a Amount>>(iter: I) -> Amount {
        iter.copied().sum()
    }
}
