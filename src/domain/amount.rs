use crate::error::{LoadError, Result};
use rand::Rng;
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;

/// Decimal places carried by every amount sent to the bank API.
pub const AMOUNT_SCALE: u32 = 2;

/// Represents a positive monetary amount with at most two decimal places.
///
/// This is a wrapper around `rust_decimal::Decimal` so that sampled values keep
/// exact cents. On the wire it is written as a JSON number, e.g. `123.45`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Amount(#[serde(with = "rust_decimal::serde::float")] Decimal);

impl Amount {
    pub fn new(value: Decimal) -> Result<Self> {
        if value <= Decimal::ZERO {
            return Err(LoadError::Validation(
                "Amount must be positive".to_string(),
            ));
        }
        if value.round_dp(AMOUNT_SCALE) != value {
            return Err(LoadError::Validation(format!(
                "Amount {value} has more than {AMOUNT_SCALE} decimal places"
            )));
        }
        let mut value = value;
        value.rescale(AMOUNT_SCALE);
        if value.scale() != AMOUNT_SCALE || i64::try_from(value.mantissa()).is_err() {
            return Err(LoadError::Validation(format!("Amount {value} is too large")));
        }
        Ok(Self(value))
    }

    /// Builds an amount from a whole number of cents.
    pub fn from_cents(cents: i64) -> Result<Self> {
        Self::new(Decimal::new(cents, AMOUNT_SCALE))
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    pub fn cents(&self) -> i64 {
        // Scale is pinned to 2 and `new` bounds the mantissa to an i64.
        i64::try_from(self.0.mantissa())
            .unwrap_or_else(|_| unreachable!("amount {} exceeds i64 cents", self.0))
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = LoadError;

    fn try_from(value: Decimal) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Inclusive bounds for randomly generated amounts.
///
/// Sampling draws a whole number of cents uniformly between the bounds, so
/// every generated amount lies in range and has at most two decimal digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AmountRange {
    min: Amount,
    max: Amount,
}

impl AmountRange {
    pub fn new(min: Decimal, max: Decimal) -> Result<Self> {
        let min = Amount::new(min)?;
        let max = Amount::new(max)?;
        if min > max {
            return Err(LoadError::Validation(format!(
                "Amount range is empty: {min} > {max}"
            )));
        }
        Ok(Self { min, max })
    }

    /// Builds a range from constants that already carry two decimal places.
    pub(crate) const fn from_scaled(min: Decimal, max: Decimal) -> Self {
        Self {
            min: Amount(min),
            max: Amount(max),
        }
    }

    pub fn min(&self) -> Amount {
        self.min
    }

    pub fn max(&self) -> Amount {
        self.max
    }

    pub fn contains(&self, amount: &Amount) -> bool {
        self.min <= *amount && *amount <= self.max
    }

    /// Draws an amount uniformly from the range.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Amount {
        let cents = rng.gen_range(self.min.cents()..=self.max.cents());
        Amount(Decimal::new(cents, AMOUNT_SCALE))
    }
}
