use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Number of decimal places every amount is held at.
pub const SCALE: u32 = 2;

/// Currency symbol carried on the wire.
pub const SYMBOL: char = '$';

/// A currency amount fixed at two decimal places.
///
/// Every construction and every arithmetic result is rounded half-away-from-zero,
/// so a running total can be incremented and decremented without drift.
/// On the wire it is a string such as `"$10.00"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Money = Money(Decimal::ZERO);

    pub fn new(amount: Decimal) -> Self {
        Self(amount.round_dp_with_strategy(SCALE, RoundingStrategy::MidpointAwayFromZero))
    }

    pub fn from_cents(cents: i64) -> Self {
        Self(Decimal::new(cents, SCALE))
    }

    pub fn amount(&self) -> Decimal {
        self.0
    }

    /// `None` when the sum does not fit in a `Decimal`.
    pub fn checked_add(self, rhs: Money) -> Option<Money> {
        self.0.checked_add(rhs.0).map(Money::new)
    }

    pub fn checked_sub(self, rhs: Money) -> Option<Money> {
        self.0.checked_sub(rhs.0).map(Money::new)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_sign_negative() && !self.0.is_zero() {
            write!(f, "-{}{:.2}", SYMBOL, self.0.abs())
        } else {
            write!(f, "{}{:.2}", SYMBOL, self.0)
        }
    }
}

impl FromStr for Money {
    type Err = MoneyError;

    /// Accepts `"$10.00"` as well as a bare `"10.00"`. Negative amounts are rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed.strip_prefix(SYMBOL).unwrap_or(trimmed);

        if digits.is_empty() {
            return Err(MoneyError::Invalid(s.to_string()));
        }

        let amount = Decimal::from_str(digits).map_err(|_| MoneyError::Invalid(s.to_string()))?;
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(MoneyError::Negative(s.to_string()));
        }

        Ok(Money::new(amount))
    }
}

impl Serialize for Money {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoneyError {
    #[error("Invalid currency amount: {0:?}")]
    Invalid(String),

    #[error("Negative currency amount: {0:?}")]
    Negative(String),
}
