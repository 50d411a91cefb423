//! Arithmetic on [`Money`] values.
//!
//! Amounts are normalized through a single nano-denominated `i128`, which
//! keeps `units` and `nanos` sign-consistent after every operation.

use crate::backends::types::Money;

const NANOS_PER_UNIT: i128 = 1_000_000_000;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoneyError {
    #[error("invalid money value {0:?}")]
    Invalid(Money),

    #[error("currency mismatch: {left} vs {right}")]
    CurrencyMismatch { left: String, right: String },

    #[error("money overflow")]
    Overflow,
}

impl Money {
    pub fn new(currency_code: impl Into<String>, units: i64, nanos: i32) -> Self {
        Self {
            currency_code: currency_code.into(),
            units,
            nanos,
        }
    }

    /// A zero amount in `currency_code`.
    pub fn zero(currency_code: impl Into<String>) -> Self {
        Self::new(currency_code, 0, 0)
    }

    /// Nanos within ±999,999,999 and the same sign as units.
    pub fn is_valid(&self) -> bool {
        let nanos_in_range = (self.nanos as i128).abs() < NANOS_PER_UNIT;
        let signs_agree = (self.units >= 0 && self.nanos >= 0) || (self.units <= 0 && self.nanos <= 0);
        nanos_in_range && signs_agree
    }

    fn total_nanos(&self) -> i128 {
        self.units as i128 * NANOS_PER_UNIT + self.nanos as i128
    }

    fn from_total(currency_code: &str, total: i128) -> Result<Self, MoneyError> {
        let units = i64::try_from(total / NANOS_PER_UNIT).map_err(|_| MoneyError::Overflow)?;
        // |remainder| < 10^9, so it always fits.
        let nanos = (total % NANOS_PER_UNIT) as i32;
        Ok(Self::new(currency_code, units, nanos))
    }

    /// Sum of two amounts in the same currency.
    pub fn checked_add(&self, other: &Money) -> Result<Money, MoneyError> {
        if !self.is_valid() {
            return Err(MoneyError::Invalid(self.clone()));
        }
        if !other.is_valid() {
            return Err(MoneyError::Invalid(other.clone()));
        }
        if self.currency_code != other.currency_code {
            return Err(MoneyError::CurrencyMismatch {
                left: self.currency_code.clone(),
                right: other.currency_code.clone(),
            });
        }
        Self::from_total(&self.currency_code, self.total_nanos() + other.total_nanos())
    }

    /// This amount multiplied by a quantity.
    pub fn times(&self, quantity: u32) -> Result<Money, MoneyError> {
        if !self.is_valid() {
            return Err(MoneyError::Invalid(self.clone()));
        }
        let total = self
            .total_nanos()
            .checked_mul(quantity as i128)
            .ok_or(MoneyError::Overflow)?;
        Self::from_total(&self.currency_code, total)
    }
}
