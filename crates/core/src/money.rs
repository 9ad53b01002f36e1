//! Monetary amounts and tax rates.
//!
//! Amounts are integer cents so totals never drift; the only rounding step is
//! applying a tax rate, which rounds half-up to the cent.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::value_object::ValueObject;

const BASIS_POINTS_PER_UNIT: u128 = 10_000;

/// Non-negative amount in the smallest currency unit (cents).
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(u64);

impl Money {
    pub const ZERO: Money = Money(0);

    pub const fn from_cents(cents: u64) -> Self {
        Self(cents)
    }

    pub const fn cents(self) -> u64 {
        self.0
    }

    pub fn checked_add(self, other: Money) -> DomainResult<Money> {
        self.0.checked_add(other.0).map(Money).ok_or(DomainError::Overflow)
    }

    /// Price of `quantity` units at this unit price.
    pub fn checked_times(self, quantity: u64) -> DomainResult<Money> {
        self.0.checked_mul(quantity).map(Money).ok_or(DomainError::Overflow)
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl ValueObject for Money {}

impl core::fmt::Display for Money {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "${}.{:02}", self.0 / 100, self.0 % 100)
    }
}

/// Tax multiplier stored in basis points (`825` is 8.25%).
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaxRate(u32);

impl TaxRate {
    pub const NONE: TaxRate = TaxRate(0);

    pub const fn from_basis_points(bp: u32) -> Self {
        Self(bp)
    }

    pub const fn basis_points(self) -> u32 {
        self.0
    }

    /// `total × (1 + rate)`, rounded half-up to the cent.
    pub fn apply(self, total: Money) -> DomainResult<Money> {
        let tax = (total.cents() as u128 * self.0 as u128 + BASIS_POINTS_PER_UNIT / 2)
            / BASIS_POINTS_PER_UNIT;
        let tax = u64::try_from(tax).map_err(|_| DomainError::Overflow)?;
        total.checked_add(Money::from_cents(tax))
    }
}

impl ValueObject for TaxRate {}

impl core::fmt::Display for TaxRate {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}.{:02}%", self.0 / 100, self.0 % 100)
    }
}

/// Parses a decimal fraction such as `0.0825` (at most four decimals).
impl FromStr for TaxRate {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || DomainError::invalid_input("tax rate", s);
        let s_trim = s.trim();
        let (whole, frac) = s_trim.split_once('.').unwrap_or((s_trim, ""));

        if whole.is_empty() && frac.is_empty() {
            return Err(invalid());
        }
        if frac.len() > 4 || !whole.bytes().chain(frac.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }

        let whole: u32 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| invalid())?
        };
        let frac: u32 = format!("{frac:0<4}").parse().map_err(|_| invalid())?;

        whole
            .checked_mul(BASIS_POINTS_PER_UNIT as u32)
            .and_then(|bp| bp.checked_add(frac))
            .map(TaxRate)
            .ok_or_else(invalid)
    }
}
