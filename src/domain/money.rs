use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// Monetary amount in integer minor units (cents).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Money(pub i64);

impl Money {
    pub const SCALE: i64 = 100; // 2 decimal places
    pub const TARGET_DECIMALS: u32 = 2;

    pub fn zero() -> Self {
        Self(0)
    }

    /// Whole currency units; `None` when the cent count does not fit.
    pub fn from_major(units: i64) -> Option<Self> {
        units.checked_mul(Self::SCALE).map(Self)
    }

    pub fn is_positive(&self) -> bool {
        self.0 > 0
    }

    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }

    /// Rounds half-even to cents; `None` when the value does not fit.
    pub fn from_decimal(value: Decimal) -> Option<Self> {
        let rounded = value.round_dp_with_strategy(
            Self::TARGET_DECIMALS,
            RoundingStrategy::MidpointNearestEven,
        );
        let minor = rounded.checked_mul(Decimal::from(Self::SCALE))?;
        minor.trunc().to_i64().map(Self)
    }

    pub fn from_decimal_str(s: &str) -> Option<Self> {
        let s = s.trim();
        if s.is_empty() {
            return None;
        }
        let value = Decimal::from_str(s).ok()?;
        Money::from_decimal(value)
    }
}

impl FromStr for Money {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Money::from_decimal_str(s).ok_or_else(|| format!("Invalid amount: {}", s))
    }
}

/// Whole amounts print without a fraction (`50`), others with cents (`20.50`).
impl core::fmt::Display for Money {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let minor = self.0;
        let sign = if minor < 0 { "-" } else { "" };
        let abs = minor.unsigned_abs();
        let int_part = abs / Self::SCALE as u64;
        let frac_part = abs % Self::SCALE as u64;
        if frac_part == 0 {
            write!(f, "{}{}", sign, int_part)
        } else {
            write!(f, "{}{}.{:02}", sign, int_part, frac_part)
        }
    }
}
