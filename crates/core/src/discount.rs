//! Time-bounded percentage discount.

use chrono::{DateTime, Months, Utc};
use num_bigint::BigInt;
use num_rational::BigRational;
use rust_decimal::Decimal;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{DomainError, DomainResult};
use crate::money::Money;
use crate::value_object::ValueObject;

/// Longest allowed discount window.
const MAX_SPAN_MONTHS: u32 = 24;

/// Percentage discount valid over a closed UTC time window.
///
/// The multiplier `percentage / 100` is computed once at construction so
/// pricing calls don't re-allocate a rational per evaluation. Timestamps
/// are `DateTime<Utc>` throughout; a zoned timestamp cannot reach the
/// constructor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Discount {
    percentage: Decimal,
    start_at: DateTime<Utc>,
    end_at: DateTime<Utc>,
    multiplier: BigRational,
}

#[derive(Serialize, Deserialize)]
struct DiscountWire {
    percentage: Decimal,
    start_at: DateTime<Utc>,
    end_at: DateTime<Utc>,
}

impl Discount {
    /// Validate and build a discount.
    ///
    /// Rejects percentages outside `[0, 100]`, windows where
    /// `start_at >= end_at`, and windows longer than two years.
    pub fn new(
        percentage: Decimal,
        start_at: DateTime<Utc>,
        end_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        if percentage < Decimal::ZERO || percentage > Decimal::from(100) {
            return Err(DomainError::invalid_discount_percent(format!(
                "percentage must be within [0, 100], got {percentage}"
            )));
        }
        if start_at >= end_at {
            return Err(DomainError::invalid_discount_period(
                "start must precede end",
            ));
        }
        let max_end = start_at
            .checked_add_months(Months::new(MAX_SPAN_MONTHS))
            .ok_or_else(|| DomainError::invalid_discount_period("start is out of range"))?;
        if end_at > max_end {
            return Err(DomainError::invalid_discount_period(
                "period must not exceed two years",
            ));
        }

        let multiplier = decimal_to_ratio(percentage) / BigRational::from_integer(BigInt::from(100));
        Ok(Self {
            percentage,
            start_at,
            end_at,
            multiplier,
        })
    }

    pub fn percentage(&self) -> Decimal {
        self.percentage
    }

    pub fn start_at(&self) -> DateTime<Utc> {
        self.start_at
    }

    pub fn end_at(&self) -> DateTime<Utc> {
        self.end_at
    }

    /// The cached `percentage / 100` rational.
    pub fn multiplier(&self) -> &BigRational {
        &self.multiplier
    }

    /// Price after the discount: `price - price * multiplier`. Exact.
    pub fn apply(&self, price: &Money) -> Money {
        price.sub(&self.discount_amount(price))
    }

    /// The amount taken off the price: `price * multiplier`. Exact.
    pub fn discount_amount(&self, price: &Money) -> Money {
        price.mul_ratio(&self.multiplier)
    }

    /// Whether `t` falls inside the validity window. Both ends inclusive,
    /// nanosecond resolution.
    pub fn is_valid_at(&self, t: DateTime<Utc>) -> bool {
        self.start_at <= t && t <= self.end_at
    }
}

impl ValueObject for Discount {}

/// Exact conversion: a `Decimal` is `mantissa / 10^scale`.
fn decimal_to_ratio(value: Decimal) -> BigRational {
    BigRational::new(
        BigInt::from(value.mantissa()),
        BigInt::from(10u8).pow(value.scale()),
    )
}

impl Serialize for Discount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        DiscountWire {
            percentage: self.percentage,
            start_at: self.start_at,
            end_at: self.end_at,
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Discount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let wire = DiscountWire::deserialize(deserializer)?;
        Discount::new(wire.percentage, wire.start_at, wire.end_at)
            .map_err(|e| D::Error::custom(e.to_string()))
    }
}
