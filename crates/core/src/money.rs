//! Exact rational monetary arithmetic.
//!
//! Percentage discounts on decimal prices produce repeating fractions in
//! decimal, so prices are kept as exact rationals and only narrowed to an
//! `(i64, i64)` numerator/denominator pair at the persistence and wire
//! boundaries. Narrowing fails with `MoneyOverflow` instead of truncating.

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{Signed, ToPrimitive, Zero};
use serde::de::Error as _;
use serde::ser::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{DomainError, DomainResult};
use crate::value_object::ValueObject;

/// Monetary amount as an exact rational number.
///
/// Internally a `BigRational`, always reduced to lowest terms with a
/// positive denominator. Arithmetic never mutates an operand and cannot
/// overflow; only narrowing back to int64 can fail.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Money(BigRational);

/// Wire/storage shape of a monetary value: lowest-terms int64 fraction.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct MoneyWire {
    numerator: i64,
    denominator: i64,
}

impl Money {
    /// Build a monetary value from an int64 fraction.
    ///
    /// The denominator must be strictly positive; the sign of the value
    /// lives in the numerator.
    pub fn of(numerator: i64, denominator: i64) -> DomainResult<Self> {
        if denominator <= 0 {
            return Err(DomainError::invalid_price(format!(
                "denominator must be positive, got {denominator}"
            )));
        }
        Ok(Self(BigRational::new(
            BigInt::from(numerator),
            BigInt::from(denominator),
        )))
    }

    pub fn zero() -> Self {
        Self(BigRational::zero())
    }

    /// Wrap an arbitrary-precision rational.
    pub fn from_ratio(ratio: BigRational) -> Self {
        Self(ratio)
    }

    pub fn as_ratio(&self) -> &BigRational {
        &self.0
    }

    pub fn add(&self, other: &Money) -> Money {
        Money(&self.0 + &other.0)
    }

    pub fn sub(&self, other: &Money) -> Money {
        Money(&self.0 - &other.0)
    }

    pub fn mul(&self, other: &Money) -> Money {
        Money(&self.0 * &other.0)
    }

    /// Multiply by a bare rational (discount multipliers and the like).
    pub fn mul_ratio(&self, ratio: &BigRational) -> Money {
        Money(&self.0 * ratio)
    }

    pub fn div(&self, other: &Money) -> DomainResult<Money> {
        if other.is_zero() {
            return Err(DomainError::invalid_price("division by zero"));
        }
        Ok(Money(&self.0 / &other.0))
    }

    /// -1, 0, or 1 depending on the numerator sign.
    pub fn sign(&self) -> i32 {
        if self.0.is_zero() {
            0
        } else if self.0.is_negative() {
            -1
        } else {
            1
        }
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_positive(&self) -> bool {
        self.0.is_positive()
    }

    /// Canonical (lowest terms, positive denominator) copy of the value.
    ///
    /// `BigRational` reduces on every construction, so this is a plain
    /// clone; the method exists so stored representations are explicitly
    /// canonicalized at the call sites that persist them.
    pub fn normalize(&self) -> Money {
        self.clone()
    }

    /// Numerator after reduction to lowest terms.
    pub fn numerator(&self) -> DomainResult<i64> {
        self.0.numer().to_i64().ok_or(DomainError::MoneyOverflow)
    }

    /// Denominator after reduction to lowest terms. Always positive.
    pub fn denominator(&self) -> DomainResult<i64> {
        self.0.denom().to_i64().ok_or(DomainError::MoneyOverflow)
    }

    /// The `(numerator, denominator)` pair bound into storage columns.
    pub fn storage_parts(&self) -> DomainResult<(i64, i64)> {
        Ok((self.numerator()?, self.denominator()?))
    }

    /// Whether the reduced value fits the int64 storage columns.
    pub fn is_storage_safe(&self) -> bool {
        self.0.numer().to_i64().is_some() && self.0.denom().to_i64().is_some()
    }

    /// Approximate float for display. The second component is `true` when
    /// the float represents the value exactly.
    pub fn float64(&self) -> (f64, bool) {
        let f = self.0.to_f64().unwrap_or(f64::NAN);
        let exact = BigRational::from_float(f).is_some_and(|r| r == self.0);
        (f, exact)
    }
}

impl ValueObject for Money {}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let (numerator, denominator) = self
            .storage_parts()
            .map_err(|e| S::Error::custom(e.to_string()))?;
        MoneyWire {
            numerator,
            denominator,
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let wire = MoneyWire::deserialize(deserializer)?;
        Money::of(wire.numerator, wire.denominator).map_err(|e| D::Error::custom(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn money(n: i64, d: i64) -> Money {
        Money::of(n, d).unwrap()
    }

    #[test]
    fn of_rejects_non_positive_denominator() {
        assert!(matches!(
            Money::of(1, 0).unwrap_err(),
            DomainError::InvalidPrice(_)
        ));
        assert!(matches!(
            Money::of(1, -4).unwrap_err(),
            DomainError::InvalidPrice(_)
        ));
    }

    #[test]
    fn construction_reduces_to_lowest_terms() {
        let m = money(10_000, 100);
        assert_eq!(m.storage_parts().unwrap(), (100, 1));
        assert_eq!(money(-6, 4).storage_parts().unwrap(), (-3, 2));
    }

    #[test]
    fn arithmetic_is_exact() {
        // 1/3 + 1/6 = 1/2, unrepresentable in binary or decimal floats.
        let sum = money(1, 3).add(&money(1, 6));
        assert_eq!(sum, money(1, 2));

        let product = money(2, 3).mul(&money(3, 4));
        assert_eq!(product, money(1, 2));

        let diff = money(1, 2).sub(&money(1, 3));
        assert_eq!(diff, money(1, 6));
    }

    #[test]
    fn div_rejects_zero_divisor() {
        let err = money(1, 2).div(&Money::zero()).unwrap_err();
        assert!(matches!(err, DomainError::InvalidPrice(_)));
        assert_eq!(money(1, 2).div(&money(1, 4)).unwrap(), money(2, 1));
    }

    #[test]
    fn sign_and_zero_follow_the_numerator() {
        assert_eq!(money(5, 2).sign(), 1);
        assert_eq!(money(-5, 2).sign(), -1);
        assert_eq!(Money::zero().sign(), 0);
        assert!(Money::zero().is_zero());
        assert!(money(1, 100).is_positive());
        assert!(!money(-1, 100).is_positive());
    }

    #[test]
    fn comparison_uses_rational_order() {
        assert!(money(1, 3) < money(1, 2));
        assert!(money(2, 4) == money(1, 2));
        assert!(money(-1, 2) < Money::zero());
    }

    #[test]
    fn overflow_is_detected_after_reduction() {
        // i64::MAX/3 * 9 exceeds i64 even though both operands fit.
        let big = money(i64::MAX, 3);
        let tripled = big.mul(&money(9, 1));
        assert!(!tripled.is_storage_safe());
        assert_eq!(tripled.numerator().unwrap_err(), DomainError::MoneyOverflow);

        // A huge intermediate that reduces back into range stays safe.
        let safe = big.mul(&money(3, i64::MAX));
        assert!(safe.is_storage_safe());
        assert_eq!(safe.storage_parts().unwrap(), (1, 1));
    }

    #[test]
    fn float64_reports_exactness() {
        let (f, exact) = money(1, 2).float64();
        assert_eq!(f, 0.5);
        assert!(exact);

        let (f, exact) = money(1, 3).float64();
        assert!((f - 1.0 / 3.0).abs() < 1e-15);
        assert!(!exact);
    }

    #[test]
    fn serde_round_trips_as_fraction() {
        let m = money(8_000, 100);
        let json = serde_json::to_value(&m).unwrap();
        assert_eq!(json, serde_json::json!({"numerator": 80, "denominator": 1}));
        let back: Money = serde_json::from_value(json).unwrap();
        assert_eq!(back, m);
    }

    #[test]
    fn serde_rejects_unstorable_values() {
        let huge = money(i64::MAX, 1).mul(&money(2, 1));
        assert!(serde_json::to_value(&huge).is_err());
        assert!(serde_json::from_str::<Money>(r#"{"numerator":1,"denominator":0}"#).is_err());
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        fn gcd(mut a: i128, mut b: i128) -> i128 {
            while b != 0 {
                (a, b) = (b, a % b);
            }
            a.abs()
        }

        proptest! {
            /// Property: stored parts are in lowest terms with a positive
            /// denominator, and checking storage safety has no side effects.
            #[test]
            fn parts_are_lowest_terms(n in -1_000_000i64..1_000_000, d in 1i64..1_000_000) {
                let m = Money::of(n, d).unwrap();
                prop_assert!(m.is_storage_safe());
                let before = m.clone();
                let (pn, pd) = m.storage_parts().unwrap();
                prop_assert_eq!(&m, &before);
                prop_assert!(pd > 0);
                if pn != 0 {
                    prop_assert_eq!(gcd(pn as i128, pd as i128), 1);
                }
                prop_assert_eq!(pn as i128 * d as i128, n as i128 * pd as i128);
            }

            /// Property: scaling numerator and denominator by a common
            /// factor yields the same canonical value.
            #[test]
            fn common_factors_cancel(n in -10_000i64..10_000, d in 1i64..10_000, k in 1i64..1_000) {
                let a = Money::of(n, d).unwrap();
                let b = Money::of(n * k, d * k).unwrap();
                prop_assert_eq!(a.storage_parts().unwrap(), b.storage_parts().unwrap());
            }

            /// Property: addition and subtraction are exact inverses.
            #[test]
            fn add_sub_round_trip(
                n1 in -10_000i64..10_000, d1 in 1i64..10_000,
                n2 in -10_000i64..10_000, d2 in 1i64..10_000,
            ) {
                let a = Money::of(n1, d1).unwrap();
                let b = Money::of(n2, d2).unwrap();
                prop_assert_eq!(a.add(&b).sub(&b), a);
            }
        }
    }
}
