use bigdecimal::{BigDecimal, ParseBigDecimalError, ToPrimitive};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};

const SCALE: i64 = 100;

#[derive(Debug, Clone, Copy, Default)]
/// A monetary value in currency minor units (cents).
///
/// Wrapping an `i64` keeps amounts type-safe and avoids the float
/// precision issues of summing raw decimals. Amounts persist as plain
/// decimal numbers (e.g. `50.0`) to stay compatible with documents the
/// deployed app already wrote, so serde converts at the boundary.
///
/// # Examples
/// ```
/// use tapago_ledger::common::money::Money;
///
/// let amount = Money::from_cents(5000); // Represents 50.00 in currency
/// assert_eq!(amount.as_cents(), 5000);
/// assert_eq!(amount.to_string(), "50.00");
/// ```
pub struct Money(i64);

impl Money {
    pub fn from_cents(value: i64) -> Self {
        Money(value)
    }

    pub fn zero() -> Self {
        Money(0)
    }

    pub fn as_cents(&self) -> i64 {
        self.0
    }

    pub fn is_positive(&self) -> bool {
        self.0 > 0
    }

    pub fn is_negative(&self) -> bool {
        self.0 < 0
    }

    pub fn to_string_2dp(&self) -> String {
        let bd = BigDecimal::from(self.0) / BigDecimal::from(SCALE);
        format!("{:.2}", bd)
    }

    /// Decimal currency units, for the persisted representation.
    pub fn to_units(&self) -> f64 {
        self.0 as f64 / SCALE as f64
    }
}

impl std::str::FromStr for Money {
    type Err = ParseBigDecimalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let t = s.trim();
        if t.is_empty() {
            return Err(ParseBigDecimalError::Other("empty amount".into()));
        }

        let bd: BigDecimal = t.parse()?;

        // Scale to 2 decimal places
        let scaled = (bd * BigDecimal::from(SCALE)).round(0);
        let value: i64 = scaled
            .to_i64()
            .ok_or_else(|| ParseBigDecimalError::Other("amount overflow".into()))?;

        Ok(Money(value))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_2dp())
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.to_units())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct MoneyVisitor;

        impl Visitor<'_> for MoneyVisitor {
            type Value = Money;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a decimal currency amount")
            }

            fn visit_i64<E: de::Error>(self, units: i64) -> Result<Money, E> {
                units
                    .checked_mul(SCALE)
                    .map(Money)
                    .ok_or_else(|| E::custom("amount overflow"))
            }

            fn visit_u64<E: de::Error>(self, units: u64) -> Result<Money, E> {
                i64::try_from(units)
                    .ok()
                    .and_then(|units| units.checked_mul(SCALE))
                    .map(Money)
                    .ok_or_else(|| E::custom("amount overflow"))
            }

            // Fractional amounts go through BigDecimal, like `FromStr`,
            // instead of float arithmetic with a saturating cast.
            fn visit_f64<E: de::Error>(self, units: f64) -> Result<Money, E> {
                let bd = BigDecimal::try_from(units).map_err(E::custom)?;
                let scaled = (bd * BigDecimal::from(SCALE)).round(0);
                scaled
                    .to_i64()
                    .map(Money)
                    .ok_or_else(|| E::custom("amount overflow"))
            }
        }

        deserializer.deserialize_any(MoneyVisitor)
    }
}

impl PartialEq for Money {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}
impl Eq for Money {}

impl PartialOrd for Money {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.0.cmp(&other.0))
    }
}

impl Add for Money {
    type Output = Money;
    fn add(self, rhs: Money) -> Money {
        Money(self.0 + rhs.0)
    }
}

impl Sub for Money {
    type Output = Money;
    fn sub(self, rhs: Money) -> Money {
        Money(self.0 - rhs.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Money) {
        *self = *self - rhs;
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn test_zero() {
        assert_eq!(Money::zero(), Money(0));
    }

    #[test]
    fn test_as_cents() {
        assert_eq!(Money(12345).as_cents(), 12345);
        assert_eq!(Money::zero().as_cents(), 0);
        assert_eq!(Money(-999).as_cents(), -999);
    }

    #[test]
    fn test_from_str_valid() {
        assert_eq!(Money::from_str("1").unwrap(), Money(100));
        assert_eq!(Money::from_str("1.5").unwrap(), Money(150));
        assert_eq!(Money::from_str("50.00").unwrap(), Money(5000));
        assert_eq!(Money::from_str("0.01").unwrap(), Money(1));
        assert_eq!(Money::from_str("  2.00 ").unwrap(), Money(200));
    }

    #[test]
    fn test_from_str_rounding() {
        assert_eq!(Money::from_str("1.999").unwrap(), Money(200));
        assert_eq!(Money::from_str("0.001").unwrap(), Money(0));
    }

    #[test]
    fn test_from_str_invalid() {
        assert!(Money::from_str("").is_err());
        assert!(Money::from_str("   ").is_err());
        assert!(Money::from_str("abc").is_err());
    }

    #[test]
    fn test_to_string_2dp() {
        assert_eq!(Money(100).to_string_2dp(), "1.00");
        assert_eq!(Money(5025).to_string_2dp(), "50.25");
        assert_eq!(Money(1).to_string_2dp(), "0.01");
        assert_eq!(Money(0).to_string_2dp(), "0.00");
    }

    #[test]
    fn test_sign_checks() {
        assert!(Money(1).is_positive());
        assert!(!Money(0).is_positive());
        assert!(Money(-1).is_negative());
        assert!(!Money(0).is_negative());
    }

    #[test]
    fn test_add_sub() {
        assert_eq!(Money(100) + Money(50), Money(150));
        assert_eq!(Money(150) - Money(50), Money(100));
        assert_eq!(Money(50) - Money(100), Money(-50));
    }

    #[test]
    fn test_assign_ops() {
        let mut m = Money(100);
        m += Money(50);
        assert_eq!(m, Money(150));
        m -= Money(150);
        assert_eq!(m, Money::zero());
    }

    #[test]
    fn test_ordering() {
        assert!(Money(100) < Money(150));
        assert!(Money(150) > Money(100));
        assert!(Money(100) <= Money(100));
    }

    #[test]
    fn test_serde_units_roundtrip() {
        let m = Money(5000);
        let json = serde_json::to_string(&m).unwrap();
        assert_eq!(json, "50.0");
        let back: Money = serde_json::from_str(&json).unwrap();
        assert_eq!(back, m);
    }

    #[test]
    fn test_deserialize_rounds_to_cents() {
        let m: Money = serde_json::from_str("19.999").unwrap();
        assert_eq!(m, Money(2000));
    }

    #[test]
    fn test_deserialize_integer_amounts_are_exact() {
        let m: Money = serde_json::from_str("50").unwrap();
        assert_eq!(m, Money(5000));

        // Beyond f64's 2^53 integer range; a float path would drift.
        let m: Money = serde_json::from_str("90071992547409921").unwrap();
        assert_eq!(m, Money(9_007_199_254_740_992_100));
    }

    #[test]
    fn test_deserialize_overflow_is_an_error() {
        assert!(serde_json::from_str::<Money>("922337203685477581").is_err());
        assert!(serde_json::from_str::<Money>("-922337203685477581").is_err());
    }
}
