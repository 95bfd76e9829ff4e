//! Exact fixed-point money.
//!
//! An amount is a whole `units` part plus a `nanos` fraction (billionths of a
//! unit). Both parts always share a sign, so `-1.25` is stored as
//! `units = -1, nanos = -250_000_000`. All arithmetic is integer arithmetic;
//! nothing here ever goes through a float.

use serde::{Deserialize, Serialize};

use crate::error::MoneyError;

/// Number of nanos in one unit.
pub const NANOS_PER_UNIT: i32 = 1_000_000_000;

const NANOS_MOD: i64 = NANOS_PER_UNIT as i64;

/// A monetary amount in a single currency.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "MoneyParts")]
pub struct Money {
    currency_code: String,
    units: i64,
    nanos: i32,
}

/// Unvalidated wire shape, checked on the way in.
#[derive(Deserialize)]
struct MoneyParts {
    currency_code: String,
    #[serde(default)]
    units: i64,
    #[serde(default)]
    nanos: i32,
}

impl TryFrom<MoneyParts> for Money {
    type Error = MoneyError;

    fn try_from(parts: MoneyParts) -> Result<Self, Self::Error> {
        Money::new(parts.currency_code, parts.units, parts.nanos)
    }
}

impl Money {
    /// Creates a validated amount.
    ///
    /// Fails with [`MoneyError::InvalidValue`] when `nanos` is out of range or
    /// its sign disagrees with `units`.
    pub fn new(currency_code: impl Into<String>, units: i64, nanos: i32) -> Result<Self, MoneyError> {
        if !is_valid(units, nanos) {
            return Err(MoneyError::InvalidValue { units, nanos });
        }
        Ok(Self {
            currency_code: currency_code.into(),
            units,
            nanos,
        })
    }

    /// Zero in the given currency.
    pub fn zero(currency_code: impl Into<String>) -> Self {
        Self {
            currency_code: currency_code.into(),
            units: 0,
            nanos: 0,
        }
    }

    /// Whole units, no fraction.
    pub fn from_units(currency_code: impl Into<String>, units: i64) -> Self {
        Self {
            currency_code: currency_code.into(),
            units,
            nanos: 0,
        }
    }

    /// Builds an amount from a total count of nanos.
    pub fn from_nanos(currency_code: impl Into<String>, total_nanos: i128) -> Result<Self, MoneyError> {
        let modulus = i128::from(NANOS_MOD);
        let units = i64::try_from(total_nanos / modulus).map_err(|_| MoneyError::Overflow)?;
        // |remainder| < 1e9, same sign as total_nanos
        let nanos = (total_nanos % modulus) as i32;
        Ok(Self {
            currency_code: currency_code.into(),
            units,
            nanos,
        })
    }

    /// ISO 4217 currency code.
    pub fn currency_code(&self) -> &str {
        &self.currency_code
    }

    pub fn units(&self) -> i64 {
        self.units
    }

    pub fn nanos(&self) -> i32 {
        self.nanos
    }

    /// The whole amount expressed in nanos.
    pub fn total_nanos(&self) -> i128 {
        i128::from(self.units) * i128::from(NANOS_MOD) + i128::from(self.nanos)
    }

    pub fn is_zero(&self) -> bool {
        self.units == 0 && self.nanos == 0
    }

    pub fn is_negative(&self) -> bool {
        self.units < 0 || self.nanos < 0
    }

    /// Adds two amounts of the same currency.
    pub fn sum(&self, other: &Money) -> Result<Money, MoneyError> {
        if self.currency_code != other.currency_code {
            return Err(MoneyError::CurrencyMismatch {
                left: self.currency_code.clone(),
                right: other.currency_code.clone(),
            });
        }

        let units = self
            .units
            .checked_add(other.units)
            .ok_or(MoneyError::Overflow)?;
        let nanos = i64::from(self.nanos) + i64::from(other.nanos);
        let (units, nanos) = normalize(units, nanos)?;

        Ok(Money {
            currency_code: self.currency_code.clone(),
            units,
            nanos,
        })
    }

    /// Multiplies by a non-negative quantity.
    ///
    /// Uses doubling: the running base is summed with itself once per bit of
    /// `n`, and folded into the result wherever that bit is set, so the cost
    /// is logarithmic in `n`.
    pub fn multiply(&self, n: u32) -> Result<Money, MoneyError> {
        let mut result = Money::zero(self.currency_code.clone());
        let mut base = self.clone();
        let mut remaining = n;

        while remaining > 0 {
            if remaining & 1 == 1 {
                result = result.sum(&base)?;
            }
            remaining >>= 1;
            if remaining > 0 {
                base = base.sum(&base)?;
            }
        }

        Ok(result)
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.is_negative() { "-" } else { "" };
        write!(
            f,
            "{} {}{}.{:09}",
            self.currency_code,
            sign,
            self.units.unsigned_abs(),
            self.nanos.unsigned_abs()
        )
    }
}

fn is_valid(units: i64, nanos: i32) -> bool {
    let in_range = i64::from(nanos).abs() < NANOS_MOD;
    let same_sign = (units >= 0 && nanos >= 0) || (units <= 0 && nanos <= 0);
    in_range && same_sign
}

/// Carries whole units out of `nanos`, then borrows so both parts share a sign.
fn normalize(units: i64, nanos: i64) -> Result<(i64, i32), MoneyError> {
    let mut units = units
        .checked_add(nanos / NANOS_MOD)
        .ok_or(MoneyError::Overflow)?;
    let mut nanos = nanos % NANOS_MOD;

    if units > 0 && nanos < 0 {
        units -= 1;
        nanos += NANOS_MOD;
    } else if units < 0 && nanos > 0 {
        units += 1;
        nanos -= NANOS_MOD;
    }

    Ok((units, nanos as i32))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn usd(units: i64, nanos: i32) -> Money {
        Money::new("USD", units, nanos).unwrap()
    }

    fn assert_normalized(m: &Money) {
        assert!(is_valid(m.units(), m.nanos()), "not normalized: {m:?}");
    }

    #[test]
    fn test_sum_carries_nanos_into_units() {
        let total = usd(1, 750_000_000).sum(&usd(2, 750_000_000)).unwrap();
        assert_eq!(total, usd(4, 500_000_000));
    }

    #[test]
    fn test_sum_realigns_opposite_signs() {
        let total = usd(5, 0).sum(&usd(-1, -250_000_000)).unwrap();
        assert_eq!(total, usd(3, 750_000_000));

        let total = usd(-5, 0).sum(&usd(1, 250_000_000)).unwrap();
        assert_eq!(total, usd(-3, -750_000_000));
    }

    #[test]
    fn test_sum_fraction_only_values() {
        let total = usd(0, 400_000_000).sum(&usd(0, -900_000_000)).unwrap();
        assert_eq!(total, usd(0, -500_000_000));

        let total = usd(0, 5).sum(&usd(0, 0)).unwrap();
        assert_eq!(total, usd(0, 5));
    }

    #[test]
    fn test_sum_preserves_exact_value() {
        let samples = [
            usd(0, 0),
            usd(0, 1),
            usd(0, -1),
            usd(0, 999_999_999),
            usd(0, -999_999_999),
            usd(1, 500_000_000),
            usd(-1, -500_000_000),
            usd(12, 345_678_901),
            usd(-7, -1),
            usd(1_000_000, 0),
        ];

        for a in &samples {
            for b in &samples {
                let total = a.sum(b).unwrap();
                assert_eq!(total.total_nanos(), a.total_nanos() + b.total_nanos());
                assert_normalized(&total);
            }
        }
    }

    #[test]
    fn test_sum_currency_mismatch() {
        let eur = Money::from_units("EUR", 1);
        let err = usd(1, 0).sum(&eur).unwrap_err();
        assert_eq!(
            err,
            MoneyError::CurrencyMismatch {
                left: "USD".to_string(),
                right: "EUR".to_string(),
            }
        );
    }

    #[test]
    fn test_sum_overflow_is_reported() {
        let max = Money::from_units("USD", i64::MAX);
        assert_eq!(max.sum(&usd(1, 0)), Err(MoneyError::Overflow));
    }

    #[test]
    fn test_multiply_example() {
        assert_eq!(usd(2, 500_000_000).multiply(3).unwrap(), usd(7, 500_000_000));
    }

    #[test]
    fn test_multiply_by_zero_is_zero_in_same_currency() {
        let product = Money::new("JPY", 150, 0).unwrap().multiply(0).unwrap();
        assert!(product.is_zero());
        assert_eq!(product.currency_code(), "JPY");
    }

    #[test]
    fn test_multiply_matches_scalar_product() {
        let bases = [usd(0, 1), usd(0, 333_333_333), usd(3, 999_999_999), usd(-2, -750_000_000)];
        let factors = [1u32, 2, 3, 7, 10, 64, 1000, 65_537];

        for base in &bases {
            for &n in &factors {
                let product = base.multiply(n).unwrap();
                assert_eq!(product.total_nanos(), base.total_nanos() * i128::from(n));
                assert_normalized(&product);
            }
        }
    }

    #[test]
    fn test_new_rejects_invalid_parts() {
        assert!(Money::new("USD", 1, NANOS_PER_UNIT).is_err());
        assert!(Money::new("USD", 1, -1).is_err());
        assert!(Money::new("USD", -1, 1).is_err());
        assert!(Money::new("USD", 0, -1).is_ok());
    }

    #[test]
    fn test_from_nanos_splits_with_shared_sign() {
        let m = Money::from_nanos("USD", -1_250_000_000).unwrap();
        assert_eq!(m, usd(-1, -250_000_000));
        assert_eq!(m.total_nanos(), -1_250_000_000);
    }

    #[test]
    fn test_display() {
        assert_eq!(usd(4, 500_000_000).to_string(), "USD 4.500000000");
        assert_eq!(usd(0, -1).to_string(), "USD -0.000000001");
    }

    #[test]
    fn test_deserialization_validates() {
        let ok: Money =
            serde_json::from_str(r#"{"currency_code":"USD","units":2,"nanos":5}"#).unwrap();
        assert_eq!(ok, usd(2, 5));

        let bad = serde_json::from_str::<Money>(r#"{"currency_code":"USD","units":2,"nanos":-5}"#);
        assert!(bad.is_err());
    }
}
