//! Unit-normalized decimal quantities.
//!
//! Every stored quantity is a decimal magnitude plus a power-of-ten exponent.
//! Each quantity kind has a closed set of legal exponents and a canonical base:
//!
//! | Kind   | Base  | Exponents                                  |
//! |--------|-------|--------------------------------------------|
//! | weight | gram  | kg = +3, g = 0, mg = -3                    |
//! | volume | mL    | mL = 0, µL = -3                            |
//! | dose   | mg    | mg = 0, µg = -3, ng = -6, pg = -9          |
//!
//! A plan's expected animal weight reuses the weight labels but is normalized
//! to kilograms with `exponent - 3`; see [`Quantity::to_kilograms`].

mod quantity;

pub use quantity::*;

use rust_decimal::Decimal;
use thiserror::Error;

/// Unit conversion and validation errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum UnitError {
    #[error("Invalid {kind} unit exponent: {exponent}")]
    InvalidExponent { kind: &'static str, exponent: i32 },

    #[error("Negative {field}: {value}")]
    Negative { field: &'static str, value: Decimal },

    #[error("{field} has more than {max} decimal places: {value}")]
    TooManyDecimalPlaces {
        field: &'static str,
        value: Decimal,
        max: u32,
    },

    #[error("{field} has more than {max} significant digits: {value}")]
    TooManyDigits {
        field: &'static str,
        value: Decimal,
        max: u32,
    },

    #[error("Decimal overflow scaling {value} by 10^{exponent}")]
    Overflow { value: Decimal, exponent: i32 },
}

pub type UnitResult<T> = Result<T, UnitError>;

/// Maximum significant digits of a stored quantity field.
pub const STORED_MAX_DIGITS: u32 = 7;

/// Maximum decimal places of a stored quantity field.
pub const STORED_DECIMAL_PLACES: u32 = 3;

const MAX_SCALE: u32 = 28;

/// Scale `magnitude` by `10^exponent` with exact decimal arithmetic.
pub fn to_base(magnitude: Decimal, exponent: i32) -> UnitResult<Decimal> {
    let overflow = || UnitError::Overflow {
        value: magnitude,
        exponent,
    };
    if exponent >= 0 {
        let factor = 10i64
            .checked_pow(exponent as u32)
            .map(Decimal::from)
            .ok_or_else(overflow)?;
        magnitude.checked_mul(factor).ok_or_else(overflow)
    } else {
        let scale = exponent.unsigned_abs();
        if scale > MAX_SCALE {
            return Err(overflow());
        }
        magnitude
            .checked_mul(Decimal::new(1, scale))
            .ok_or_else(overflow)
    }
}

/// Inverse of [`to_base`]: express a base-unit value with the given exponent.
pub fn from_base(base: Decimal, exponent: i32) -> UnitResult<Decimal> {
    to_base(base, -exponent)
}

/// Check a stored field against the record precision (7 digits, 3 places).
pub fn check_stored_precision(field: &'static str, value: Decimal) -> UnitResult<()> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(UnitError::Negative { field, value });
    }
    let normalized = value.normalize();
    if normalized.scale() > STORED_DECIMAL_PLACES {
        return Err(UnitError::TooManyDecimalPlaces {
            field,
            value,
            max: STORED_DECIMAL_PLACES,
        });
    }
    // Stored with exactly 3 places, so integer digits are bounded by 7 - 3.
    let limit = Decimal::from(10i64.pow(STORED_MAX_DIGITS - STORED_DECIMAL_PLACES));
    if normalized >= limit {
        return Err(UnitError::TooManyDigits {
            field,
            value,
            max: STORED_MAX_DIGITS,
        });
    }
    Ok(())
}

/// Round a computed value for presentation. Never feed the result back into a calculation.
pub fn round_for_display(value: Decimal, decimal_places: u32) -> Decimal {
    value.round_dp(decimal_places)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_to_base_positive_exponent() {
        assert_eq!(to_base(dec!(22.1), 3).unwrap(), dec!(22100));
    }

    #[test]
    fn test_to_base_negative_exponent() {
        assert_eq!(to_base(dec!(150), -3).unwrap(), dec!(0.15));
        assert_eq!(to_base(dec!(900), -9).unwrap(), dec!(0.0000009));
    }

    #[test]
    fn test_to_base_zero_exponent_is_identity() {
        assert_eq!(to_base(dec!(20.5), 0).unwrap(), dec!(20.5));
    }

    #[test]
    fn test_from_base_inverts() {
        let base = to_base(dec!(123.456), -6).unwrap();
        assert_eq!(from_base(base, -6).unwrap(), dec!(123.456));
    }

    #[test]
    fn test_overflow_reported() {
        assert!(matches!(
            to_base(Decimal::MAX, 3),
            Err(UnitError::Overflow { .. })
        ));
        assert!(matches!(
            to_base(dec!(1), -40),
            Err(UnitError::Overflow { .. })
        ));
    }

    #[test]
    fn test_stored_precision() {
        assert!(check_stored_precision("weight", dec!(9999.999)).is_ok());
        assert!(check_stored_precision("weight", dec!(0)).is_ok());
        assert!(check_stored_precision("weight", dec!(20.500)).is_ok());

        assert!(matches!(
            check_stored_precision("weight", dec!(-1)),
            Err(UnitError::Negative { .. })
        ));
        assert!(matches!(
            check_stored_precision("weight", dec!(0.0001)),
            Err(UnitError::TooManyDecimalPlaces { .. })
        ));
        assert!(matches!(
            check_stored_precision("weight", dec!(10000)),
            Err(UnitError::TooManyDigits { .. })
        ));
    }

    #[test]
    fn test_round_for_display() {
        assert_eq!(round_for_display(dec!(41.860465), 1), dec!(41.9));
        assert_eq!(round_for_display(dec!(6), 1), dec!(6));
    }
}
