//! Unit enumerations and the tagged [`Quantity`] value type.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{check_stored_precision, to_base, UnitError, UnitResult};

/// A closed set of power-of-ten unit exponents for one quantity kind.
pub trait UnitExponent: Copy + fmt::Debug + TryFrom<i32, Error = UnitError> {
    /// Kind name used in validation messages.
    const KIND: &'static str;

    /// Power of ten converting a magnitude in this unit to the kind's base unit.
    fn exponent(self) -> i32;

    /// Short display label (e.g., "mg").
    fn label(self) -> &'static str;
}

macro_rules! unit_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal {
            $($(#[$vmeta:meta])* $variant:ident = $exp:literal => $label:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "i32", into = "i32")]
        pub enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl UnitExponent for $name {
            const KIND: &'static str = $kind;

            fn exponent(self) -> i32 {
                match self {
                    $($name::$variant => $exp),+
                }
            }

            fn label(self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }

        impl TryFrom<i32> for $name {
            type Error = UnitError;

            fn try_from(exponent: i32) -> Result<Self, Self::Error> {
                match exponent {
                    $($exp => Ok($name::$variant),)+
                    _ => Err(UnitError::InvalidExponent {
                        kind: $kind,
                        exponent,
                    }),
                }
            }
        }

        impl From<$name> for i32 {
            fn from(unit: $name) -> i32 {
                unit.exponent()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }
    };
}

unit_enum! {
    /// Body-weight units, relative to grams.
    WeightUnit, "weight" {
        Kilogram = 3 => "kg",
        Gram = 0 => "g",
        Milligram = -3 => "mg",
    }
}

unit_enum! {
    /// Volume units, relative to milliliters.
    VolumeUnit, "volume" {
        Milliliter = 0 => "mL",
        Microliter = -3 => "µL",
    }
}

unit_enum! {
    /// Dose-mass units, relative to milligrams.
    DoseUnit, "dose" {
        Milligram = 0 => "mg",
        Microgram = -3 => "µg",
        Nanogram = -6 => "ng",
        Picogram = -9 => "pg",
    }
}

/// A decimal magnitude tagged with its unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quantity<U> {
    pub magnitude: Decimal,
    pub unit: U,
}

impl<U: UnitExponent> Quantity<U> {
    pub fn new(magnitude: Decimal, unit: U) -> Self {
        Self { magnitude, unit }
    }

    /// Magnitude in the kind's base unit (g, mL or mg).
    pub fn to_base(&self) -> UnitResult<Decimal> {
        to_base(self.magnitude, self.unit.exponent())
    }

    /// Check the magnitude fits the stored field precision.
    pub fn check_stored(&self, field: &'static str) -> UnitResult<()> {
        check_stored_precision(field, self.magnitude)
    }
}

impl Quantity<WeightUnit> {
    /// Weight in kilograms, for a plan's expected animal weight.
    ///
    /// Applies `exponent - 3` to the gram-relative label. Animal weight
    /// records use [`Quantity::to_base`] (grams) instead.
    pub fn to_kilograms(&self) -> UnitResult<Decimal> {
        to_base(self.magnitude, self.unit.exponent() - 3)
    }
}

impl<U: UnitExponent> fmt::Display for Quantity<U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.magnitude, self.unit.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_exponent_domains() {
        assert_eq!(WeightUnit::try_from(3).unwrap(), WeightUnit::Kilogram);
        assert_eq!(VolumeUnit::try_from(-3).unwrap(), VolumeUnit::Microliter);
        assert_eq!(DoseUnit::try_from(-9).unwrap(), DoseUnit::Picogram);

        assert_eq!(
            VolumeUnit::try_from(3),
            Err(UnitError::InvalidExponent {
                kind: "volume",
                exponent: 3
            })
        );
        assert!(DoseUnit::try_from(1).is_err());
        assert!(WeightUnit::try_from(-6).is_err());
    }

    #[test]
    fn test_weight_record_normalizes_to_grams() {
        let weight = Quantity::new(dec!(22.1), WeightUnit::Kilogram);
        assert_eq!(weight.to_base().unwrap(), dec!(22100));

        let weight = Quantity::new(dec!(500), WeightUnit::Milligram);
        assert_eq!(weight.to_base().unwrap(), dec!(0.5));
    }

    #[test]
    fn test_expected_weight_normalizes_to_kilograms() {
        let expected = Quantity::new(dec!(30), WeightUnit::Gram);
        assert_eq!(expected.to_kilograms().unwrap(), dec!(0.03));

        let expected = Quantity::new(dec!(2), WeightUnit::Kilogram);
        assert_eq!(expected.to_kilograms().unwrap(), dec!(2));
    }

    #[test]
    fn test_volume_rejects_unknown_exponent() {
        let result = VolumeUnit::try_from(-6);
        assert!(matches!(result, Err(UnitError::InvalidExponent { .. })));
    }

    #[test]
    fn test_display() {
        let dose = Quantity::new(dec!(0.9), DoseUnit::Milligram);
        assert_eq!(dose.to_string(), "0.9 mg");
        assert_eq!(VolumeUnit::Microliter.to_string(), "µL");
    }

    #[test]
    fn test_serde_uses_exponent() {
        let json = serde_json::to_string(&VolumeUnit::Microliter).unwrap();
        assert_eq!(json, "-3");
        let unit: DoseUnit = serde_json::from_str("-6").unwrap();
        assert_eq!(unit, DoseUnit::Nanogram);
        assert!(serde_json::from_str::<DoseUnit>("2").is_err());
    }
}
