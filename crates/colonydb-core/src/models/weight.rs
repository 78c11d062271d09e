//! Animal weight measurements.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::units::{Quantity, UnitResult, WeightUnit};

/// A single dated weight measurement. Append-only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnimalWeight {
    /// Store row ID - None until inserted
    pub id: Option<i64>,
    /// Owning animal's `animal_id`
    pub animal_id: i64,
    pub date: NaiveDate,
    pub weight: Decimal,
    pub weight_units: WeightUnit,
}

impl AnimalWeight {
    pub fn new(animal_id: i64, date: NaiveDate, weight: Decimal, weight_units: WeightUnit) -> Self {
        Self {
            id: None,
            animal_id,
            date,
            weight,
            weight_units,
        }
    }

    pub fn quantity(&self) -> Quantity<WeightUnit> {
        Quantity::new(self.weight, self.weight_units)
    }

    /// Weight in grams.
    pub fn grams(&self) -> UnitResult<Decimal> {
        self.quantity().to_base()
    }

    /// Validate for data entry.
    pub fn validate(&self) -> UnitResult<()> {
        self.quantity().check_stored("weight")
    }
}
