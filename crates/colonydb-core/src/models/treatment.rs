//! Treatment plans and administered treatment records.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::units::{DoseUnit, Quantity, UnitResult, VolumeUnit, WeightUnit};

/// A dosing protocol: how much drug, in what volume, for an animal of what size.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TreatmentPlan {
    /// Store row ID - None until inserted
    pub id: Option<i64>,
    /// Treatment name (e.g., compound and vehicle)
    pub treatment: String,
    pub expected_animal_weight: Decimal,
    /// Gram-relative label; normalized to kilograms with `exponent - 3`
    pub expected_animal_weight_units: WeightUnit,
    pub volume: Decimal,
    pub volume_units: VolumeUnit,
    pub dose: Decimal,
    pub dose_units: DoseUnit,
}

impl TreatmentPlan {
    pub fn expected_weight(&self) -> Quantity<WeightUnit> {
        Quantity::new(self.expected_animal_weight, self.expected_animal_weight_units)
    }

    pub fn volume(&self) -> Quantity<VolumeUnit> {
        Quantity::new(self.volume, self.volume_units)
    }

    pub fn dose(&self) -> Quantity<DoseUnit> {
        Quantity::new(self.dose, self.dose_units)
    }

    /// Validate stored field precision for data entry.
    pub fn validate(&self) -> UnitResult<()> {
        self.expected_weight().check_stored("expected_animal_weight")?;
        self.volume().check_stored("volume")?;
        self.dose().check_stored("dose")
    }
}

/// A treatment actually administered to an animal.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TreatmentRecord {
    /// Store row ID - None until inserted
    pub id: Option<i64>,
    /// Treated animal's `animal_id`
    pub animal_id: i64,
    /// Plan followed, if one was recorded
    pub treatment_plan_id: Option<i64>,
    pub datetime: DateTime<Utc>,
    /// Administered volume
    pub volume: Decimal,
    pub volume_units: VolumeUnit,
}

impl TreatmentRecord {
    pub fn volume(&self) -> Quantity<VolumeUnit> {
        Quantity::new(self.volume, self.volume_units)
    }

    pub fn validate(&self) -> UnitResult<()> {
        self.volume().check_stored("volume")
    }
}
