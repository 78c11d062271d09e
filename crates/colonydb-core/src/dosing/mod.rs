//! Derived dosing values.
//!
//! Pure functions over treatment plans, treatment records and an animal's
//! weight history:
//!
//! - [`concentration`]: plan dose / plan volume, mg/mL
//! - [`target_dose`]: plan dose / expected animal weight, mg/kg
//! - [`actual_dose`]: concentration × administered volume / weight at the
//!   record's date, mg/kg
//! - [`weight_at`]: most recent weight on or before a date, grams
//!
//! Nothing here is cached; the weight history can grow between calls.
//! [`DoseCalculator`] runs the same computations against the store.

mod calculator;

pub use calculator::*;

use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{AnimalWeight, TreatmentPlan, TreatmentRecord};
use crate::units::UnitError;

const GRAMS_PER_KILOGRAM: Decimal = Decimal::ONE_THOUSAND;

/// Errors from malformed inputs. Missing data is a [`DoseOutcome::Unavailable`], not an error.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DoseError {
    #[error(transparent)]
    Unit(#[from] UnitError),

    #[error("{quantity} must be positive to divide by, got {value}")]
    NonPositiveDenominator {
        quantity: &'static str,
        value: Decimal,
    },

    #[error("Treatment record is linked to plan {linked}, got plan {supplied}")]
    PlanMismatch { linked: i64, supplied: i64 },
}

pub type DoseResult<T> = Result<T, DoseError>;

/// Why a derived value could not be computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnavailableReason {
    /// The treatment record has no linked plan
    NoTreatmentPlan,
    /// The animal has no weight dated on or before the treatment
    NoWeightRecorded,
}

impl fmt::Display for UnavailableReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnavailableReason::NoTreatmentPlan => f.write_str("no treatment plan"),
            UnavailableReason::NoWeightRecorded => f.write_str("no prior weight"),
        }
    }
}

/// A derived value that may be legitimately missing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum DoseOutcome {
    Available(Decimal),
    Unavailable(UnavailableReason),
}

impl DoseOutcome {
    pub fn value(&self) -> Option<Decimal> {
        match self {
            DoseOutcome::Available(value) => Some(*value),
            DoseOutcome::Unavailable(_) => None,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, DoseOutcome::Available(_))
    }

    /// Presentation string: rounded value, or "n/a".
    pub fn display(&self, decimal_places: u32) -> String {
        match self {
            DoseOutcome::Available(value) => {
                crate::units::round_for_display(*value, decimal_places).to_string()
            }
            DoseOutcome::Unavailable(_) => "n/a".to_string(),
        }
    }
}

impl fmt::Display for DoseOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DoseOutcome::Available(value) => write!(f, "{}", value),
            DoseOutcome::Unavailable(_) => f.write_str("n/a"),
        }
    }
}

fn divide(
    numerator: Decimal,
    denominator: Decimal,
    quantity: &'static str,
) -> DoseResult<Decimal> {
    if denominator <= Decimal::ZERO {
        return Err(DoseError::NonPositiveDenominator {
            quantity,
            value: denominator,
        });
    }
    numerator
        .checked_div(denominator)
        .ok_or(DoseError::Unit(UnitError::Overflow {
            value: numerator,
            exponent: 0,
        }))
}

/// Most recent weight dated on or before `as_of`, in grams.
///
/// Same-date entries resolve to the highest row ID; unsaved entries rank
/// below saved ones and otherwise by slice position (later wins).
pub fn weight_at(weights: &[AnimalWeight], as_of: NaiveDate) -> DoseResult<Option<Decimal>> {
    let latest = weights
        .iter()
        .filter(|w| w.date <= as_of)
        .max_by_key(|w| (w.date, w.id));

    match latest {
        Some(weight) => Ok(Some(weight.grams()?)),
        None => Ok(None),
    }
}

/// Plan concentration in mg/mL.
pub fn concentration(plan: &TreatmentPlan) -> DoseResult<Decimal> {
    let dose_mg = plan.dose().to_base()?;
    let volume_ml = plan.volume().to_base()?;
    divide(dose_mg, volume_ml, "plan volume")
}

/// Planned dose per expected body weight, mg/kg.
pub fn target_dose(plan: &TreatmentPlan) -> DoseResult<Decimal> {
    let dose_mg = plan.dose().to_base()?;
    let expected_kg = plan.expected_weight().to_kilograms()?;
    divide(dose_mg, expected_kg, "expected animal weight")
}

/// Dose actually delivered by a treatment record, mg/kg.
///
/// `plan` is the record's linked plan, if any; `weights` is the treated
/// animal's weight history. A record without a plan link is unavailable
/// whatever plan is supplied; a saved plan must be the linked one.
pub fn actual_dose(
    record: &TreatmentRecord,
    plan: Option<&TreatmentPlan>,
    weights: &[AnimalWeight],
) -> DoseResult<DoseOutcome> {
    let (Some(linked), Some(plan)) = (record.treatment_plan_id, plan) else {
        return Ok(DoseOutcome::Unavailable(UnavailableReason::NoTreatmentPlan));
    };
    if let Some(supplied) = plan.id {
        if supplied != linked {
            return Err(DoseError::PlanMismatch { linked, supplied });
        }
    }
    let Some(grams) = weight_at(weights, record.datetime.date_naive())? else {
        return Ok(DoseOutcome::Unavailable(UnavailableReason::NoWeightRecorded));
    };

    let mg_per_ml = concentration(plan)?;
    let volume_ml = record.volume().to_base()?;
    let delivered_mg = mg_per_ml
        .checked_mul(volume_ml)
        .ok_or(DoseError::Unit(UnitError::Overflow {
            value: mg_per_ml,
            exponent: 0,
        }))?;
    let kg = grams / GRAMS_PER_KILOGRAM;

    divide(delivered_mg, kg, "animal weight").map(DoseOutcome::Available)
}
