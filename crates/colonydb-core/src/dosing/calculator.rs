//! Store-backed derived-value calculator.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

use super::{DoseError, DoseOutcome, UnavailableReason};
use crate::db::{Database, DbError};
use crate::models::TreatmentPlan;

/// Calculator errors.
#[derive(Error, Debug)]
pub enum CalculatorError {
    #[error("Database error: {0}")]
    Db(#[from] DbError),

    #[error(transparent)]
    Dose(#[from] DoseError),

    #[error("{0} not found")]
    NotFound(String),
}

pub type CalculatorResult<T> = Result<T, CalculatorError>;

/// Computes derived values by reading the store on every call.
pub struct DoseCalculator<'a> {
    db: &'a Database,
}

impl<'a> DoseCalculator<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Weight in grams on `as_of`, or None if the animal had not been weighed by then.
    pub fn weight_at(
        &self,
        animal_id: i64,
        as_of: NaiveDate,
    ) -> CalculatorResult<Option<Decimal>> {
        match self.db.latest_weight_on_or_before(animal_id, as_of)? {
            Some(weight) => Ok(Some(weight.grams().map_err(DoseError::from)?)),
            None => Ok(None),
        }
    }

    /// Plan concentration, mg/mL.
    pub fn concentration(&self, plan_id: i64) -> CalculatorResult<Decimal> {
        let plan = self.plan(plan_id)?;
        Ok(super::concentration(&plan)?)
    }

    /// Plan target dose, mg/kg.
    pub fn target_dose(&self, plan_id: i64) -> CalculatorResult<Decimal> {
        let plan = self.plan(plan_id)?;
        Ok(super::target_dose(&plan)?)
    }

    /// Dose delivered by a treatment record, mg/kg, or unavailable.
    pub fn actual_dose(&self, record_id: i64) -> CalculatorResult<DoseOutcome> {
        let record = self
            .db
            .get_treatment_record(record_id)?
            .ok_or_else(|| CalculatorError::NotFound(format!("Treatment record {}", record_id)))?;

        let Some(plan_id) = record.treatment_plan_id else {
            tracing::debug!(record_id, "No treatment plan linked; actual dose unavailable");
            return Ok(DoseOutcome::Unavailable(UnavailableReason::NoTreatmentPlan));
        };
        let plan = self.plan(plan_id)?;

        let date = record.datetime.date_naive();
        let weights: Vec<_> = self
            .db
            .latest_weight_on_or_before(record.animal_id, date)?
            .into_iter()
            .collect();

        let outcome = super::actual_dose(&record, Some(&plan), &weights)?;
        tracing::debug!(
            record_id,
            animal_id = record.animal_id,
            %date,
            outcome = %outcome,
            "Computed actual dose"
        );
        Ok(outcome)
    }

    fn plan(&self, plan_id: i64) -> CalculatorResult<TreatmentPlan> {
        self.db
            .get_treatment_plan(plan_id)?
            .ok_or_else(|| CalculatorError::NotFound(format!("Treatment plan {}", plan_id)))
    }
}
