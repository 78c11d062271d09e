//! ColonyDB Core Library
//!
//! Record keeping and dose calculations for a research vivarium colony.
//!
//! # Architecture
//!
//! ```text
//!   Data entry / TSV import
//!             │
//!             ▼
//!   ┌───────────────────┐     Animal, AnimalWeight,
//!   │  SQLite store     │     TreatmentPlan, TreatmentRecord,
//!   │  (db)             │     Experiment, AnimalHistory
//!   └─────────┬─────────┘
//!             │ read only
//!             ▼
//!   ┌───────────────────┐
//!   │  DoseCalculator   │  weight_at · concentration
//!   │  (dosing + units) │  target_dose · actual_dose
//!   └─────────┬─────────┘
//!             │ mg/mL, mg/kg, or "n/a"
//!             ▼
//!     Reporting front end (FFI)
//! ```
//!
//! # Core Principle
//!
//! **Derived values are never stored.** Concentration and doses are recomputed
//! from current records on every call, with exact decimal arithmetic.
//!
//! # Modules
//!
//! - [`units`]: Unit-normalized decimal quantities
//! - [`dosing`]: Derived-value calculator
//! - [`models`]: Domain types (Animal, AnimalWeight, TreatmentPlan, etc.)
//! - [`db`]: SQLite database layer
//! - [`config`]: Application constants and environment configuration

pub mod config;
pub mod db;
pub mod dosing;
pub mod models;
pub mod units;

// Re-export commonly used types
pub use db::Database;
pub use dosing::{DoseCalculator, DoseOutcome, UnavailableReason};
pub use models::{
    Animal, AnimalHistory, AnimalWeight, Experiment, ExperimentalGroup, Sex, TreatmentPlan,
    TreatmentRecord, Usage,
};
pub use units::{DoseUnit, Quantity, VolumeUnit, WeightUnit};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::str::FromStr;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
#[uniffi(flat_error)]
pub enum ColonyError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl From<db::DbError> for ColonyError {
    fn from(e: db::DbError) -> Self {
        match e {
            db::DbError::Validation(_) | db::DbError::Constraint(_) => {
                ColonyError::ValidationError(e.to_string())
            }
            db::DbError::NotFound(what) => ColonyError::NotFound(what),
            _ => ColonyError::DatabaseError(e.to_string()),
        }
    }
}

impl From<dosing::CalculatorError> for ColonyError {
    fn from(e: dosing::CalculatorError) -> Self {
        match e {
            dosing::CalculatorError::Db(db) => db.into(),
            dosing::CalculatorError::Dose(dose) => ColonyError::ValidationError(dose.to_string()),
            dosing::CalculatorError::NotFound(what) => ColonyError::NotFound(what),
        }
    }
}

impl From<units::UnitError> for ColonyError {
    fn from(e: units::UnitError) -> Self {
        ColonyError::ValidationError(e.to_string())
    }
}

impl<T> From<std::sync::PoisonError<T>> for ColonyError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        ColonyError::DatabaseError(format!("Lock poisoned: {}", e))
    }
}

fn parse_decimal(field: &str, value: &str) -> Result<Decimal, ColonyError> {
    Decimal::from_str(value.trim())
        .map_err(|e| ColonyError::InvalidInput(format!("{} '{}': {}", field, value, e)))
}

fn parse_date(field: &str, value: &str) -> Result<NaiveDate, ColonyError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|e| ColonyError::InvalidInput(format!("{} '{}': {}", field, value, e)))
}

fn parse_optional_date(
    field: &str,
    value: Option<String>,
) -> Result<Option<NaiveDate>, ColonyError> {
    value
        .filter(|v| !v.trim().is_empty())
        .map(|v| parse_date(field, &v))
        .transpose()
}

fn parse_datetime(field: &str, value: &str) -> Result<DateTime<Utc>, ColonyError> {
    DateTime::parse_from_rfc3339(value.trim())
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| ColonyError::InvalidInput(format!("{} '{}': {}", field, value, e)))
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Open or create a database at the given path.
#[uniffi::export]
pub fn open_database(path: String) -> Result<Arc<ColonyCore>, ColonyError> {
    let db = Database::open(&path)?;
    Ok(Arc::new(ColonyCore {
        db: Arc::new(Mutex::new(db)),
    }))
}

/// Create an in-memory database (for testing).
#[uniffi::export]
pub fn open_database_in_memory() -> Result<Arc<ColonyCore>, ColonyError> {
    let db = Database::open_in_memory()?;
    Ok(Arc::new(ColonyCore {
        db: Arc::new(Mutex::new(db)),
    }))
}

// =========================================================================
// Main API Object
// =========================================================================

/// Thread-safe database wrapper for FFI.
///
/// Each call holds the lock for its whole computation, so a derived value
/// always sees one consistent set of records.
#[derive(uniffi::Object)]
pub struct ColonyCore {
    db: Arc<Mutex<Database>>,
}

#[uniffi::export]
impl ColonyCore {
    // =========================================================================
    // Animal Operations
    // =========================================================================

    /// Add a new animal.
    pub fn add_animal(&self, animal: FfiAnimal) -> Result<(), ColonyError> {
        let animal = Animal::try_from(animal)?;
        let db = self.db.lock()?;
        db.insert_animal(&animal)?;
        Ok(())
    }

    /// Update an existing animal.
    pub fn update_animal(&self, animal: FfiAnimal) -> Result<bool, ColonyError> {
        let animal = Animal::try_from(animal)?;
        let db = self.db.lock()?;
        Ok(db.update_animal(&animal)?)
    }

    /// Get an animal by colony ID.
    pub fn get_animal(&self, animal_id: i64) -> Result<Option<FfiAnimal>, ColonyError> {
        let db = self.db.lock()?;
        Ok(db.get_animal(animal_id)?.map(Into::into))
    }

    /// List offspring of an animal.
    pub fn list_offspring(&self, animal_id: i64) -> Result<Vec<FfiAnimal>, ColonyError> {
        let db = self.db.lock()?;
        let animals = db.list_offspring(animal_id)?;
        Ok(animals.into_iter().map(Into::into).collect())
    }

    /// Age in days on the given date (negative before birth).
    pub fn animal_age_days(&self, animal_id: i64, on: String) -> Result<i64, ColonyError> {
        let on = parse_date("date", &on)?;
        let db = self.db.lock()?;
        let animal = db
            .get_animal(animal_id)?
            .ok_or_else(|| ColonyError::NotFound(format!("Animal {}", animal_id)))?;
        Ok(animal.age(on).num_days())
    }

    // =========================================================================
    // Weight Operations
    // =========================================================================

    /// Record a weight measurement. Returns the new row ID.
    pub fn record_weight(&self, weight: FfiAnimalWeight) -> Result<i64, ColonyError> {
        let weight = AnimalWeight::try_from(weight)?;
        let db = self.db.lock()?;
        Ok(db.insert_weight(&weight)?)
    }

    /// List an animal's weight history.
    pub fn list_weights(&self, animal_id: i64) -> Result<Vec<FfiAnimalWeight>, ColonyError> {
        let db = self.db.lock()?;
        let weights = db.list_weights(animal_id)?;
        Ok(weights.into_iter().map(Into::into).collect())
    }

    // =========================================================================
    // Treatment Operations
    // =========================================================================

    /// Add a treatment plan. Returns the new plan ID.
    pub fn add_treatment_plan(&self, plan: FfiTreatmentPlan) -> Result<i64, ColonyError> {
        let plan = TreatmentPlan::try_from(plan)?;
        let db = self.db.lock()?;
        Ok(db.insert_treatment_plan(&plan)?)
    }

    /// Get a treatment plan by ID.
    pub fn get_treatment_plan(
        &self,
        plan_id: i64,
    ) -> Result<Option<FfiTreatmentPlan>, ColonyError> {
        let db = self.db.lock()?;
        Ok(db.get_treatment_plan(plan_id)?.map(Into::into))
    }

    /// Add a treatment record. Returns the new record ID.
    pub fn add_treatment_record(&self, record: FfiTreatmentRecord) -> Result<i64, ColonyError> {
        let record = TreatmentRecord::try_from(record)?;
        let db = self.db.lock()?;
        Ok(db.insert_treatment_record(&record)?)
    }

    /// List an animal's treatment records.
    pub fn list_treatment_records(
        &self,
        animal_id: i64,
    ) -> Result<Vec<FfiTreatmentRecord>, ColonyError> {
        let db = self.db.lock()?;
        let records = db.list_treatment_records(animal_id)?;
        Ok(records.into_iter().map(Into::into).collect())
    }

    // =========================================================================
    // Derived Values
    // =========================================================================

    /// Weight in grams on a date ("YYYY-MM-DD"), or None if not yet weighed.
    pub fn weight_at(&self, animal_id: i64, date: String) -> Result<Option<String>, ColonyError> {
        let date = parse_date("date", &date)?;
        let db = self.db.lock()?;
        let grams = DoseCalculator::new(&db).weight_at(animal_id, date)?;
        Ok(grams.map(|g| g.to_string()))
    }

    /// Plan concentration in mg/mL.
    pub fn concentration(&self, plan_id: i64) -> Result<String, ColonyError> {
        let db = self.db.lock()?;
        Ok(DoseCalculator::new(&db).concentration(plan_id)?.to_string())
    }

    /// Plan target dose in mg/kg.
    pub fn target_dose(&self, plan_id: i64) -> Result<String, ColonyError> {
        let db = self.db.lock()?;
        Ok(DoseCalculator::new(&db).target_dose(plan_id)?.to_string())
    }

    /// Actual dose in mg/kg for a treatment record.
    pub fn actual_dose(&self, record_id: i64) -> Result<FfiDoseResult, ColonyError> {
        let db = self.db.lock()?;
        let outcome = DoseCalculator::new(&db).actual_dose(record_id)?;
        Ok(outcome.into())
    }
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe animal. Dates are "YYYY-MM-DD"; sex and usage are single-letter codes.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiAnimal {
    pub animal_id: i64,
    pub date_of_birth: String,
    pub sex: String,
    pub species: String,
    pub strain: String,
    pub female_parent: Option<i64>,
    pub male_parent: Option<i64>,
    pub wean_date: Option<String>,
    pub euthanasia_date: Option<String>,
    pub protocol: String,
    pub usage: String,
    pub room: String,
    pub cage: String,
    pub label: Option<String>,
    pub notes: Option<String>,
    pub experiment_id: Option<i64>,
    pub experimental_group_id: Option<i64>,
}

impl From<Animal> for FfiAnimal {
    fn from(animal: Animal) -> Self {
        Self {
            animal_id: animal.animal_id,
            date_of_birth: animal.date_of_birth.to_string(),
            sex: animal.sex.code().to_string(),
            species: animal.species,
            strain: animal.strain,
            female_parent: animal.female_parent,
            male_parent: animal.male_parent,
            wean_date: animal.wean_date.map(|d| d.to_string()),
            euthanasia_date: animal.euthanasia_date.map(|d| d.to_string()),
            protocol: animal.protocol,
            usage: animal.usage.code().to_string(),
            room: animal.room,
            cage: animal.cage,
            label: animal.label,
            notes: animal.notes,
            experiment_id: animal.experiment_id,
            experimental_group_id: animal.experimental_group_id,
        }
    }
}

impl TryFrom<FfiAnimal> for Animal {
    type Error = ColonyError;

    fn try_from(animal: FfiAnimal) -> Result<Self, Self::Error> {
        Ok(Animal {
            animal_id: animal.animal_id,
            date_of_birth: parse_date("date_of_birth", &animal.date_of_birth)?,
            sex: Sex::from_code(&animal.sex)
                .ok_or_else(|| ColonyError::InvalidInput(format!("sex '{}'", animal.sex)))?,
            species: animal.species,
            strain: animal.strain,
            female_parent: animal.female_parent,
            male_parent: animal.male_parent,
            wean_date: parse_optional_date("wean_date", animal.wean_date)?,
            euthanasia_date: parse_optional_date("euthanasia_date", animal.euthanasia_date)?,
            protocol: animal.protocol,
            usage: Usage::from_code(&animal.usage)
                .ok_or_else(|| ColonyError::InvalidInput(format!("usage '{}'", animal.usage)))?,
            room: animal.room,
            cage: animal.cage,
            label: animal.label,
            notes: animal.notes,
            experiment_id: animal.experiment_id,
            experimental_group_id: animal.experimental_group_id,
        })
    }
}

/// FFI-safe weight measurement. `weight` is a decimal string; `weight_units` the exponent.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiAnimalWeight {
    pub id: Option<i64>,
    pub animal_id: i64,
    pub date: String,
    pub weight: String,
    pub weight_units: i32,
}

impl From<AnimalWeight> for FfiAnimalWeight {
    fn from(weight: AnimalWeight) -> Self {
        Self {
            id: weight.id,
            animal_id: weight.animal_id,
            date: weight.date.to_string(),
            weight: weight.weight.to_string(),
            weight_units: weight.weight_units.into(),
        }
    }
}

impl TryFrom<FfiAnimalWeight> for AnimalWeight {
    type Error = ColonyError;

    fn try_from(weight: FfiAnimalWeight) -> Result<Self, Self::Error> {
        Ok(AnimalWeight {
            id: weight.id,
            animal_id: weight.animal_id,
            date: parse_date("date", &weight.date)?,
            weight: parse_decimal("weight", &weight.weight)?,
            weight_units: WeightUnit::try_from(weight.weight_units)?,
        })
    }
}

/// FFI-safe treatment plan.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiTreatmentPlan {
    pub id: Option<i64>,
    pub treatment: String,
    pub expected_animal_weight: String,
    pub expected_animal_weight_units: i32,
    pub volume: String,
    pub volume_units: i32,
    pub dose: String,
    pub dose_units: i32,
}

impl From<TreatmentPlan> for FfiTreatmentPlan {
    fn from(plan: TreatmentPlan) -> Self {
        Self {
            id: plan.id,
            treatment: plan.treatment,
            expected_animal_weight: plan.expected_animal_weight.to_string(),
            expected_animal_weight_units: plan.expected_animal_weight_units.into(),
            volume: plan.volume.to_string(),
            volume_units: plan.volume_units.into(),
            dose: plan.dose.to_string(),
            dose_units: plan.dose_units.into(),
        }
    }
}

impl TryFrom<FfiTreatmentPlan> for TreatmentPlan {
    type Error = ColonyError;

    fn try_from(plan: FfiTreatmentPlan) -> Result<Self, Self::Error> {
        Ok(TreatmentPlan {
            id: plan.id,
            treatment: plan.treatment,
            expected_animal_weight: parse_decimal(
                "expected_animal_weight",
                &plan.expected_animal_weight,
            )?,
            expected_animal_weight_units: WeightUnit::try_from(plan.expected_animal_weight_units)?,
            volume: parse_decimal("volume", &plan.volume)?,
            volume_units: VolumeUnit::try_from(plan.volume_units)?,
            dose: parse_decimal("dose", &plan.dose)?,
            dose_units: DoseUnit::try_from(plan.dose_units)?,
        })
    }
}

/// FFI-safe treatment record. `datetime` is RFC 3339.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiTreatmentRecord {
    pub id: Option<i64>,
    pub animal_id: i64,
    pub treatment_plan_id: Option<i64>,
    pub datetime: String,
    pub volume: String,
    pub volume_units: i32,
}

impl From<TreatmentRecord> for FfiTreatmentRecord {
    fn from(record: TreatmentRecord) -> Self {
        Self {
            id: record.id,
            animal_id: record.animal_id,
            treatment_plan_id: record.treatment_plan_id,
            datetime: record.datetime.to_rfc3339(),
            volume: record.volume.to_string(),
            volume_units: record.volume_units.into(),
        }
    }
}

impl TryFrom<FfiTreatmentRecord> for TreatmentRecord {
    type Error = ColonyError;

    fn try_from(record: FfiTreatmentRecord) -> Result<Self, Self::Error> {
        Ok(TreatmentRecord {
            id: record.id,
            animal_id: record.animal_id,
            treatment_plan_id: record.treatment_plan_id,
            datetime: parse_datetime("datetime", &record.datetime)?,
            volume: parse_decimal("volume", &record.volume)?,
            volume_units: VolumeUnit::try_from(record.volume_units)?,
        })
    }
}

/// FFI-safe derived dose.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiDoseResult {
    /// Full-precision value, None when unavailable
    pub value: Option<String>,
    /// Rounded to one decimal place, or "n/a"
    pub display: String,
    pub unavailable_reason: Option<String>,
}

impl From<DoseOutcome> for FfiDoseResult {
    fn from(outcome: DoseOutcome) -> Self {
        Self {
            value: outcome.value().map(|v| v.to_string()),
            display: outcome.display(1),
            unavailable_reason: match outcome {
                DoseOutcome::Available(_) => None,
                DoseOutcome::Unavailable(reason) => Some(reason.to_string()),
            },
        }
    }
}
