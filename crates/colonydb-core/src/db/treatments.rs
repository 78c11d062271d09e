//! Treatment plan and treatment record database operations.

use rusqlite::{params, OptionalExtension, Row};

use super::{decimal_column, unit_column, Database, DbResult};
use crate::models::{TreatmentPlan, TreatmentRecord};

fn plan_from_row(row: &Row<'_>) -> rusqlite::Result<TreatmentPlan> {
    Ok(TreatmentPlan {
        id: Some(row.get(0)?),
        treatment: row.get(1)?,
        expected_animal_weight: decimal_column(row, 2)?,
        expected_animal_weight_units: unit_column(row, 3)?,
        volume: decimal_column(row, 4)?,
        volume_units: unit_column(row, 5)?,
        dose: decimal_column(row, 6)?,
        dose_units: unit_column(row, 7)?,
    })
}

fn record_from_row(row: &Row<'_>) -> rusqlite::Result<TreatmentRecord> {
    Ok(TreatmentRecord {
        id: Some(row.get(0)?),
        animal_id: row.get(1)?,
        treatment_plan_id: row.get(2)?,
        datetime: row.get(3)?,
        volume: decimal_column(row, 4)?,
        volume_units: unit_column(row, 5)?,
    })
}

impl Database {
    /// Insert a treatment plan. Returns the new plan ID.
    pub fn insert_treatment_plan(&self, plan: &TreatmentPlan) -> DbResult<i64> {
        plan.validate()?;
        self.conn.execute(
            r#"
            INSERT INTO treatment_plans (
                treatment, expected_animal_weight, expected_animal_weight_units,
                volume, volume_units, dose, dose_units
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                plan.treatment,
                plan.expected_animal_weight.to_string(),
                i32::from(plan.expected_animal_weight_units),
                plan.volume.to_string(),
                i32::from(plan.volume_units),
                plan.dose.to_string(),
                i32::from(plan.dose_units),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Get a treatment plan by ID.
    pub fn get_treatment_plan(&self, id: i64) -> DbResult<Option<TreatmentPlan>> {
        self.conn
            .query_row(
                r#"
                SELECT id, treatment, expected_animal_weight, expected_animal_weight_units,
                       volume, volume_units, dose, dose_units
                FROM treatment_plans
                WHERE id = ?
                "#,
                [id],
                plan_from_row,
            )
            .optional()
            .map_err(Into::into)
    }

    /// Insert a treatment record. Returns the new record ID.
    pub fn insert_treatment_record(&self, record: &TreatmentRecord) -> DbResult<i64> {
        record.validate()?;
        self.conn.execute(
            r#"
            INSERT INTO treatment_records
                (animal_id, treatment_plan_id, datetime, volume, volume_units)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                record.animal_id,
                record.treatment_plan_id,
                record.datetime,
                record.volume.to_string(),
                i32::from(record.volume_units),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Get a treatment record by ID.
    pub fn get_treatment_record(&self, id: i64) -> DbResult<Option<TreatmentRecord>> {
        self.conn
            .query_row(
                r#"
                SELECT id, animal_id, treatment_plan_id, datetime, volume, volume_units
                FROM treatment_records
                WHERE id = ?
                "#,
                [id],
                record_from_row,
            )
            .optional()
            .map_err(Into::into)
    }

    /// List an animal's treatment records in administration order.
    pub fn list_treatment_records(&self, animal_id: i64) -> DbResult<Vec<TreatmentRecord>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, animal_id, treatment_plan_id, datetime, volume, volume_units
            FROM treatment_records
            WHERE animal_id = ?
            ORDER BY datetime, id
            "#,
        )?;
        let rows = stmt.query_map([animal_id], record_from_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbError;
    use crate::models::{Animal, Sex};
    use crate::units::{DoseUnit, VolumeUnit, WeightUnit};
    use chrono::{NaiveDate, TimeZone, Utc};
    use rust_decimal_macros::dec;

    fn setup_db() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.insert_animal(&Animal::new(
            1,
            NaiveDate::from_ymd_opt(2022, 1, 1).unwrap(),
            Sex::Male,
            "Mouse".into(),
            "Balb/c".into(),
        ))
        .unwrap();
        db
    }

    fn plan() -> TreatmentPlan {
        TreatmentPlan {
            id: None,
            treatment: "Test Treatment".into(),
            expected_animal_weight: dec!(30),
            expected_animal_weight_units: WeightUnit::Gram,
            volume: dec!(150),
            volume_units: VolumeUnit::Microliter,
            dose: dec!(0.9),
            dose_units: DoseUnit::Milligram,
        }
    }

    #[test]
    fn test_plan_round_trip() {
        let db = setup_db();
        let id = db.insert_treatment_plan(&plan()).unwrap();

        let retrieved = db.get_treatment_plan(id).unwrap().unwrap();
        assert_eq!(retrieved.id, Some(id));
        assert_eq!(retrieved.dose, dec!(0.9));
        assert_eq!(retrieved.volume_units, VolumeUnit::Microliter);
        assert_eq!(retrieved.expected_animal_weight_units, WeightUnit::Gram);
        assert!(db.get_treatment_plan(id + 1).unwrap().is_none());
    }

    #[test]
    fn test_invalid_plan_rejected() {
        let db = setup_db();
        let mut bad = plan();
        bad.volume = dec!(-150);
        assert!(matches!(
            db.insert_treatment_plan(&bad),
            Err(DbError::Validation(_))
        ));
    }

    #[test]
    fn test_corrupt_exponent_surfaces_as_error() {
        let db = setup_db();
        let id = db.insert_treatment_plan(&plan()).unwrap();

        // Bypass the CHECK constraint to simulate a legacy row
        db.conn()
            .execute_batch("PRAGMA ignore_check_constraints = ON")
            .unwrap();
        db.conn()
            .execute("UPDATE treatment_plans SET dose_units = 2 WHERE id = ?", [id])
            .unwrap();

        assert!(db.get_treatment_plan(id).is_err());
    }

    #[test]
    fn test_record_round_trip() {
        let db = setup_db();
        let plan_id = db.insert_treatment_plan(&plan()).unwrap();

        let record = TreatmentRecord {
            id: None,
            animal_id: 1,
            treatment_plan_id: Some(plan_id),
            datetime: Utc.with_ymd_and_hms(2024, 3, 28, 8, 30, 0).unwrap(),
            volume: dec!(150),
            volume_units: VolumeUnit::Microliter,
        };
        let id = db.insert_treatment_record(&record).unwrap();

        let retrieved = db.get_treatment_record(id).unwrap().unwrap();
        assert_eq!(retrieved.treatment_plan_id, Some(plan_id));
        assert_eq!(retrieved.datetime, record.datetime);
        assert_eq!(retrieved.volume, dec!(150));
    }

    #[test]
    fn test_record_without_plan() {
        let db = setup_db();
        let record = TreatmentRecord {
            id: None,
            animal_id: 1,
            treatment_plan_id: None,
            datetime: Utc.with_ymd_and_hms(2024, 3, 29, 9, 0, 0).unwrap(),
            volume: dec!(0.2),
            volume_units: VolumeUnit::Milliliter,
        };
        let id = db.insert_treatment_record(&record).unwrap();

        let records = db.list_treatment_records(1).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, Some(id));
        assert_eq!(records[0].treatment_plan_id, None);
    }
}
