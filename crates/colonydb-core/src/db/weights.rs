//! Animal weight database operations.

use chrono::NaiveDate;
use rusqlite::{params, OptionalExtension, Row};

use super::{decimal_column, unit_column, Database, DbResult};
use crate::models::AnimalWeight;

fn weight_from_row(row: &Row<'_>) -> rusqlite::Result<AnimalWeight> {
    Ok(AnimalWeight {
        id: Some(row.get(0)?),
        animal_id: row.get(1)?,
        date: row.get(2)?,
        weight: decimal_column(row, 3)?,
        weight_units: unit_column(row, 4)?,
    })
}

impl Database {
    /// Append a weight measurement. Returns the new row ID.
    pub fn insert_weight(&self, weight: &AnimalWeight) -> DbResult<i64> {
        weight.validate()?;
        self.conn.execute(
            r#"
            INSERT INTO animal_weights (animal_id, date, weight, weight_units)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![
                weight.animal_id,
                weight.date,
                weight.weight.to_string(),
                i32::from(weight.weight_units),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// An animal's full weight history, ordered by date then entry order.
    pub fn list_weights(&self, animal_id: i64) -> DbResult<Vec<AnimalWeight>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, animal_id, date, weight, weight_units
            FROM animal_weights
            WHERE animal_id = ?
            ORDER BY date, id
            "#,
        )?;
        let rows = stmt.query_map([animal_id], weight_from_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Most recent weight dated on or before `as_of`. Same-date ties go to the latest entry.
    pub fn latest_weight_on_or_before(
        &self,
        animal_id: i64,
        as_of: NaiveDate,
    ) -> DbResult<Option<AnimalWeight>> {
        self.conn
            .query_row(
                r#"
                SELECT id, animal_id, date, weight, weight_units
                FROM animal_weights
                WHERE animal_id = ?1 AND date <= ?2
                ORDER BY date DESC, id DESC
                LIMIT 1
                "#,
                params![animal_id, as_of],
                weight_from_row,
            )
            .optional()
            .map_err(Into::into)
    }
}
