//! Animal history database operations.

use chrono::{DateTime, Utc};
use rusqlite::params;

use super::{Database, DbResult};
use crate::models::AnimalHistory;

impl Database {
    /// Append a history snapshot. Returns the new row ID.
    pub fn insert_animal_history(&self, history: &AnimalHistory) -> DbResult<i64> {
        self.conn.execute(
            r#"
            INSERT INTO animal_history (animal_id, event_date, event_type, animal_snapshot)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![
                history.animal_id,
                history.event_date,
                history.event_type,
                serde_json::to_string(&history.animal_snapshot)?,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// List an animal's history, oldest first.
    pub fn list_animal_history(&self, animal_id: i64) -> DbResult<Vec<AnimalHistory>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, animal_id, event_date, event_type, animal_snapshot
            FROM animal_history
            WHERE animal_id = ?
            ORDER BY event_date, id
            "#,
        )?;

        let rows = stmt.query_map([animal_id], |row| {
            let id: i64 = row.get(0)?;
            let animal_id: i64 = row.get(1)?;
            let event_date: DateTime<Utc> = row.get(2)?;
            let event_type: String = row.get(3)?;
            let snapshot: String = row.get(4)?;
            Ok((id, animal_id, event_date, event_type, snapshot))
        })?;

        let mut history = Vec::new();
        for row in rows {
            let (id, animal_id, event_date, event_type, snapshot) = row?;
            history.push(AnimalHistory {
                id: Some(id),
                animal_id,
                event_date,
                event_type,
                animal_snapshot: serde_json::from_str(&snapshot)?,
            });
        }
        Ok(history)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Animal, Sex, EVENT_CREATED};
    use chrono::NaiveDate;

    #[test]
    fn test_insert_animal_records_snapshot() {
        let db = Database::open_in_memory().unwrap();
        let animal = Animal::new(
            7,
            NaiveDate::from_ymd_opt(2023, 2, 14).unwrap(),
            Sex::Female,
            "Mus Musculus".into(),
            "NSG".into(),
        );
        db.insert_animal(&animal).unwrap();

        let history = db.list_animal_history(7).unwrap();
        assert_eq!(history.len(), 1);
        assert!(history[0].id.is_some());
        assert_eq!(history[0].event_type, EVENT_CREATED);
        assert_eq!(history[0].snapshot().unwrap(), animal);
    }
}
