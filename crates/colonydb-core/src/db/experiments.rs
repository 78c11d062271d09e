//! Experiment and experimental group database operations.

use rusqlite::{params, OptionalExtension};

use super::{Database, DbError, DbResult};
use crate::models::{Experiment, ExperimentalGroup};

impl Database {
    /// Insert an experiment. Returns the new experiment ID.
    pub fn insert_experiment(&self, experiment: &Experiment) -> DbResult<i64> {
        if experiment.end_date < experiment.start_date {
            return Err(DbError::Constraint(format!(
                "experiment '{}' ends before it starts",
                experiment.title
            )));
        }
        self.conn.execute(
            r#"
            INSERT INTO experiments (title, description, start_date, end_date)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![
                experiment.title,
                experiment.description,
                experiment.start_date,
                experiment.end_date,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Get an experiment by ID.
    pub fn get_experiment(&self, experiment_id: i64) -> DbResult<Option<Experiment>> {
        self.conn
            .query_row(
                r#"
                SELECT experiment_id, title, description, start_date, end_date
                FROM experiments
                WHERE experiment_id = ?
                "#,
                [experiment_id],
                |row| {
                    Ok(Experiment {
                        experiment_id: Some(row.get(0)?),
                        title: row.get(1)?,
                        description: row.get(2)?,
                        start_date: row.get(3)?,
                        end_date: row.get(4)?,
                    })
                },
            )
            .optional()
            .map_err(Into::into)
    }

    /// Insert a group under an existing experiment. Returns the new group ID.
    pub fn insert_group(&self, group: &ExperimentalGroup) -> DbResult<i64> {
        self.conn.execute(
            r#"
            INSERT INTO experimental_groups (experiment_id, group_name, description)
            VALUES (?1, ?2, ?3)
            "#,
            params![group.experiment_id, group.group_name, group.description],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// List an experiment's groups.
    pub fn list_groups(&self, experiment_id: i64) -> DbResult<Vec<ExperimentalGroup>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT group_id, experiment_id, group_name, description
            FROM experimental_groups
            WHERE experiment_id = ?
            ORDER BY group_id
            "#,
        )?;

        let rows = stmt.query_map([experiment_id], |row| {
            Ok(ExperimentalGroup {
                group_id: Some(row.get(0)?),
                experiment_id: row.get(1)?,
                group_name: row.get(2)?,
                description: row.get(3)?,
            })
        })?;

        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }
}
