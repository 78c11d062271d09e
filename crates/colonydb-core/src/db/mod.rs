//! Database layer for the colony store.

mod schema;
mod animals;
mod experiments;
mod history;
mod treatments;
mod weights;

pub use schema::*;
#[allow(unused_imports)]
pub use animals::*;
#[allow(unused_imports)]
pub use treatments::*;
#[allow(unused_imports)]
pub use weights::*;

use std::path::Path;
use std::str::FromStr;

use rusqlite::types::Type;
use rusqlite::{Connection, Row};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::config::{APP_NAME, APP_VERSION};
use crate::units::{UnitError, UnitExponent};

/// Database errors.
#[derive(Error, Debug)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Constraint violation: {0}")]
    Constraint(String),

    #[error("Validation failed: {0}")]
    Validation(#[from] UnitError),
}

pub type DbResult<T> = Result<T, DbError>;

/// Database connection wrapper.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open database at path, creating if needed.
    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let conn = Connection::open(path.as_ref())?;
        tracing::info!(
            app = APP_NAME,
            version = APP_VERSION,
            path = %path.as_ref().display(),
            "Opened colony database"
        );
        let db = Self { conn };
        db.initialize()?;
        Ok(db)
    }

    /// Create in-memory database (for testing).
    pub fn open_in_memory() -> DbResult<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.initialize()?;
        Ok(db)
    }

    /// Initialize schema.
    fn initialize(&self) -> DbResult<()> {
        self.conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    /// Get raw connection (for advanced queries).
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Run `f` inside a transaction, committing on success.
    pub fn with_transaction<T, E>(
        &mut self,
        f: impl FnOnce(&Database) -> Result<T, E>,
    ) -> Result<T, E>
    where
        E: From<DbError>,
    {
        self.conn
            .execute_batch("BEGIN IMMEDIATE")
            .map_err(|e| E::from(DbError::from(e)))?;
        match f(&*self) {
            Ok(value) => {
                self.conn
                    .execute_batch("COMMIT")
                    .map_err(|e| E::from(DbError::from(e)))?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback) = self.conn.execute_batch("ROLLBACK") {
                    tracing::warn!(error = %rollback, "Rollback failed");
                }
                Err(err)
            }
        }
    }
}

impl Database {
    /// Run `f` inside a named savepoint, releasing on success and rolling
    /// back to it on error. Nests inside [`Database::with_transaction`].
    fn with_savepoint<T>(&self, name: &str, f: impl FnOnce() -> DbResult<T>) -> DbResult<T> {
        self.conn.execute_batch(&format!("SAVEPOINT {}", name))?;
        match f() {
            Ok(value) => {
                self.conn.execute_batch(&format!("RELEASE {}", name))?;
                Ok(value)
            }
            Err(err) => {
                let undo = format!("ROLLBACK TO {name}; RELEASE {name}", name = name);
                if let Err(rollback) = self.conn.execute_batch(&undo) {
                    tracing::warn!(error = %rollback, savepoint = name, "Rollback failed");
                }
                Err(err)
            }
        }
    }
}

/// Read a decimal stored as TEXT.
fn decimal_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Decimal> {
    let text: String = row.get(idx)?;
    Decimal::from_str(&text)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// Read a unit exponent stored as INTEGER.
fn unit_column<U: UnitExponent>(row: &Row<'_>, idx: usize) -> rusqlite::Result<U> {
    let exponent: i32 = row.get(idx)?;
    U::try_from(exponent)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Integer, Box::new(e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_in_memory() {
        let db = Database::open_in_memory();
        assert!(db.is_ok());
    }

    #[test]
    fn test_open_file_reopens_existing_schema() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("colony.db");

        Database::open(&path).unwrap();
        assert!(Database::open(&path).is_ok());
    }

    #[test]
    fn test_schema_initialized() {
        let db = Database::open_in_memory().unwrap();

        // Check that tables exist
        let tables: Vec<String> = db
            .conn()
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .filter_map(|r| r.ok())
            .collect();

        for table in [
            "animals",
            "animal_weights",
            "animal_history",
            "experiments",
            "experimental_groups",
            "treatment_plans",
            "treatment_records",
        ] {
            assert!(tables.contains(&table.to_string()), "missing table {}", table);
        }
    }

    #[test]
    fn test_transaction_rolls_back_on_error() {
        let mut db = Database::open_in_memory().unwrap();

        let result: DbResult<()> = db.with_transaction(|db| {
            db.conn().execute(
                "INSERT INTO experiments (title, description, start_date, end_date)
                 VALUES ('t', '', '2024-01-01', '2024-02-01')",
                [],
            )?;
            Err(DbError::Constraint("abort".into()))
        });
        assert!(result.is_err());

        let count: i64 = db
            .conn()
            .query_row("SELECT COUNT(*) FROM experiments", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }
}
