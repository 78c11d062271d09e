//! Bulk import of colony animals from tab-separated genotyping exports.
//!
//! Expected header columns: `Mouse ID`, `Use`, `Strain`, `Protocol Number`,
//! `Sex`, `DOB`, `Wean Date`, `Labels`, `Notes`. Dates are `MM/DD/YYYY`.
//!
//! Rows whose `Mouse ID` already exists in the colony are skipped. The whole
//! file is imported in one transaction: a malformed row aborts everything.

use std::path::Path;

use chrono::NaiveDate;
use colonydb_core::db::{Database, DbError};
use colonydb_core::models::{Animal, Sex, Usage, EVENT_IMPORTED};
use serde::Deserialize;
use thiserror::Error;

/// Species recorded for every imported row.
pub const IMPORTED_SPECIES: &str = "Mus Musculus";

const DATE_FORMAT: &str = "%m/%d/%Y";

/// Import errors.
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Database error: {0}")]
    Db(#[from] DbError),

    #[error("Line {line}: {message}")]
    InvalidRow { line: u64, message: String },
}

pub type ImportResult<T> = Result<T, ImportError>;

/// Outcome counts for one import run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub imported: usize,
    pub skipped_duplicates: usize,
    pub skipped_missing_id: usize,
}

/// One row of the export, as text.
#[derive(Debug, Clone, Deserialize)]
struct AnimalRow {
    #[serde(rename = "Mouse ID")]
    mouse_id: String,
    #[serde(rename = "Use", default)]
    usage: String,
    #[serde(rename = "Strain")]
    strain: String,
    #[serde(rename = "Protocol Number", default)]
    protocol: String,
    #[serde(rename = "Sex", default)]
    sex: String,
    #[serde(rename = "DOB")]
    dob: String,
    #[serde(rename = "Wean Date", default)]
    wean_date: String,
    #[serde(rename = "Labels", default)]
    labels: String,
    #[serde(rename = "Notes", default)]
    notes: String,
}

/// Map the export's usage text to a colony code; unknown text is Undefined.
pub fn map_usage(text: &str) -> Usage {
    match text {
        "Experimental" => Usage::Experimental,
        "Breeder" => Usage::Breeder,
        _ => Usage::Undefined,
    }
}

/// Map the export's sex text to a colony code; unknown text is Unknown.
pub fn map_sex(text: &str) -> Sex {
    match text {
        "Male" => Sex::Male,
        "Female" => Sex::Female,
        _ => Sex::Unknown,
    }
}

fn parse_date(line: u64, column: &str, text: &str) -> ImportResult<NaiveDate> {
    NaiveDate::parse_from_str(text, DATE_FORMAT).map_err(|e| ImportError::InvalidRow {
        line,
        message: format!("{} '{}': {}", column, text, e),
    })
}

fn non_empty(text: String) -> Option<String> {
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

impl AnimalRow {
    fn into_animal(self, line: u64, animal_id: i64) -> ImportResult<Animal> {
        let mut animal = Animal::new(
            animal_id,
            parse_date(line, "DOB", &self.dob)?,
            map_sex(&self.sex),
            IMPORTED_SPECIES.to_string(),
            self.strain,
        );
        animal.usage = map_usage(&self.usage);
        animal.protocol = self.protocol;
        animal.wean_date = if self.wean_date.is_empty() {
            None
        } else {
            Some(parse_date(line, "Wean Date", &self.wean_date)?)
        };
        animal.label = non_empty(self.labels);
        animal.notes = non_empty(self.notes);
        Ok(animal)
    }
}

/// Import animals from TSV text.
pub fn import_tsv(db: &mut Database, input: &str) -> ImportResult<ImportReport> {
    let input = input.strip_prefix('\u{feff}').unwrap_or(input);

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .trim(csv::Trim::All)
        .from_reader(input.as_bytes());
    let headers = reader.headers()?.clone();

    let report = db.with_transaction(|db| {
        let mut report = ImportReport::default();

        for record in reader.records() {
            let record = record?;
            let line = record.position().map_or(0, |p| p.line());
            let row: AnimalRow = record.deserialize(Some(&headers))?;

            if row.mouse_id.is_empty() {
                tracing::warn!(line, "Skipping row without Mouse ID");
                report.skipped_missing_id += 1;
                continue;
            }
            let animal_id: i64 = row.mouse_id.parse().map_err(|_| ImportError::InvalidRow {
                line,
                message: format!("Mouse ID '{}' is not an integer", row.mouse_id),
            })?;
            if db.animal_exists(animal_id)? {
                tracing::warn!(line, animal_id, "Skipping duplicate Mouse ID");
                report.skipped_duplicates += 1;
                continue;
            }

            let animal = row.into_animal(line, animal_id)?;
            db.insert_animal_with_event(&animal, EVENT_IMPORTED)?;
            report.imported += 1;
        }

        Ok::<_, ImportError>(report)
    })?;

    tracing::info!(
        imported = report.imported,
        skipped_duplicates = report.skipped_duplicates,
        skipped_missing_id = report.skipped_missing_id,
        "Animal import complete"
    );
    Ok(report)
}

/// Import animals from a TSV file.
pub fn import_file<P: AsRef<Path>>(db: &mut Database, path: P) -> ImportResult<ImportReport> {
    let path = path.as_ref();
    tracing::info!(file = %path.display(), "Starting animal import");
    let input = std::fs::read_to_string(path)?;
    import_tsv(db, &input)
}
