//! Experiments and their groups.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Experiment {
    /// Store row ID - None until inserted
    pub experiment_id: Option<i64>,
    pub title: String,
    pub description: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl Experiment {
    /// Check if the experiment was running on the given date (inclusive).
    pub fn is_active_on(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }
}

/// An arm of an experiment (e.g., vehicle control, high dose).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExperimentalGroup {
    /// Store row ID - None until inserted
    pub group_id: Option<i64>,
    pub experiment_id: i64,
    pub group_name: String,
    pub description: String,
}
