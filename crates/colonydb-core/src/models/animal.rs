//! Animal models.

use chrono::{NaiveDate, TimeDelta};
use serde::{Deserialize, Serialize};

/// Biological sex, stored as a single-letter code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sex {
    #[serde(rename = "M")]
    Male,
    #[serde(rename = "F")]
    Female,
    #[serde(rename = "U")]
    Unknown,
}

impl Sex {
    pub fn code(self) -> &'static str {
        match self {
            Sex::Male => "M",
            Sex::Female => "F",
            Sex::Unknown => "U",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "M" => Some(Sex::Male),
            "F" => Some(Sex::Female),
            "U" => Some(Sex::Unknown),
            _ => None,
        }
    }
}

/// How the animal is used in the colony, stored as a single-letter code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Usage {
    #[serde(rename = "E")]
    Experimental,
    #[serde(rename = "B")]
    Breeder,
    #[serde(rename = "U")]
    Undefined,
}

impl Usage {
    pub fn code(self) -> &'static str {
        match self {
            Usage::Experimental => "E",
            Usage::Breeder => "B",
            Usage::Undefined => "U",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "E" => Some(Usage::Experimental),
            "B" => Some(Usage::Breeder),
            "U" => Some(Usage::Undefined),
            _ => None,
        }
    }
}

/// A colony animal.
///
/// Parents and experiment assignments reference other rows by their public
/// identifiers (`animal_id`, `experiment_id`, `group_id`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Animal {
    /// Colony-wide unique identifier (ear tag / mouse ID)
    pub animal_id: i64,
    pub date_of_birth: NaiveDate,
    pub sex: Sex,
    pub species: String,
    pub strain: String,
    /// Dam
    pub female_parent: Option<i64>,
    /// Sire
    pub male_parent: Option<i64>,
    pub wean_date: Option<NaiveDate>,
    pub euthanasia_date: Option<NaiveDate>,
    /// IACUC protocol number
    pub protocol: String,
    pub usage: Usage,
    pub room: String,
    pub cage: String,
    pub label: Option<String>,
    pub notes: Option<String>,
    pub experiment_id: Option<i64>,
    pub experimental_group_id: Option<i64>,
}

impl Animal {
    /// Create an animal with required fields; housing and protocol start empty.
    pub fn new(
        animal_id: i64,
        date_of_birth: NaiveDate,
        sex: Sex,
        species: String,
        strain: String,
    ) -> Self {
        Self {
            animal_id,
            date_of_birth,
            sex,
            species,
            strain,
            female_parent: None,
            male_parent: None,
            wean_date: None,
            euthanasia_date: None,
            protocol: String::new(),
            usage: Usage::Undefined,
            room: String::new(),
            cage: String::new(),
            label: None,
            notes: None,
            experiment_id: None,
            experimental_group_id: None,
        }
    }

    /// Age on the given date. Negative if `on` precedes the date of birth.
    pub fn age(&self, on: NaiveDate) -> TimeDelta {
        on - self.date_of_birth
    }

    /// Whether the animal was alive on the given date.
    pub fn is_alive_on(&self, date: NaiveDate) -> bool {
        date >= self.date_of_birth && self.euthanasia_date.map_or(true, |d| date < d)
    }

    /// Check if either parent is recorded.
    pub fn has_lineage(&self) -> bool {
        self.female_parent.is_some() || self.male_parent.is_some()
    }
}
