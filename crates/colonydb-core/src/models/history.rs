//! Animal history snapshots.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Animal;

/// Event types written by the store.
pub const EVENT_CREATED: &str = "created";
pub const EVENT_UPDATED: &str = "updated";
pub const EVENT_IMPORTED: &str = "imported";

/// Point-in-time copy of an animal record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnimalHistory {
    /// Store row ID - None until inserted
    pub id: Option<i64>,
    pub animal_id: i64,
    pub event_date: DateTime<Utc>,
    pub event_type: String,
    /// JSON snapshot of the animal's fields
    pub animal_snapshot: serde_json::Value,
}

impl AnimalHistory {
    /// Snapshot an animal for the given event.
    pub fn from_animal(animal: &Animal, event_type: &str) -> serde_json::Result<Self> {
        Ok(Self {
            id: None,
            animal_id: animal.animal_id,
            event_date: Utc::now(),
            event_type: event_type.to_string(),
            animal_snapshot: serde_json::to_value(animal)?,
        })
    }

    /// Decode the snapshot back into an animal.
    pub fn snapshot(&self) -> serde_json::Result<Animal> {
        serde_json::from_value(self.animal_snapshot.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Sex;
    use chrono::NaiveDate;

    #[test]
    fn test_snapshot_round_trip() {
        let mut animal = Animal::new(
            42,
            NaiveDate::from_ymd_opt(2023, 5, 2).unwrap(),
            Sex::Female,
            "Mus Musculus".into(),
            "C57BL/6".into(),
        );
        animal.male_parent = Some(7);
        animal.cage = "B-12".into();

        let history = AnimalHistory::from_animal(&animal, EVENT_CREATED).unwrap();
        assert_eq!(history.animal_id, 42);
        assert_eq!(history.event_type, "created");
        assert_eq!(history.animal_snapshot["sex"], "F");
        assert_eq!(history.animal_snapshot["date_of_birth"], "2023-05-02");
        assert_eq!(history.snapshot().unwrap(), animal);
    }
}
