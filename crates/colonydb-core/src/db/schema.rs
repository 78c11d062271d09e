//! SQLite schema definition.

/// Complete database schema for the colony store.
pub const SCHEMA: &str = r#"
-- Enable foreign keys
PRAGMA foreign_keys = ON;

-- ============================================================================
-- Experiments
-- ============================================================================

CREATE TABLE IF NOT EXISTS experiments (
    experiment_id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    start_date TEXT NOT NULL,
    end_date TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS experimental_groups (
    group_id INTEGER PRIMARY KEY AUTOINCREMENT,
    experiment_id INTEGER NOT NULL REFERENCES experiments(experiment_id) ON DELETE CASCADE,
    group_name TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT ''
);

CREATE INDEX IF NOT EXISTS idx_groups_experiment ON experimental_groups(experiment_id);

-- ============================================================================
-- Animals
-- ============================================================================

CREATE TABLE IF NOT EXISTS animals (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    animal_id INTEGER NOT NULL UNIQUE,
    date_of_birth TEXT NOT NULL,
    sex TEXT NOT NULL CHECK (sex IN ('M', 'F', 'U')),
    species TEXT NOT NULL,
    strain TEXT NOT NULL,
    female_parent INTEGER REFERENCES animals(animal_id) ON DELETE SET NULL,
    male_parent INTEGER REFERENCES animals(animal_id) ON DELETE SET NULL,
    wean_date TEXT,
    euthanasia_date TEXT,
    protocol TEXT NOT NULL DEFAULT '',
    usage TEXT NOT NULL DEFAULT 'U' CHECK (usage IN ('E', 'B', 'U')),
    room TEXT NOT NULL DEFAULT '',
    cage TEXT NOT NULL DEFAULT '',
    label TEXT,
    notes TEXT,
    experiment_id INTEGER REFERENCES experiments(experiment_id) ON DELETE SET NULL,
    experimental_group_id INTEGER REFERENCES experimental_groups(group_id) ON DELETE SET NULL
);

CREATE INDEX IF NOT EXISTS idx_animals_female_parent ON animals(female_parent);
CREATE INDEX IF NOT EXISTS idx_animals_male_parent ON animals(male_parent);
CREATE INDEX IF NOT EXISTS idx_animals_group ON animals(experimental_group_id);

-- Snapshot log (append-only)
CREATE TABLE IF NOT EXISTS animal_history (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    animal_id INTEGER NOT NULL REFERENCES animals(animal_id) ON DELETE CASCADE,
    event_date TEXT NOT NULL,
    event_type TEXT NOT NULL,
    animal_snapshot TEXT NOT NULL                -- JSON object
);

CREATE INDEX IF NOT EXISTS idx_history_animal ON animal_history(animal_id, event_date);

-- ============================================================================
-- Weights (append-only)
-- ============================================================================

-- Decimals are stored as TEXT to keep them exact.
CREATE TABLE IF NOT EXISTS animal_weights (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    animal_id INTEGER NOT NULL REFERENCES animals(animal_id) ON DELETE CASCADE,
    date TEXT NOT NULL,
    weight TEXT NOT NULL,
    weight_units INTEGER NOT NULL CHECK (weight_units IN (3, 0, -3))
);

CREATE INDEX IF NOT EXISTS idx_weights_animal_date ON animal_weights(animal_id, date);

-- ============================================================================
-- Treatments
-- ============================================================================

CREATE TABLE IF NOT EXISTS treatment_plans (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    treatment TEXT NOT NULL,
    expected_animal_weight TEXT NOT NULL,
    expected_animal_weight_units INTEGER NOT NULL CHECK (expected_animal_weight_units IN (3, 0, -3)),
    volume TEXT NOT NULL,
    volume_units INTEGER NOT NULL CHECK (volume_units IN (0, -3)),
    dose TEXT NOT NULL,
    dose_units INTEGER NOT NULL CHECK (dose_units IN (0, -3, -6, -9))
);

CREATE TABLE IF NOT EXISTS treatment_records (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    animal_id INTEGER NOT NULL REFERENCES animals(animal_id) ON DELETE CASCADE,
    treatment_plan_id INTEGER REFERENCES treatment_plans(id) ON DELETE SET NULL,
    datetime TEXT NOT NULL,
    volume TEXT NOT NULL,
    volume_units INTEGER NOT NULL CHECK (volume_units IN (0, -3))
);

CREATE INDEX IF NOT EXISTS idx_records_animal ON treatment_records(animal_id, datetime);
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn test_schema_valid() {
        let conn = Connection::open_in_memory().unwrap();
        let result = conn.execute_batch(SCHEMA);
        assert!(result.is_ok(), "Schema should be valid SQL: {:?}", result);
    }

    #[test]
    fn test_schema_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA).unwrap();
        assert!(conn.execute_batch(SCHEMA).is_ok());
    }

    #[test]
    fn test_unit_exponent_constraints() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA).unwrap();

        // Volume exponent outside {0, -3} should fail
        let result = conn.execute(
            "INSERT INTO treatment_plans (treatment, expected_animal_weight, expected_animal_weight_units,
                                          volume, volume_units, dose, dose_units)
             VALUES ('x', '30', 0, '150', -6, '0.9', 0)",
            [],
        );
        assert!(result.is_err());

        // Valid plan should succeed
        let result = conn.execute(
            "INSERT INTO treatment_plans (treatment, expected_animal_weight, expected_animal_weight_units,
                                          volume, volume_units, dose, dose_units)
             VALUES ('x', '30', 0, '150', -3, '0.9', 0)",
            [],
        );
        assert!(result.is_ok());
    }

    #[test]
    fn test_weight_requires_animal() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA).unwrap();

        let result = conn.execute(
            "INSERT INTO animal_weights (animal_id, date, weight, weight_units)
             VALUES (99, '2022-01-01', '20.5', 0)",
            [],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_sex_constraint() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA).unwrap();

        let result = conn.execute(
            "INSERT INTO animals (animal_id, date_of_birth, sex, species, strain)
             VALUES (1, '2022-01-01', 'X', 'Mouse', 'Balb/c')",
            [],
        );
        assert!(result.is_err());
    }
}
