//! Animal database operations.

use rusqlite::types::Type;
use rusqlite::{params, OptionalExtension, Row};

use super::{Database, DbError, DbResult};
use crate::models::{Animal, AnimalHistory, Sex, Usage, EVENT_CREATED, EVENT_UPDATED};

const ANIMAL_COLUMNS: &str = r#"
    animal_id, date_of_birth, sex, species, strain, female_parent, male_parent,
    wean_date, euthanasia_date, protocol, usage, room, cage, label, notes,
    experiment_id, experimental_group_id
"#;

const ANIMAL_PLACEHOLDERS: &str =
    "?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17";

fn code_error(idx: usize, code: &str) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        idx,
        Type::Text,
        format!("unknown code '{}'", code).into(),
    )
}

fn animal_from_row(row: &Row<'_>) -> rusqlite::Result<Animal> {
    let sex: String = row.get(2)?;
    let usage: String = row.get(10)?;
    Ok(Animal {
        animal_id: row.get(0)?,
        date_of_birth: row.get(1)?,
        sex: Sex::from_code(&sex).ok_or_else(|| code_error(2, &sex))?,
        species: row.get(3)?,
        strain: row.get(4)?,
        female_parent: row.get(5)?,
        male_parent: row.get(6)?,
        wean_date: row.get(7)?,
        euthanasia_date: row.get(8)?,
        protocol: row.get(9)?,
        usage: Usage::from_code(&usage).ok_or_else(|| code_error(10, &usage))?,
        room: row.get(11)?,
        cage: row.get(12)?,
        label: row.get(13)?,
        notes: row.get(14)?,
        experiment_id: row.get(15)?,
        experimental_group_id: row.get(16)?,
    })
}

impl Database {
    /// Insert a new animal and record a "created" history snapshot.
    pub fn insert_animal(&self, animal: &Animal) -> DbResult<()> {
        self.insert_animal_with_event(animal, EVENT_CREATED)
    }

    /// Insert a new animal, recording the given history event.
    pub fn insert_animal_with_event(&self, animal: &Animal, event_type: &str) -> DbResult<()> {
        if self.animal_exists(animal.animal_id)? {
            return Err(DbError::Constraint(format!(
                "animal_id {} already exists",
                animal.animal_id
            )));
        }
        self.with_savepoint("insert_animal", || {
            self.write_new_animal(animal)?;
            self.insert_animal_history(&AnimalHistory::from_animal(animal, event_type)?)?;
            Ok(())
        })
    }

    fn write_new_animal(&self, animal: &Animal) -> DbResult<()> {
        self.conn.execute(
            &format!(
                "INSERT INTO animals ({}) VALUES ({})",
                ANIMAL_COLUMNS, ANIMAL_PLACEHOLDERS
            ),
            params![
                animal.animal_id,
                animal.date_of_birth,
                animal.sex.code(),
                animal.species,
                animal.strain,
                animal.female_parent,
                animal.male_parent,
                animal.wean_date,
                animal.euthanasia_date,
                animal.protocol,
                animal.usage.code(),
                animal.room,
                animal.cage,
                animal.label,
                animal.notes,
                animal.experiment_id,
                animal.experimental_group_id,
            ],
        )?;
        Ok(())
    }

    /// Update an existing animal and record an "updated" history snapshot.
    pub fn update_animal(&self, animal: &Animal) -> DbResult<bool> {
        self.with_savepoint("update_animal", || {
            let rows_affected = self.conn.execute(
                r#"
                UPDATE animals SET
                    date_of_birth = ?2,
                    sex = ?3,
                    species = ?4,
                    strain = ?5,
                    female_parent = ?6,
                    male_parent = ?7,
                    wean_date = ?8,
                    euthanasia_date = ?9,
                    protocol = ?10,
                    usage = ?11,
                    room = ?12,
                    cage = ?13,
                    label = ?14,
                    notes = ?15,
                    experiment_id = ?16,
                    experimental_group_id = ?17
                WHERE animal_id = ?1
                "#,
                params![
                    animal.animal_id,
                    animal.date_of_birth,
                    animal.sex.code(),
                    animal.species,
                    animal.strain,
                    animal.female_parent,
                    animal.male_parent,
                    animal.wean_date,
                    animal.euthanasia_date,
                    animal.protocol,
                    animal.usage.code(),
                    animal.room,
                    animal.cage,
                    animal.label,
                    animal.notes,
                    animal.experiment_id,
                    animal.experimental_group_id,
                ],
            )?;
            if rows_affected > 0 {
                self.insert_animal_history(&AnimalHistory::from_animal(animal, EVENT_UPDATED)?)?;
            }
            Ok(rows_affected > 0)
        })
    }

    /// Get an animal by its colony ID.
    pub fn get_animal(&self, animal_id: i64) -> DbResult<Option<Animal>> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM animals WHERE animal_id = ?", ANIMAL_COLUMNS),
                [animal_id],
                animal_from_row,
            )
            .optional()
            .map_err(Into::into)
    }

    /// Check whether a colony ID is taken.
    pub fn animal_exists(&self, animal_id: i64) -> DbResult<bool> {
        let exists: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM animals WHERE animal_id = ?)",
            [animal_id],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    /// List all animals by colony ID.
    pub fn list_animals(&self) -> DbResult<Vec<Animal>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM animals ORDER BY animal_id",
            ANIMAL_COLUMNS
        ))?;
        let rows = stmt.query_map([], animal_from_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// List offspring of an animal (as either parent).
    pub fn list_offspring(&self, animal_id: i64) -> DbResult<Vec<Animal>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM animals WHERE female_parent = ?1 OR male_parent = ?1 ORDER BY animal_id",
            ANIMAL_COLUMNS
        ))?;
        let rows = stmt.query_map([animal_id], animal_from_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// List animals assigned to an experimental group.
    pub fn list_animals_in_group(&self, group_id: i64) -> DbResult<Vec<Animal>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM animals WHERE experimental_group_id = ? ORDER BY animal_id",
            ANIMAL_COLUMNS
        ))?;
        let rows = stmt.query_map([group_id], animal_from_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }
}
