//! SQLite persistence for recurring transactions.

use std::sync::{Arc, Mutex};

use rusqlite::{Connection, Row};
use time::Date;

use crate::{
    Error,
    recurrence::{
        domain::{Recurrence, RecurrenceId, Repetition, RepetitionRule},
        store::RecurrenceStore,
    },
};

/// Keeps recurring transactions and their occurrences in a SQLite database.
#[derive(Debug, Clone)]
pub struct SQLiteRecurrenceStore {
    connection: Arc<Mutex<Connection>>,
}

impl SQLiteRecurrenceStore {
    /// Create a new recurrence store with a SQLite database.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }
}

impl RecurrenceStore for SQLiteRecurrenceStore {
    /// Create a recurring transaction in the database.
    ///
    /// # Errors
    /// This function will return an error if there is an SQL error.
    fn create(&self, description: &str, rule: RepetitionRule) -> Result<Recurrence, Error> {
        let connection = self.connection.lock().unwrap();
        connection.execute(
            "INSERT INTO recurrence (description, repetition_type, repetition_moment, repetition_interval, first_date, latest_date)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            (
                description,
                rule.repetition.kind(),
                rule.repetition.moment(),
                rule.interval,
                rule.first_date,
                rule.last_date,
            ),
        )?;

        let id = connection.last_insert_rowid();

        Ok(Recurrence {
            id,
            description: description.to_string(),
            rule,
        })
    }

    /// Retrieve a single recurring transaction by ID.
    ///
    /// # Errors
    /// Returns an [Error::InvalidRepetition] if the stored moment does not
    /// match the stored repetition type, and an SQL error otherwise.
    fn get(&self, id: RecurrenceId) -> Result<Recurrence, Error> {
        self.connection
            .lock()
            .unwrap()
            .prepare(
                "SELECT id, description, repetition_type, repetition_moment, repetition_interval, first_date, latest_date
                 FROM recurrence WHERE id = :id;",
            )?
            .query_row(&[(":id", &id)], map_row)
            .map_err(Error::from)
            .and_then(decode_row)
    }

    /// Retrieve all recurring transactions ordered by description.
    fn get_all(&self) -> Result<Vec<Recurrence>, Error> {
        self.connection
            .lock()
            .unwrap()
            .prepare(
                "SELECT id, description, repetition_type, repetition_moment, repetition_interval, first_date, latest_date
                 FROM recurrence ORDER BY description ASC;",
            )?
            .query_map([], map_row)?
            .map(|maybe_row| maybe_row.map_err(Error::from).and_then(decode_row))
            .collect()
    }

    /// Update a recurring transaction's description and rule.
    fn update(&self, recurrence: &Recurrence) -> Result<(), Error> {
        let rows_affected = self.connection.lock().unwrap().execute(
            "UPDATE recurrence
             SET description = ?1, repetition_type = ?2, repetition_moment = ?3, repetition_interval = ?4, first_date = ?5, latest_date = ?6
             WHERE id = ?7",
            (
                &recurrence.description,
                recurrence.rule.repetition.kind(),
                recurrence.rule.repetition.moment(),
                recurrence.rule.interval,
                recurrence.rule.first_date,
                recurrence.rule.last_date,
                recurrence.id,
            ),
        )?;

        if rows_affected == 0 {
            return Err(Error::UpdateMissingRecurrence);
        }

        Ok(())
    }

    /// Delete a recurring transaction and its recorded occurrences.
    fn delete(&self, id: RecurrenceId) -> Result<(), Error> {
        let mut connection = self.connection.lock().unwrap();
        let transaction = connection.transaction()?;

        transaction.execute(
            "DELETE FROM recurrence_occurrence WHERE recurrence_id = ?1",
            [id],
        )?;
        let rows_affected = transaction.execute("DELETE FROM recurrence WHERE id = ?1", [id])?;

        if rows_affected == 0 {
            return Err(Error::DeleteMissingRecurrence);
        }

        transaction.commit()?;

        Ok(())
    }

    /// Record generated occurrence dates, ignoring dates already recorded.
    fn record_occurrences(&self, id: RecurrenceId, dates: &[Date]) -> Result<(), Error> {
        let mut connection = self.connection.lock().unwrap();
        let transaction = connection.transaction()?;

        let exists: bool = transaction.query_row(
            "SELECT EXISTS (SELECT 1 FROM recurrence WHERE id = ?1);",
            [id],
            |row| row.get(0),
        )?;
        if !exists {
            return Err(Error::NotFound);
        }

        for date in dates {
            transaction.execute(
                "INSERT OR IGNORE INTO recurrence_occurrence (recurrence_id, date) VALUES (?1, ?2);",
                (id, date),
            )?;
        }

        transaction.commit()?;

        Ok(())
    }

    /// Retrieve all recorded occurrence dates in ascending order.
    fn occurrences(&self, id: RecurrenceId) -> Result<Vec<Date>, Error> {
        self.connection
            .lock()
            .unwrap()
            .prepare(
                "SELECT date FROM recurrence_occurrence WHERE recurrence_id = :id ORDER BY date ASC;",
            )?
            .query_map(&[(":id", &id)], |row| row.get(0))?
            .map(|maybe_date| maybe_date.map_err(Error::from))
            .collect()
    }
}

/// Initialize the recurrence tables and indexes.
pub fn create_recurrence_tables(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS recurrence (
            id INTEGER PRIMARY KEY,
            description TEXT NOT NULL,
            repetition_type TEXT NOT NULL,
            repetition_moment TEXT NOT NULL,
            repetition_interval INTEGER NOT NULL DEFAULT 1,
            first_date TEXT NOT NULL,
            latest_date TEXT
        );

        CREATE TABLE IF NOT EXISTS recurrence_occurrence (
            id INTEGER PRIMARY KEY,
            recurrence_id INTEGER NOT NULL REFERENCES recurrence (id) ON DELETE CASCADE,
            date TEXT NOT NULL,
            UNIQUE (recurrence_id, date)
        );

        CREATE INDEX IF NOT EXISTS idx_recurrence_occurrence_recurrence_id
            ON recurrence_occurrence (recurrence_id);",
    )?;

    Ok(())
}

/// A `recurrence` row with the repetition still in its stored string
/// encoding.
struct RecurrenceRow {
    id: RecurrenceId,
    description: String,
    repetition_type: String,
    repetition_moment: String,
    interval: u32,
    first_date: Date,
    latest_date: Option<Date>,
}

fn map_row(row: &Row) -> Result<RecurrenceRow, rusqlite::Error> {
    Ok(RecurrenceRow {
        id: row.get(0)?,
        description: row.get(1)?,
        repetition_type: row.get(2)?,
        repetition_moment: row.get(3)?,
        interval: row.get(4)?,
        first_date: row.get(5)?,
        latest_date: row.get(6)?,
    })
}

fn decode_row(row: RecurrenceRow) -> Result<Recurrence, Error> {
    let repetition = Repetition::from_moment(&row.repetition_type, &row.repetition_moment)?;

    Ok(Recurrence {
        id: row.id,
        description: row.description,
        rule: RepetitionRule {
            repetition,
            interval: row.interval,
            first_date: row.first_date,
            last_date: row.latest_date,
        },
    })
}

#[cfg(test)]
mod recurrence_store_tests {
    use std::sync::{Arc, Mutex};

    use rusqlite::Connection;
    use time::{Date, Month, Weekday};

    use crate::{
        Error,
        recurrence::{
            db::{SQLiteRecurrenceStore, create_recurrence_tables},
            domain::{Repetition, RepetitionRule},
            store::RecurrenceStore,
        },
    };

    fn get_test_store() -> (SQLiteRecurrenceStore, Arc<Mutex<Connection>>) {
        let connection = Connection::open_in_memory().unwrap();
        create_recurrence_tables(&connection).expect("Could not create recurrence tables");
        let connection = Arc::new(Mutex::new(connection));

        (SQLiteRecurrenceStore::new(connection.clone()), connection)
    }

    fn monthly_rent_rule() -> RepetitionRule {
        RepetitionRule {
            repetition: Repetition::Monthly { day: 1 },
            interval: 1,
            first_date: Date::from_calendar_date(2024, Month::January, 1).unwrap(),
            last_date: None,
        }
    }

    #[test]
    fn create_recurrence_succeeds() {
        let (store, _) = get_test_store();

        let recurrence = store.create("Rent", monthly_rent_rule());

        let recurrence = recurrence.expect("Could not create recurrence");
        assert!(recurrence.id > 0);
        assert_eq!(recurrence.description, "Rent");
        assert_eq!(recurrence.rule, monthly_rent_rule());
    }

    #[test]
    fn get_recurrence_round_trips_the_rule() {
        let (store, _) = get_test_store();
        let rule = RepetitionRule {
            repetition: Repetition::Weekly {
                weekdays: vec![Weekday::Monday, Weekday::Friday],
            },
            interval: 2,
            first_date: Date::from_calendar_date(2024, Month::January, 1).unwrap(),
            last_date: Some(Date::from_calendar_date(2025, Month::January, 1).unwrap()),
        };
        let created = store
            .create("Gym", rule.clone())
            .expect("Could not create recurrence");

        let selected = store.get(created.id);

        assert_eq!(selected, Ok(created));
        assert_eq!(selected.unwrap().rule, rule);
    }

    #[test]
    fn get_recurrence_with_invalid_id_returns_not_found() {
        let (store, _) = get_test_store();

        let selected = store.get(123);

        assert_eq!(selected, Err(Error::NotFound));
    }

    #[test]
    fn get_all_returns_recurrences_ordered_by_description() {
        let (store, _) = get_test_store();
        store
            .create("Rent", monthly_rent_rule())
            .expect("Could not create recurrence");
        store
            .create("Insurance", monthly_rent_rule())
            .expect("Could not create recurrence");

        let descriptions: Vec<String> = store
            .get_all()
            .expect("Could not get all recurrences")
            .into_iter()
            .map(|recurrence| recurrence.description)
            .collect();

        assert_eq!(descriptions, vec!["Insurance", "Rent"]);
    }

    #[test]
    fn get_recurrence_with_malformed_moment_returns_invalid_repetition() {
        let (store, connection) = get_test_store();
        connection
            .lock()
            .unwrap()
            .execute(
                "INSERT INTO recurrence (description, repetition_type, repetition_moment, repetition_interval, first_date)
                 VALUES ('Broken', 'weekly', '', 1, '2024-01-01');",
                (),
            )
            .expect("Could not insert malformed row");

        let selected = store.get(1);

        assert!(matches!(selected, Err(Error::InvalidRepetition(_))));
    }

    #[test]
    fn update_recurrence_succeeds() {
        let (store, _) = get_test_store();
        let mut recurrence = store
            .create("Rent", monthly_rent_rule())
            .expect("Could not create recurrence");

        recurrence.description = "Board".to_string();
        recurrence.rule.repetition = Repetition::Monthly { day: 15 };
        store
            .update(&recurrence)
            .expect("Could not update recurrence");

        let selected = store.get(recurrence.id).expect("Could not get recurrence");
        assert_eq!(selected, recurrence);
    }

    #[test]
    fn update_missing_recurrence_returns_an_error() {
        let (store, _) = get_test_store();
        let mut recurrence = store
            .create("Rent", monthly_rent_rule())
            .expect("Could not create recurrence");
        recurrence.id += 123;

        let result = store.update(&recurrence);

        assert_eq!(result, Err(Error::UpdateMissingRecurrence));
    }

    #[test]
    fn delete_recurrence_removes_it_and_its_occurrences() {
        let (store, _) = get_test_store();
        let recurrence = store
            .create("Rent", monthly_rent_rule())
            .expect("Could not create recurrence");
        store
            .record_occurrences(
                recurrence.id,
                &[Date::from_calendar_date(2024, Month::January, 1).unwrap()],
            )
            .expect("Could not record occurrences");

        store
            .delete(recurrence.id)
            .expect("Could not delete recurrence");

        assert_eq!(store.get(recurrence.id), Err(Error::NotFound));
        assert_eq!(store.occurrences(recurrence.id), Ok(Vec::new()));
    }

    #[test]
    fn delete_missing_recurrence_returns_an_error() {
        let (store, _) = get_test_store();

        let result = store.delete(999999);

        assert_eq!(result, Err(Error::DeleteMissingRecurrence));
    }

    #[test]
    fn record_occurrences_ignores_duplicate_dates() {
        let (store, _) = get_test_store();
        let recurrence = store
            .create("Rent", monthly_rent_rule())
            .expect("Could not create recurrence");
        let dates = [
            Date::from_calendar_date(2024, Month::January, 1).unwrap(),
            Date::from_calendar_date(2024, Month::February, 1).unwrap(),
        ];

        store
            .record_occurrences(recurrence.id, &dates)
            .expect("Could not record occurrences");
        store
            .record_occurrences(recurrence.id, &dates)
            .expect("Could not record occurrences twice");

        assert_eq!(store.occurrences(recurrence.id), Ok(dates.to_vec()));
    }

    #[test]
    fn record_occurrences_for_missing_recurrence_returns_not_found() {
        let (store, _) = get_test_store();

        let result = store.record_occurrences(
            42,
            &[Date::from_calendar_date(2024, Month::January, 1).unwrap()],
        );

        assert_eq!(result, Err(Error::NotFound));
    }

    #[test]
    fn occurrences_are_returned_in_ascending_order() {
        let (store, _) = get_test_store();
        let recurrence = store
            .create("Rent", monthly_rent_rule())
            .expect("Could not create recurrence");
        let january = Date::from_calendar_date(2024, Month::January, 1).unwrap();
        let march = Date::from_calendar_date(2024, Month::March, 1).unwrap();
        let february = Date::from_calendar_date(2024, Month::February, 1).unwrap();

        store
            .record_occurrences(recurrence.id, &[march, january, february])
            .expect("Could not record occurrences");

        assert_eq!(
            store.occurrences(recurrence.id),
            Ok(vec![january, february, march])
        );
    }
}
