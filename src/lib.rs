//! Echeancier is the recurring-transaction schedule engine for a personal
//! finance app.
//!
//! A [RepetitionRule] describes how often a recurring transaction fires: every
//! day, on chosen weekdays, on a day of the month, on the nth weekday of the
//! month, or on a month/day each year. The engine turns a rule plus a date
//! range or a count into the concrete calendar dates on which the transaction
//! falls due, and a SQLite-backed store keeps the rules and the occurrence
//! dates generated from them.

#![warn(missing_docs)]

use time::Date;

mod db;
mod recurrence;

pub use db::initialize as initialize_db;
pub use recurrence::{
    Recurrence, RecurrenceId, RecurrenceStore, Repetition, RepetitionRule, SQLiteRecurrenceStore,
    create_recurrence_tables, next_occurrences, occurrences_in_range, parse_iso_date,
    repetition_description,
};

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The repetition rule is inconsistent with its repetition type, e.g. a
    /// weekly rule with no weekdays, a day-of-month outside 1-31, or a
    /// month/day combination that can never exist.
    ///
    /// The engine reports this when the rule is used rather than when it is
    /// built, and it never guesses intent: an out-of-range day-of-month is an
    /// error, not something to clamp to the end of the month.
    #[error("invalid repetition rule: {0}")]
    InvalidRepetition(String),

    /// A range query was given an end date before its start date.
    ///
    /// This signals caller misuse, so it is an error rather than an empty
    /// result.
    #[error("the end date {end} is before the start date {start}")]
    EndBeforeStart {
        /// The start of the requested range.
        start: Date,
        /// The end of the requested range.
        end: Date,
    },

    /// A string could not be parsed as a calendar date.
    #[error("could not parse \"{0}\" as a calendar date (expected YYYY-MM-DD)")]
    InvalidDateFormat(String),

    /// The requested resource could not be found.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// Tried to update a recurring transaction that does not exist.
    #[error("tried to update a recurring transaction that is not in the database")]
    UpdateMissingRecurrence,

    /// Tried to delete a recurring transaction that does not exist.
    #[error("tried to delete a recurring transaction that is not in the database")]
    DeleteMissingRecurrence,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}
