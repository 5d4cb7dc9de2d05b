//! Recurring transaction schedules: repetition rules, occurrence generation,
//! and the store that keeps them.

mod calendar;
mod db;
mod describe;
mod domain;
mod engine;
mod store;

pub use db::{SQLiteRecurrenceStore, create_recurrence_tables};
pub use describe::repetition_description;
pub use domain::{Recurrence, RecurrenceId, Repetition, RepetitionRule, parse_iso_date};
pub use engine::{next_occurrences, occurrences_in_range};
pub use store::RecurrenceStore;
