//! Defines the recurrence store trait.

use time::Date;

use crate::{
    Error,
    recurrence::domain::{Recurrence, RecurrenceId, RepetitionRule},
};

/// Keeps recurring transactions and the occurrence dates generated from them.
///
/// The occurrence engine itself is a set of pure functions over
/// [RepetitionRule] values, so this trait only covers loading rules and
/// persisting the dates a caller chose to materialize.
pub trait RecurrenceStore {
    /// Create a new recurring transaction and add it to the store.
    fn create(&self, description: &str, rule: RepetitionRule) -> Result<Recurrence, Error>;

    /// Get a recurring transaction by its ID.
    fn get(&self, id: RecurrenceId) -> Result<Recurrence, Error>;

    /// Get all recurring transactions, ordered by description.
    fn get_all(&self) -> Result<Vec<Recurrence>, Error>;

    /// Overwrite a recurring transaction's description and rule.
    fn update(&self, recurrence: &Recurrence) -> Result<(), Error>;

    /// Delete a recurring transaction and its recorded occurrences.
    fn delete(&self, id: RecurrenceId) -> Result<(), Error>;

    /// Record generated occurrence dates for a recurring transaction.
    ///
    /// Recording a date that is already recorded is a no-op, so callers may
    /// re-run generation over overlapping ranges.
    fn record_occurrences(&self, id: RecurrenceId, dates: &[Date]) -> Result<(), Error>;

    /// All recorded occurrence dates for a recurring transaction, in
    /// ascending order.
    fn occurrences(&self, id: RecurrenceId) -> Result<Vec<Date>, Error>;
}
