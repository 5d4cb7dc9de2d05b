//! Database initialization for the application.

use rusqlite::Connection;

use crate::{Error, recurrence::create_recurrence_tables};

/// Create the tables for the domain models.
///
/// Safe to call on a database that has already been initialized.
///
/// # Errors
/// Returns an error if there is an SQL error.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    create_recurrence_tables(connection)?;

    Ok(())
}
