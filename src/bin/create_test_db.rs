//! Creates a database pre-populated with sample recurring transactions.

use std::{
    error::Error,
    path::Path,
    process::exit,
    sync::{Arc, Mutex},
};

use clap::Parser;
use rusqlite::Connection;
use time::{Date, Month, Weekday};

use echeancier::{
    RecurrenceStore, Repetition, RepetitionRule, SQLiteRecurrenceStore, initialize_db,
};

/// A utility for creating a test database for echeancier.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        None => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        _ => {}
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let connection = Connection::open(output_path)?;

    initialize_db(&connection)?;

    println!("Creating sample recurring transactions...");
    let store = SQLiteRecurrenceStore::new(Arc::new(Mutex::new(connection)));

    let anchor = Date::from_calendar_date(2024, Month::January, 1)?;

    store.create(
        "Rent",
        RepetitionRule {
            repetition: Repetition::Monthly { day: 1 },
            interval: 1,
            first_date: anchor,
            last_date: None,
        },
    )?;
    store.create(
        "Salary",
        RepetitionRule {
            repetition: Repetition::Monthly { day: 25 },
            interval: 1,
            first_date: anchor,
            last_date: None,
        },
    )?;
    store.create(
        "Gym membership",
        RepetitionRule {
            repetition: Repetition::Weekly {
                weekdays: vec![Weekday::Monday],
            },
            interval: 2,
            first_date: anchor,
            last_date: None,
        },
    )?;
    store.create(
        "Book club",
        RepetitionRule {
            repetition: Repetition::NthWeekday {
                week: 2,
                weekday: Weekday::Tuesday,
            },
            interval: 1,
            first_date: anchor,
            last_date: None,
        },
    )?;
    store.create(
        "Car insurance",
        RepetitionRule {
            repetition: Repetition::Yearly {
                month: Month::July,
                day: 1,
            },
            interval: 1,
            first_date: anchor,
            last_date: Some(Date::from_calendar_date(2030, Month::December, 31)?),
        },
    )?;

    println!("Success!");

    Ok(())
}
