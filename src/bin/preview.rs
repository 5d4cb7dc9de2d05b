//! Lists each recurring transaction with its upcoming occurrence dates.

use std::{
    path::Path,
    process::exit,
    sync::{Arc, Mutex},
};

use clap::Parser;
use rusqlite::Connection;
use serde::Serialize;
use time::{Date, OffsetDateTime};
use tracing_subscriber::{Layer, filter, layer::SubscriberExt, util::SubscriberInitExt};

use echeancier::{
    Recurrence, RecurrenceStore, SQLiteRecurrenceStore, next_occurrences, occurrences_in_range,
    parse_iso_date, repetition_description,
};

/// Shows the dates recurring transactions will fall due on.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    #[arg(long)]
    db_path: String,

    /// How many upcoming occurrences to list per recurring transaction.
    #[arg(long, short, default_value_t = 5)]
    count: usize,

    /// The date (YYYY-MM-DD) to project occurrences from. Defaults to today.
    #[arg(long)]
    from: Option<String>,

    /// If set, lists every occurrence up to and including this date
    /// (YYYY-MM-DD) instead of the next `count`.
    #[arg(long)]
    until: Option<String>,

    /// Print the schedule as JSON instead of plain text.
    #[arg(long)]
    json: bool,

    /// Record the listed occurrence dates in the database.
    #[arg(long)]
    record: bool,
}

#[derive(Serialize)]
struct SchedulePreview {
    description: String,
    repetition: String,
    occurrences: Vec<String>,
}

fn main() {
    setup_logging();

    let args = Args::parse();

    let db_path = Path::new(&args.db_path);
    if !db_path.is_file() {
        eprintln!("File does not exist at {db_path:#?}!");
        exit(1);
    }

    let from = match &args.from {
        Some(text) => parse_date_arg(text),
        None => today(),
    };
    let until = args.until.as_deref().map(parse_date_arg);

    let connection = match Connection::open(db_path) {
        Ok(connection) => connection,
        Err(error) => {
            eprintln!("Could not open the database at {db_path:?}: {error}");
            exit(1);
        }
    };
    let store = SQLiteRecurrenceStore::new(Arc::new(Mutex::new(connection)));

    let recurrences = match store.get_all() {
        Ok(recurrences) => recurrences,
        Err(error) => {
            eprintln!("Could not load recurring transactions: {error}");
            exit(1);
        }
    };

    let mut previews = Vec::new();

    for recurrence in recurrences {
        let occurrences = match until {
            Some(until) => occurrences_in_range(&recurrence.rule, from, until),
            None => next_occurrences(&recurrence.rule, from, args.count),
        };

        let dates = match occurrences {
            Ok(dates) => dates,
            Err(error) => {
                tracing::warn!("skipping \"{}\": {error}", recurrence.description);
                continue;
            }
        };

        if args.record {
            if let Err(error) = store.record_occurrences(recurrence.id, &dates) {
                eprintln!(
                    "Could not record occurrences for \"{}\": {error}",
                    recurrence.description
                );
                exit(1);
            }
        }

        previews.push(to_preview(&recurrence, dates));
    }

    if args.json {
        match serde_json::to_string_pretty(&previews) {
            Ok(json) => println!("{json}"),
            Err(error) => {
                eprintln!("Could not serialize the schedule as JSON: {error}");
                exit(1);
            }
        }
    } else {
        print_previews(&previews);
    }
}

fn to_preview(recurrence: &Recurrence, dates: Vec<Date>) -> SchedulePreview {
    SchedulePreview {
        description: recurrence.description.clone(),
        repetition: repetition_description(&recurrence.rule),
        occurrences: dates.iter().map(|date| date.to_string()).collect(),
    }
}

fn print_previews(previews: &[SchedulePreview]) {
    for preview in previews {
        println!("{} ({})", preview.description, preview.repetition);

        if preview.occurrences.is_empty() {
            println!("  no upcoming occurrences");
        }
        for occurrence in &preview.occurrences {
            println!("  {occurrence}");
        }

        println!();
    }
}

fn parse_date_arg(text: &str) -> Date {
    match parse_iso_date(text) {
        Ok(date) => date,
        Err(error) => {
            eprintln!("{error}");
            exit(1);
        }
    }
}

fn today() -> Date {
    OffsetDateTime::now_local()
        .unwrap_or_else(|_| OffsetDateTime::now_utc())
        .date()
}

fn setup_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .pretty()
                .with_filter(filter::LevelFilter::INFO),
        )
        .init();
}
