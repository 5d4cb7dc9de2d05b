//! Core domain types for recurring transactions.

use time::{Date, Month, Weekday};

use crate::{
    Error,
    recurrence::calendar::{max_day_of_month, month_from_number, month_number, weekday_from_number},
};

/// Database identifier for a recurring transaction.
pub type RecurrenceId = i64;

/// Which calendar dates a repetition rule fires on.
///
/// One case per repetition type, each carrying only the fields that type
/// needs. Databases and other untyped boundaries exchange this as a
/// `(repetition_type, repetition_moment)` string pair, see
/// [Repetition::from_moment].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Repetition {
    /// Fires every day.
    Daily,
    /// Fires on each of the given weekdays every week.
    Weekly {
        /// The weekdays the repetition fires on. Must not be empty.
        weekdays: Vec<Weekday>,
    },
    /// Fires on a fixed day of the month. Months that are too short for
    /// `day` are skipped, they never fire on an adjacent date instead.
    Monthly {
        /// The day of the month, between 1 and 31.
        day: u8,
    },
    /// Fires on the nth weekday of the month, e.g. the 2nd Tuesday. Months
    /// without an nth occurrence of the weekday are skipped.
    NthWeekday {
        /// Which occurrence of the weekday within the month, between 1 and 5.
        week: u8,
        /// The weekday the repetition fires on.
        weekday: Weekday,
    },
    /// Fires on a fixed month and day every year. February 29 is skipped in
    /// non-leap years.
    Yearly {
        /// The month the repetition fires in.
        month: Month,
        /// The day of the month, between 1 and the month's longest length.
        day: u8,
    },
}

impl Repetition {
    /// The value stored in the `repetition_type` column.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly { .. } => "weekly",
            Self::Monthly { .. } => "monthly",
            Self::NthWeekday { .. } => "ndom",
            Self::Yearly { .. } => "yearly",
        }
    }

    /// The value stored in the `repetition_moment` column.
    ///
    /// Inverse of [Repetition::from_moment].
    pub fn moment(&self) -> String {
        match self {
            Self::Daily => String::new(),
            Self::Weekly { weekdays } => weekdays
                .iter()
                .map(|weekday| weekday.number_from_monday().to_string())
                .collect::<Vec<_>>()
                .join(","),
            Self::Monthly { day } => day.to_string(),
            Self::NthWeekday { week, weekday } => {
                format!("{week},{}", weekday.number_from_monday())
            }
            // The year is ignored on decode. 2020 is a leap year so that a
            // February 29 moment stays encodable as a real date.
            Self::Yearly { month, day } => {
                format!("2020-{:02}-{:02}", month_number(*month), day)
            }
        }
    }

    /// Decode a repetition from its stored `(repetition_type,
    /// repetition_moment)` string pair.
    ///
    /// The moment formats are: empty for `daily`, comma-separated ISO weekday
    /// numbers (Monday = 1) for `weekly`, a day number for `monthly`,
    /// `"week,weekday"` for `ndom`, and a `YYYY-MM-DD` date whose year is
    /// ignored for `yearly`.
    ///
    /// # Errors
    /// Returns an [Error::InvalidRepetition] if the moment does not match the
    /// repetition type's format or contains out-of-range values.
    pub fn from_moment(kind: &str, moment: &str) -> Result<Self, Error> {
        match kind {
            "daily" => Ok(Self::Daily),
            "weekly" => {
                if moment.is_empty() {
                    return Err(Error::InvalidRepetition(
                        "a weekly repetition must name at least one weekday".to_string(),
                    ));
                }

                let weekdays = moment
                    .split(',')
                    .map(|part| {
                        part.trim()
                            .parse::<u8>()
                            .ok()
                            .and_then(weekday_from_number)
                            .ok_or_else(|| {
                                Error::InvalidRepetition(format!(
                                    "\"{part}\" is not a weekday number between 1 (Monday) and 7 (Sunday)"
                                ))
                            })
                    })
                    .collect::<Result<Vec<_>, _>>()?;

                Ok(Self::Weekly { weekdays })
            }
            "monthly" => {
                let day = moment.parse::<u8>().ok().filter(|day| (1..=31).contains(day));

                match day {
                    Some(day) => Ok(Self::Monthly { day }),
                    None => Err(Error::InvalidRepetition(format!(
                        "\"{moment}\" is not a day of the month between 1 and 31"
                    ))),
                }
            }
            "ndom" => {
                let error = || {
                    Error::InvalidRepetition(format!(
                        "\"{moment}\" is not a \"week,weekday\" pair such as \"2,2\" (2nd Tuesday)"
                    ))
                };

                let (week, weekday) = moment.split_once(',').ok_or_else(error)?;
                let week = week
                    .trim()
                    .parse::<u8>()
                    .ok()
                    .filter(|week| (1..=5).contains(week))
                    .ok_or_else(error)?;
                let weekday = weekday
                    .trim()
                    .parse::<u8>()
                    .ok()
                    .and_then(weekday_from_number)
                    .ok_or_else(error)?;

                Ok(Self::NthWeekday { week, weekday })
            }
            "yearly" => {
                let error = || {
                    Error::InvalidRepetition(format!(
                        "\"{moment}\" is not a yearly moment such as \"2024-03-01\""
                    ))
                };

                let mut parts = moment.splitn(3, '-');
                let (Some(year), Some(month), Some(day)) =
                    (parts.next(), parts.next(), parts.next())
                else {
                    return Err(error());
                };

                // The year only anchors the encoding as a real date.
                year.parse::<i32>().map_err(|_| error())?;
                let month = month
                    .parse::<u8>()
                    .ok()
                    .filter(|month| (1..=12).contains(month))
                    .map(month_from_number)
                    .ok_or_else(error)?;
                let day = day
                    .parse::<u8>()
                    .ok()
                    .filter(|day| *day >= 1 && *day <= max_day_of_month(month))
                    .ok_or_else(error)?;

                Ok(Self::Yearly { month, day })
            }
            kind => Err(Error::InvalidRepetition(format!(
                "\"{kind}\" is not a repetition type"
            ))),
        }
    }
}

/// How often and from when a recurring transaction repeats.
///
/// Immutable value type, read-only input to the occurrence engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepetitionRule {
    /// Which calendar dates the rule fires on.
    pub repetition: Repetition,

    /// Fire every `interval`-th period rather than every period, e.g. 2 for
    /// "every 2 weeks". Must be at least 1.
    pub interval: u32,

    /// The anchor date that periodic offsets are computed from. Occurrences
    /// never fall before it.
    pub first_date: Date,

    /// The last date the rule is active, if it ever ends. Occurrences never
    /// fall after it.
    pub last_date: Option<Date>,
}

/// A recurring transaction: a user-facing description plus the rule that
/// schedules it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recurrence {
    /// The database ID of the recurring transaction.
    pub id: RecurrenceId,

    /// The user-facing name, e.g. "Rent" or "Power bill".
    pub description: String,

    /// The schedule the transaction repeats on.
    pub rule: RepetitionRule,
}

/// Parse a calendar date in `YYYY-MM-DD` form.
///
/// # Errors
/// Returns an [Error::InvalidDateFormat] if `value` is not a valid calendar
/// date.
pub fn parse_iso_date(value: &str) -> Result<Date, Error> {
    let error = || Error::InvalidDateFormat(value.to_string());

    let mut parts = value.splitn(3, '-');
    let (Some(year), Some(month), Some(day)) = (parts.next(), parts.next(), parts.next()) else {
        return Err(error());
    };

    let year = year.parse::<i32>().map_err(|_| error())?;
    let month = month
        .parse::<u8>()
        .ok()
        .filter(|month| (1..=12).contains(month))
        .map(month_from_number)
        .ok_or_else(error)?;
    let day = day.parse::<u8>().map_err(|_| error())?;

    Date::from_calendar_date(year, month, day).map_err(|_| error())
}


#[cfg(test)]
mod parse_iso_date_tests {
    use time::{Date, Month};

    use crate::{Error, recurrence::domain::parse_iso_date};

    #[test]
    fn parses_a_calendar_date() {
        let date = parse_iso_date("2024-02-29");

        assert_eq!(
            date,
            Ok(Date::from_calendar_date(2024, Month::February, 29).unwrap())
        );
    }

    #[test]
    fn rejects_an_impossible_date() {
        let date = parse_iso_date("2023-02-29");

        assert_eq!(date, Err(Error::InvalidDateFormat("2023-02-29".to_string())));
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_iso_date("next tuesday").is_err());
        assert!(parse_iso_date("2024-13-01").is_err());
        assert!(parse_iso_date("2024-01").is_err());
    }
}
