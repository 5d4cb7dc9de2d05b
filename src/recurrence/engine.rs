//! Occurrence generation for repetition rules.
//!
//! Both entry points are pure functions over an immutable [RepetitionRule]:
//! they share no state, perform no I/O, and are safe to call concurrently.
//! Occurrences are strictly increasing, duplicate-free, and always satisfy
//! the rule's periodicity from its anchor date. Periods in which the rule's
//! target date does not exist (February for a day-31 rule, non-leap years for
//! February 29) contribute no occurrence at all, they never fire on an
//! adjacent date instead.

use time::{Date, Duration, Month};

use crate::{
    Error,
    recurrence::{
        calendar::{
            max_day_of_month, monday_of, month_from_number, month_number, nth_weekday_of_month,
        },
        domain::{Repetition, RepetitionRule},
    },
};

/// How many consecutive empty periods [next_occurrences] searches before
/// giving up on a rule whose target date may never exist again, e.g. a
/// February 29 rule whose interval only ever lands on century non-leap years.
const MAX_EMPTY_PERIODS: u32 = 1000;

/// Every occurrence date `d` of `rule` with `start <= d <= end`, in ascending
/// order.
///
/// A range before the rule's earliest possible occurrence yields an empty
/// vector, not an error.
///
/// # Errors
/// Returns an [Error::EndBeforeStart] if `end < start` and an
/// [Error::InvalidRepetition] if the rule is malformed, e.g. a weekly rule
/// with no weekdays or a day-of-month outside 1-31.
pub fn occurrences_in_range(
    rule: &RepetitionRule,
    start: Date,
    end: Date,
) -> Result<Vec<Date>, Error> {
    if end < start {
        return Err(Error::EndBeforeStart { start, end });
    }

    validate(rule)?;

    let end = match rule.last_date {
        Some(last_date) => end.min(last_date),
        None => end,
    };
    let lower = start.max(rule.first_date);

    if end < lower {
        return Ok(Vec::new());
    }

    let mut occurrences = Vec::new();

    for k in first_period_at_or_before(rule, lower).. {
        let Some(period) = period(rule, k) else {
            break;
        };

        if period.start > end {
            break;
        }

        for date in period.dates {
            if date >= lower && date <= end {
                occurrences.push(date);
            }
        }
    }

    Ok(occurrences)
}

/// The first `count` occurrence dates of `rule` on or after `from`, in
/// ascending order.
///
/// Returns fewer than `count` dates when the rule's active range ends, or
/// when its target date stops existing, before `count` occurrences are
/// reached. `count == 0` returns an empty vector without touching the rule.
///
/// # Errors
/// Returns an [Error::InvalidRepetition] if the rule is malformed.
pub fn next_occurrences(
    rule: &RepetitionRule,
    from: Date,
    count: usize,
) -> Result<Vec<Date>, Error> {
    if count == 0 {
        return Ok(Vec::new());
    }

    validate(rule)?;

    let lower = from.max(rule.first_date);
    let mut occurrences = Vec::with_capacity(count);
    let mut empty_periods = 0;

    for k in first_period_at_or_before(rule, lower).. {
        let Some(period) = period(rule, k) else {
            break;
        };

        if let Some(last_date) = rule.last_date {
            if period.start > last_date {
                break;
            }
        }

        if period.dates.is_empty() {
            empty_periods += 1;
            if empty_periods >= MAX_EMPTY_PERIODS {
                break;
            }
            continue;
        }

        empty_periods = 0;

        for date in period.dates {
            if date < lower {
                continue;
            }
            if rule.last_date.is_some_and(|last_date| date > last_date) {
                continue;
            }

            occurrences.push(date);
            if occurrences.len() == count {
                return Ok(occurrences);
            }
        }
    }

    Ok(occurrences)
}

fn validate(rule: &RepetitionRule) -> Result<(), Error> {
    if rule.interval == 0 {
        return Err(Error::InvalidRepetition(
            "the interval must be at least 1".to_string(),
        ));
    }

    match &rule.repetition {
        Repetition::Daily => Ok(()),
        Repetition::Weekly { weekdays } => {
            if weekdays.is_empty() {
                Err(Error::InvalidRepetition(
                    "a weekly repetition must name at least one weekday".to_string(),
                ))
            } else {
                Ok(())
            }
        }
        Repetition::Monthly { day } => {
            if (1..=31).contains(day) {
                Ok(())
            } else {
                Err(Error::InvalidRepetition(format!(
                    "{day} is not a day of the month between 1 and 31"
                )))
            }
        }
        Repetition::NthWeekday { week, .. } => {
            if (1..=5).contains(week) {
                Ok(())
            } else {
                Err(Error::InvalidRepetition(format!(
                    "week number {week} is outside the range 1-5"
                )))
            }
        }
        Repetition::Yearly { month, day } => {
            if *day >= 1 && *day <= max_day_of_month(*month) {
                Ok(())
            } else {
                Err(Error::InvalidRepetition(format!(
                    "{month} does not have a day {day}"
                )))
            }
        }
    }
}

/// One repetition period: its first calendar day and the candidate occurrence
/// dates that exist within it, in ascending order and unfiltered by the
/// rule's active range.
struct Period {
    start: Date,
    dates: Vec<Date>,
}

/// The `k`-th period of `rule` counted from its anchor date, or `None` once
/// the supported calendar range is exhausted.
fn period(rule: &RepetitionRule, k: u64) -> Option<Period> {
    let step = k as i64 * rule.interval as i64;

    match &rule.repetition {
        Repetition::Daily => {
            let date = rule.first_date.checked_add(Duration::days(step))?;

            Some(Period {
                start: date,
                dates: vec![date],
            })
        }
        Repetition::Weekly { weekdays } => {
            let start = monday_of(rule.first_date).checked_add(Duration::days(7 * step))?;

            let mut weekday_numbers: Vec<u8> = weekdays
                .iter()
                .map(|weekday| weekday.number_from_monday())
                .collect();
            weekday_numbers.sort_unstable();
            weekday_numbers.dedup();

            let dates = weekday_numbers
                .iter()
                .filter_map(|weekday_number| {
                    start.checked_add(Duration::days(*weekday_number as i64 - 1))
                })
                .collect();

            Some(Period { start, dates })
        }
        Repetition::Monthly { day } => {
            let (year, month) = add_months(rule.first_date.year(), rule.first_date.month(), step)?;
            let start = Date::from_calendar_date(year, month, 1).ok()?;
            // from_calendar_date rejects days the month does not have, which
            // is exactly the skip policy.
            let dates = Date::from_calendar_date(year, month, *day)
                .ok()
                .into_iter()
                .collect();

            Some(Period { start, dates })
        }
        Repetition::NthWeekday { week, weekday } => {
            let (year, month) = add_months(rule.first_date.year(), rule.first_date.month(), step)?;
            let start = Date::from_calendar_date(year, month, 1).ok()?;
            let dates = nth_weekday_of_month(year, month, *week, *weekday)
                .into_iter()
                .collect();

            Some(Period { start, dates })
        }
        Repetition::Yearly { month, day } => {
            let year = i32::try_from(rule.first_date.year() as i64 + step).ok()?;
            let start = Date::from_calendar_date(year, Month::January, 1).ok()?;
            let dates = Date::from_calendar_date(year, *month, *day)
                .ok()
                .into_iter()
                .collect();

            Some(Period { start, dates })
        }
    }
}

/// The index of the latest period that starts on or before `target`, so that
/// generation does not have to walk every period since the anchor date.
fn first_period_at_or_before(rule: &RepetitionRule, target: Date) -> u64 {
    let interval = rule.interval as i64;

    let periods_elapsed = match &rule.repetition {
        Repetition::Daily => (target - rule.first_date).whole_days(),
        Repetition::Weekly { .. } => {
            (monday_of(target) - monday_of(rule.first_date)).whole_days() / 7
        }
        Repetition::Monthly { .. } | Repetition::NthWeekday { .. } => {
            months_between(rule.first_date, target)
        }
        Repetition::Yearly { .. } => target.year() as i64 - rule.first_date.year() as i64,
    };

    (periods_elapsed.max(0) / interval) as u64
}

fn months_between(from: Date, to: Date) -> i64 {
    (to.year() as i64 - from.year() as i64) * 12 + month_number(to.month()) as i64
        - month_number(from.month()) as i64
}

fn add_months(year: i32, month: Month, months: i64) -> Option<(i32, Month)> {
    let zero_based = month_number(month) as i64 - 1 + months;
    let year = i32::try_from(year as i64 + zero_based.div_euclid(12)).ok()?;
    let month = month_from_number((zero_based.rem_euclid(12) + 1) as u8);

    Some((year, month))
}
