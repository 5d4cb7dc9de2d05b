//! Human-readable descriptions of repetition rules.

use time::Weekday;

use crate::recurrence::domain::{Repetition, RepetitionRule};

/// Describe a repetition rule for display, e.g. "every 2 weeks on Monday".
///
/// Pure and deterministic. A malformed rule is described as far as possible
/// rather than reported, so a weekly rule with no weekdays reads as just
/// "every week".
pub fn repetition_description(rule: &RepetitionRule) -> String {
    match &rule.repetition {
        Repetition::Daily => every(rule.interval, "day", "days"),
        Repetition::Weekly { weekdays } => {
            let every = every(rule.interval, "week", "weeks");

            match weekday_list(weekdays) {
                Some(list) => format!("{every} on {list}"),
                None => every,
            }
        }
        Repetition::Monthly { day } => {
            format!("{} on the {}", every(rule.interval, "month", "months"), ordinal(*day))
        }
        Repetition::NthWeekday { week, weekday } => format!(
            "{} on the {} {weekday}",
            every(rule.interval, "month", "months"),
            ordinal(*week)
        ),
        Repetition::Yearly { month, day } => {
            format!("{} on {day} {month}", every(rule.interval, "year", "years"))
        }
    }
}

fn every(interval: u32, singular: &str, plural: &str) -> String {
    if interval <= 1 {
        format!("every {singular}")
    } else {
        format!("every {interval} {plural}")
    }
}

fn ordinal(number: u8) -> String {
    let suffix = match number {
        11..=13 => "th",
        number if number % 10 == 1 => "st",
        number if number % 10 == 2 => "nd",
        number if number % 10 == 3 => "rd",
        _ => "th",
    };

    format!("{number}{suffix}")
}

/// The weekdays in Monday-first order as "Monday", "Monday and Friday", or
/// "Monday, Wednesday and Friday". `None` for an empty set.
fn weekday_list(weekdays: &[Weekday]) -> Option<String> {
    let mut weekdays = weekdays.to_vec();
    weekdays.sort_by_key(|weekday| weekday.number_from_monday());
    weekdays.dedup();

    let names: Vec<String> = weekdays.iter().map(|weekday| weekday.to_string()).collect();

    match names.as_slice() {
        [] => None,
        [name] => Some(name.clone()),
        [rest @ .., last] => Some(format!("{} and {last}", rest.join(", "))),
    }
}
