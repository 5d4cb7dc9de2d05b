//! Calendar arithmetic shared by the occurrence engine and the domain types.

use time::{Date, Duration, Month, Weekday};

/// The Monday of the week containing `date`.
pub(crate) fn monday_of(date: Date) -> Date {
    let weekday_number = date.weekday().number_from_monday() as i64;

    date - Duration::days(weekday_number - 1)
}

pub(crate) fn last_day_of_month(year: i32, month: Month) -> u8 {
    match month {
        Month::January
        | Month::March
        | Month::May
        | Month::July
        | Month::August
        | Month::October
        | Month::December => 31,
        Month::April | Month::June | Month::September | Month::November => 30,
        Month::February => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
    }
}

/// The largest day number `month` can have in any year, so 29 for February.
pub(crate) fn max_day_of_month(month: Month) -> u8 {
    match month {
        Month::February => 29,
        month => last_day_of_month(1, month),
    }
}

pub(crate) fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || (year % 400 == 0)
}

pub(crate) fn month_number(month: Month) -> u8 {
    match month {
        Month::January => 1,
        Month::February => 2,
        Month::March => 3,
        Month::April => 4,
        Month::May => 5,
        Month::June => 6,
        Month::July => 7,
        Month::August => 8,
        Month::September => 9,
        Month::October => 10,
        Month::November => 11,
        Month::December => 12,
    }
}

/// Callers must pass a number between 1 and 12.
pub(crate) fn month_from_number(month: u8) -> Month {
    match month {
        1 => Month::January,
        2 => Month::February,
        3 => Month::March,
        4 => Month::April,
        5 => Month::May,
        6 => Month::June,
        7 => Month::July,
        8 => Month::August,
        9 => Month::September,
        10 => Month::October,
        11 => Month::November,
        12 => Month::December,
        _ => panic!("invalid month number {month}"),
    }
}

/// Map an ISO weekday number (Monday = 1) to a weekday.
pub(crate) fn weekday_from_number(weekday_number: u8) -> Option<Weekday> {
    match weekday_number {
        1 => Some(Weekday::Monday),
        2 => Some(Weekday::Tuesday),
        3 => Some(Weekday::Wednesday),
        4 => Some(Weekday::Thursday),
        5 => Some(Weekday::Friday),
        6 => Some(Weekday::Saturday),
        7 => Some(Weekday::Sunday),
        _ => None,
    }
}

/// The date of the nth `weekday` within the given month, or `None` when the
/// month has no nth occurrence of that weekday (e.g. a 5th Monday in a
/// four-Monday month).
pub(crate) fn nth_weekday_of_month(
    year: i32,
    month: Month,
    week: u8,
    weekday: Weekday,
) -> Option<Date> {
    let first = Date::from_calendar_date(year, month, 1).ok()?;
    let offset =
        (weekday.number_from_monday() + 7 - first.weekday().number_from_monday()) % 7;
    let day = 1 + offset + 7 * (week - 1);

    if day > last_day_of_month(year, month) {
        return None;
    }

    Date::from_calendar_date(year, month, day).ok()
}

#[cfg(test)]
mod calendar_tests {
    use time::{Date, Month, Weekday};

    use super::{last_day_of_month, monday_of, nth_weekday_of_month};

    #[test]
    fn monday_of_returns_start_of_week() {
        // 2024-01-04 is a Thursday.
        let date = Date::from_calendar_date(2024, Month::January, 4).unwrap();

        let monday = monday_of(date);

        assert_eq!(
            monday,
            Date::from_calendar_date(2024, Month::January, 1).unwrap()
        );
        assert_eq!(monday.weekday(), Weekday::Monday);
    }

    #[test]
    fn monday_of_is_identity_on_mondays() {
        let date = Date::from_calendar_date(2024, Month::January, 8).unwrap();

        assert_eq!(monday_of(date), date);
    }

    #[test]
    fn february_length_depends_on_leap_year() {
        assert_eq!(last_day_of_month(2024, Month::February), 29);
        assert_eq!(last_day_of_month(2025, Month::February), 28);
        assert_eq!(last_day_of_month(1900, Month::February), 28);
        assert_eq!(last_day_of_month(2000, Month::February), 29);
    }

    #[test]
    fn nth_weekday_of_month_finds_second_tuesday() {
        let date = nth_weekday_of_month(2024, Month::January, 2, Weekday::Tuesday);

        assert_eq!(
            date,
            Some(Date::from_calendar_date(2024, Month::January, 9).unwrap())
        );
    }

    #[test]
    fn nth_weekday_of_month_returns_none_when_month_is_short() {
        // February 2024 has only four Mondays.
        let date = nth_weekday_of_month(2024, Month::February, 5, Weekday::Monday);

        assert_eq!(date, None);
    }

    #[test]
    fn nth_weekday_of_month_finds_fifth_monday() {
        let date = nth_weekday_of_month(2024, Month::January, 5, Weekday::Monday);

        assert_eq!(
            date,
            Some(Date::from_calendar_date(2024, Month::January, 29).unwrap())
        );
    }
}
