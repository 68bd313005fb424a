use crate::error::CoreError;
use chrono::{DateTime, Datelike, Days, NaiveDate, Utc, Weekday};
use chrono_tz::Tz;
use std::str::FromStr;

/// Validate IANA timezone name
pub fn validate_timezone(timezone: &str) -> Result<Tz, CoreError> {
    Tz::from_str(timezone)
        .map_err(|_| CoreError::InvalidInput(format!("Invalid timezone: {}", timezone)))
}

/// Calendar day an instant falls on in the given timezone.
///
/// All recurrence math runs on `NaiveDate`; timestamps are reduced to a day here
/// and nowhere else.
pub fn start_of_day(instant: DateTime<Utc>, timezone: &Tz) -> NaiveDate {
    instant.with_timezone(timezone).date_naive()
}

/// Today's date in the given timezone.
pub fn today_in(timezone: &Tz) -> NaiveDate {
    start_of_day(Utc::now(), timezone)
}

pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Number of days in `month` (1-12) of `year`. Out-of-range months are clamped.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month.clamp(1, 12) {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        _ => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
    }
}

/// Builds `year-month-day`, pulling `day` back to the month's last valid day.
///
/// Returns `None` only when the year is outside chrono's supported range.
pub fn clamped_date(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    let month = month.clamp(1, 12);
    let day = day.clamp(1, days_in_month(year, month));
    NaiveDate::from_ymd_opt(year, month, day)
}

pub fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    clamped_date(year, month, 31)
}

/// Months since year 0, used to step through months without date overflow.
pub fn month_index(date: NaiveDate) -> i64 {
    i64::from(date.year()) * 12 + i64::from(date.month0())
}

/// Inverse of [`month_index`].
pub fn year_month_from_index(index: i64) -> Option<(i32, u32)> {
    let year = i32::try_from(index.div_euclid(12)).ok()?;
    let month = u32::try_from(index.rem_euclid(12)).ok()? + 1;
    Some((year, month))
}

/// Weekday numbered 1 = Sunday through 7 = Saturday.
pub fn weekday_number(date: NaiveDate) -> u32 {
    date.weekday().number_from_sunday()
}

pub fn weekday_from_number(number: u32) -> Weekday {
    match number.clamp(1, 7) {
        1 => Weekday::Sun,
        2 => Weekday::Mon,
        3 => Weekday::Tue,
        4 => Weekday::Wed,
        5 => Weekday::Thu,
        6 => Weekday::Fri,
        _ => Weekday::Sat,
    }
}

/// First date on or after `from` whose weekday number equals `weekday`.
pub fn next_weekday_on_or_after(from: NaiveDate, weekday: u32) -> Option<NaiveDate> {
    let current = weekday_number(from);
    let target = weekday.clamp(1, 7);
    let offset = (target + 7 - current) % 7;
    from.checked_add_days(Days::new(u64::from(offset)))
}

/// The day before `date`, saturating at the earliest representable date.
pub fn previous_day(date: NaiveDate) -> NaiveDate {
    date.pred_opt().unwrap_or(NaiveDate::MIN)
}

pub fn add_days(date: NaiveDate, days: u64) -> Option<NaiveDate> {
    date.checked_add_days(Days::new(days))
}
