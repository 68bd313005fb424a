use anyhow::{anyhow, Result};
use cadence_core::calendar::today_in;
use cadence_core::models::RecurrenceRule;
use chrono::{NaiveDate, TimeZone, Utc};
use chrono_english::{parse_date_string, Dialect};
use chrono_tz::Tz;

use crate::cli::RuleArgs;

/// Parses `YYYY-MM-DD`, or an English phrase like "tomorrow" or "next friday"
/// relative to today in `timezone`.
pub fn parse_date(input: &str, timezone: &Tz) -> Result<NaiveDate> {
    let input = input.trim();
    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        return Ok(date);
    }
    let now = timezone.from_utc_datetime(&Utc::now().naive_utc());
    parse_date_string(input, now, Dialect::Us)
        .map(|parsed| parsed.date_naive())
        .map_err(|e| anyhow!("Failed to parse date '{}': {}", input, e))
}

pub fn parse_optional_date(input: Option<&str>, timezone: &Tz) -> Result<NaiveDate> {
    match input {
        Some(raw) => parse_date(raw, timezone),
        None => Ok(today_in(timezone)),
    }
}

/// Weekday by name or abbreviation, or by number (1 = Sunday ... 7 = Saturday).
pub fn parse_weekday(input: &str) -> Result<u32> {
    let input = input.trim().to_lowercase();
    if let Ok(number) = input.parse::<u32>() {
        if (1..=7).contains(&number) {
            return Ok(number);
        }
        return Err(anyhow!("Weekday number must be between 1 (Sunday) and 7 (Saturday)"));
    }
    let number = match input.as_str() {
        "sun" | "sunday" => 1,
        "mon" | "monday" => 2,
        "tue" | "tues" | "tuesday" => 3,
        "wed" | "wednesday" => 4,
        "thu" | "thur" | "thurs" | "thursday" => 5,
        "fri" | "friday" => 6,
        "sat" | "saturday" => 7,
        _ => return Err(anyhow!("Unknown weekday '{}'", input)),
    };
    Ok(number)
}

/// Overlays the flags in `args` on `base`.
///
/// A new frequency re-anchors the rule on `anchor` first, so `--every monthly`
/// alone repeats on the anchor's day of month.
pub fn apply_rule_args(
    base: RecurrenceRule,
    args: &RuleArgs,
    anchor: NaiveDate,
) -> Result<RecurrenceRule> {
    let mut rule = match args.every {
        Some(frequency) if frequency != base.frequency => {
            RecurrenceRule::anchored_at(frequency, base.interval, anchor)
        }
        _ => base,
    };

    if let Some(interval) = args.interval {
        rule.interval = interval;
    }
    if let Some(weekday) = &args.weekday {
        rule.weekly_weekday = parse_weekday(weekday)?;
    }
    if let Some(day) = args.day {
        rule.monthly_day_of_month = day;
        rule.yearly_day_of_month = day;
        rule.monthly_is_last_day = false;
    }
    if args.last_day {
        rule.monthly_is_last_day = true;
    }
    if let Some(month) = args.month {
        rule.yearly_month = month;
    }
    Ok(rule.clamped())
}

/// Rule for a brand new series; `--every` is required.
pub fn rule_from_args(args: &RuleArgs, start: NaiveDate) -> Result<RecurrenceRule> {
    let frequency = args
        .every
        .ok_or_else(|| anyhow!("--every is required (daily, weekly, monthly or yearly)"))?;
    let base = RecurrenceRule::anchored_at(frequency, 1, start);
    apply_rule_args(base, args, start)
}
