use chrono::{Datelike, NaiveDate};

use crate::calendar::{
    add_days, clamped_date, last_day_of_month, month_index, next_weekday_on_or_after,
    year_month_from_index,
};
use crate::models::{Frequency, RecurrenceRule, SeriesDefinition};

/// Every occurrence date of `series`, ascending.
pub fn occurrences(series: &SeriesDefinition) -> Vec<NaiveDate> {
    RecurrenceEngine::for_series(series).occurrences()
}

/// First `count` dates a rule would produce between `start` and `end`.
pub fn preview(
    rule: RecurrenceRule,
    start: NaiveDate,
    end: NaiveDate,
    count: usize,
) -> Vec<NaiveDate> {
    RecurrenceEngine::new(rule, start, end).preview(count)
}

pub fn next_occurrence_on_or_after(series: &SeriesDefinition, day: NaiveDate) -> Option<NaiveDate> {
    RecurrenceEngine::for_series(series).next_occurrence_on_or_after(day)
}

/// RecurrenceEngine: expands a rule over inclusive day bounds.
///
/// Responsibilities:
/// 1. Clamp the rule defensively (interval >= 1, anchors in range)
/// 2. Produce strictly ascending dates inside `[start, end]`
/// 3. Clamp month-end anchors to the last valid day of the target month
///
/// Generation is pure and bounded by `end`, so it always terminates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecurrenceEngine {
    rule: RecurrenceRule,
    start: NaiveDate,
    end: NaiveDate,
}

impl RecurrenceEngine {
    pub fn new(rule: RecurrenceRule, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            rule: rule.clamped(),
            start,
            end,
        }
    }

    pub fn for_series(series: &SeriesDefinition) -> Self {
        Self::new(series.rule, series.start_date, series.end_date)
    }

    /// Lazy, finite iterator over the occurrence dates.
    pub fn iter(&self) -> Occurrences {
        Occurrences {
            rule: self.rule,
            start: self.start,
            end: self.end,
            step: 0,
            done: !self.rule.frequency.is_repeating(),
        }
    }

    pub fn occurrences(&self) -> Vec<NaiveDate> {
        self.iter().collect()
    }

    /// First occurrence on or after `day`, if the series still has one.
    pub fn next_occurrence_on_or_after(&self, day: NaiveDate) -> Option<NaiveDate> {
        self.iter().find(|date| *date >= day)
    }

    /// The first `count` occurrences, for showing a rule before it is saved.
    pub fn preview(&self, count: usize) -> Vec<NaiveDate> {
        self.iter().take(count).collect()
    }

    pub fn rule(&self) -> &RecurrenceRule {
        &self.rule
    }
}

impl IntoIterator for &RecurrenceEngine {
    type Item = NaiveDate;
    type IntoIter = Occurrences;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator returned by [`RecurrenceEngine::iter`].
///
/// Candidate `k` is the `k`-th period counted from the start; candidates that
/// land before `start` are skipped and the first one past `end` stops it.
#[derive(Debug, Clone)]
pub struct Occurrences {
    rule: RecurrenceRule,
    start: NaiveDate,
    end: NaiveDate,
    step: u64,
    done: bool,
}

impl Occurrences {
    fn candidate(&self, step: u64) -> Option<NaiveDate> {
        let periods = step.checked_mul(u64::from(self.rule.interval))?;
        match self.rule.frequency {
            Frequency::None => None,
            Frequency::Daily => add_days(self.start, periods),
            Frequency::Weekly => {
                let first = next_weekday_on_or_after(self.start, self.rule.weekly_weekday)?;
                add_days(first, periods.checked_mul(7)?)
            }
            Frequency::Monthly => {
                let index = month_index(self.start).checked_add(i64::try_from(periods).ok()?)?;
                let (year, month) = year_month_from_index(index)?;
                if self.rule.monthly_is_last_day {
                    last_day_of_month(year, month)
                } else {
                    clamped_date(year, month, self.rule.monthly_day_of_month)
                }
            }
            Frequency::Yearly => {
                let year = i64::from(self.start.year()).checked_add(i64::try_from(periods).ok()?)?;
                clamped_date(
                    i32::try_from(year).ok()?,
                    self.rule.yearly_month,
                    self.rule.yearly_day_of_month,
                )
            }
        }
    }
}

impl Iterator for Occurrences {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done {
            let candidate = self.candidate(self.step);
            self.step += 1;
            match candidate {
                Some(date) if date > self.end => self.done = true,
                Some(date) if date < self.start => continue,
                Some(date) => return Some(date),
                None => self.done = true,
            }
        }
        None
    }
}

impl std::iter::FusedIterator for Occurrences {}
