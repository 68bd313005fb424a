use crate::calendar::weekday_number;
use crate::error::ValidationError;
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

// ============================================================================
// Stored enumerations
// ============================================================================

/// How often a series repeats.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    #[default]
    None,
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::None => "none",
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
            Frequency::Monthly => "monthly",
            Frequency::Yearly => "yearly",
        }
    }

    pub fn is_repeating(&self) -> bool {
        !matches!(self, Frequency::None)
    }

    /// Lenient decode for stored values. Unknown strings fall back to `None`.
    pub fn from_raw(raw: &str) -> Self {
        raw.parse().unwrap_or_else(|_| {
            tracing::warn!(value = %raw, "unrecognized stored frequency, treating as none");
            Frequency::None
        })
    }
}

impl std::fmt::Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, PartialEq)]
#[error("Invalid frequency: {0}")]
pub struct ParseFrequencyError(String);

impl FromStr for Frequency {
    type Err = ParseFrequencyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "none" | "never" => Ok(Frequency::None),
            "daily" | "day" => Ok(Frequency::Daily),
            "weekly" | "week" => Ok(Frequency::Weekly),
            "monthly" | "month" => Ok(Frequency::Monthly),
            "yearly" | "year" | "annually" => Ok(Frequency::Yearly),
            _ => Err(ParseFrequencyError(s.to_string())),
        }
    }
}

/// Whether a record is money coming in or a planned expense.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesKind {
    #[default]
    Income,
    PlannedExpense,
}

impl SeriesKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SeriesKind::Income => "income",
            SeriesKind::PlannedExpense => "planned_expense",
        }
    }

    /// Lenient decode for stored values. Unknown strings fall back to `Income`.
    pub fn from_raw(raw: &str) -> Self {
        raw.parse().unwrap_or_else(|_| {
            tracing::warn!(value = %raw, "unrecognized stored kind, treating as income");
            SeriesKind::Income
        })
    }
}

impl std::fmt::Display for SeriesKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, PartialEq)]
#[error("Invalid kind: {0}")]
pub struct ParseSeriesKindError(String);

impl FromStr for SeriesKind {
    type Err = ParseSeriesKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "income" => Ok(SeriesKind::Income),
            "planned_expense" | "expense" | "preset" => Ok(SeriesKind::PlannedExpense),
            _ => Err(ParseSeriesKindError(s.to_string())),
        }
    }
}

// ============================================================================
// Recurrence rule
// ============================================================================

/// Frequency, interval and the anchor that pins each occurrence inside its period.
///
/// Only the anchor matching `frequency` is consulted; the others are kept so a
/// form can switch frequency without losing what the user picked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecurrenceRule {
    pub frequency: Frequency,
    /// Every N periods, at least 1
    pub interval: u32,
    /// 1 = Sunday ... 7 = Saturday
    pub weekly_weekday: u32,
    pub monthly_day_of_month: u32,
    pub monthly_is_last_day: bool,
    pub yearly_month: u32,
    pub yearly_day_of_month: u32,
}

impl Default for RecurrenceRule {
    fn default() -> Self {
        Self {
            frequency: Frequency::None,
            interval: 1,
            weekly_weekday: 1,
            monthly_day_of_month: 1,
            monthly_is_last_day: false,
            yearly_month: 1,
            yearly_day_of_month: 1,
        }
    }
}

impl RecurrenceRule {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn daily(interval: u32) -> Self {
        Self {
            frequency: Frequency::Daily,
            interval,
            ..Self::default()
        }
        .clamped()
    }

    pub fn weekly(interval: u32, weekday: u32) -> Self {
        Self {
            frequency: Frequency::Weekly,
            interval,
            weekly_weekday: weekday,
            ..Self::default()
        }
        .clamped()
    }

    pub fn monthly(interval: u32, day_of_month: u32) -> Self {
        Self {
            frequency: Frequency::Monthly,
            interval,
            monthly_day_of_month: day_of_month,
            ..Self::default()
        }
        .clamped()
    }

    pub fn monthly_last_day(interval: u32) -> Self {
        Self {
            frequency: Frequency::Monthly,
            interval,
            monthly_day_of_month: 31,
            monthly_is_last_day: true,
            ..Self::default()
        }
        .clamped()
    }

    pub fn yearly(interval: u32, month: u32, day_of_month: u32) -> Self {
        Self {
            frequency: Frequency::Yearly,
            interval,
            yearly_month: month,
            yearly_day_of_month: day_of_month,
            ..Self::default()
        }
        .clamped()
    }

    /// Rule whose anchors are all taken from `date`: its weekday, day of month
    /// and month.
    pub fn anchored_at(frequency: Frequency, interval: u32, date: NaiveDate) -> Self {
        Self {
            frequency,
            interval,
            weekly_weekday: weekday_number(date),
            monthly_day_of_month: date.day(),
            monthly_is_last_day: false,
            yearly_month: date.month(),
            yearly_day_of_month: date.day(),
        }
        .clamped()
    }

    /// Pulls every field into its valid range.
    pub fn clamped(self) -> Self {
        Self {
            frequency: self.frequency,
            interval: self.interval.max(1),
            weekly_weekday: self.weekly_weekday.clamp(1, 7),
            monthly_day_of_month: self.monthly_day_of_month.clamp(1, 31),
            monthly_is_last_day: self.monthly_is_last_day,
            yearly_month: self.yearly_month.clamp(1, 12),
            yearly_day_of_month: self.yearly_day_of_month.clamp(1, 31),
        }
    }

    /// Short human description, e.g. "every 2 weeks on Fri".
    pub fn describe(&self) -> String {
        let rule = self.clamped();
        let every = |unit: &str| {
            if rule.interval == 1 {
                format!("every {}", unit)
            } else {
                format!("every {} {}s", rule.interval, unit)
            }
        };
        match rule.frequency {
            Frequency::None => "does not repeat".to_string(),
            Frequency::Daily => every("day"),
            Frequency::Weekly => format!(
                "{} on {}",
                every("week"),
                crate::calendar::weekday_from_number(rule.weekly_weekday)
            ),
            Frequency::Monthly if rule.monthly_is_last_day => {
                format!("{} on the last day", every("month"))
            }
            Frequency::Monthly => {
                format!("{} on day {}", every("month"), rule.monthly_day_of_month)
            }
            Frequency::Yearly => format!(
                "{} on {:02}-{:02}",
                every("year"),
                rule.yearly_month,
                rule.yearly_day_of_month
            ),
        }
    }
}

// ============================================================================
// Persisted records
// ============================================================================

/// A recurring income or planned expense. Owns its generated occurrences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesDefinition {
    /// UUIDv7 for time-ordered ids
    pub id: Uuid,
    pub kind: SeriesKind,
    pub title: String,
    pub amount: Decimal,
    pub is_planned: bool,
    pub rule: RecurrenceRule,
    /// Inclusive lower bound; never moved by an edit
    pub start_date: NaiveDate,
    /// Inclusive upper bound, always >= start_date
    pub end_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SeriesDefinition {
    /// Builds a new series from validated input.
    pub fn from_new(data: &NewSeriesData, end_date: NaiveDate) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            kind: data.kind,
            title: data.title.trim().to_string(),
            amount: data.amount,
            is_planned: data.is_planned,
            rule: data.rule.clamped(),
            start_date: data.start_date,
            end_date,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date <= self.end_date
    }
}

/// One dated income or expense, generated from a series or entered on its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Occurrence {
    pub id: Uuid,
    /// Owning series; `None` for standalone records
    pub series_id: Option<Uuid>,
    pub kind: SeriesKind,
    pub date: NaiveDate,
    /// Date the rule generated this occurrence for. Moving the occurrence by
    /// hand changes `date` only, so the slot stays claimed.
    pub scheduled_date: NaiveDate,
    pub title: String,
    pub amount: Decimal,
    pub is_planned: bool,
    /// Edited by hand; regeneration leaves it alone
    pub is_exception: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Occurrence {
    /// Fresh, non-exception occurrence carrying the series' current values.
    pub fn from_series(series: &SeriesDefinition, date: NaiveDate) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            series_id: Some(series.id),
            kind: series.kind,
            date,
            scheduled_date: date,
            title: series.title.clone(),
            amount: series.amount,
            is_planned: series.is_planned,
            is_exception: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn standalone(data: &NewOccurrenceData) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            series_id: None,
            kind: data.kind,
            date: data.date,
            scheduled_date: data.date,
            title: data.title.trim().to_string(),
            amount: data.amount,
            is_planned: data.is_planned,
            is_exception: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_standalone(&self) -> bool {
        self.series_id.is_none()
    }
}

// ============================================================================
// Data Transfer Objects
// ============================================================================

/// Data required to create a new recurring series
#[derive(Debug, Clone)]
pub struct NewSeriesData {
    pub kind: SeriesKind,
    pub title: String,
    pub amount: Decimal,
    pub is_planned: bool,
    pub rule: RecurrenceRule,
    pub start_date: NaiveDate,
    /// Required for a repeating series; kept optional so a form can hand over
    /// exactly what the user entered
    pub end_date: Option<NaiveDate>,
}

impl NewSeriesData {
    /// Checks every field and returns the resolved end date.
    pub fn validate(&self) -> Result<NaiveDate, ValidationError> {
        validate_fields(&self.title, self.amount)?;
        if !self.rule.frequency.is_repeating() {
            return Err(ValidationError::NotRepeating);
        }
        let end = self.end_date.ok_or(ValidationError::MissingEndDate)?;
        validate_bounds(self.start_date, end)?;
        Ok(end)
    }
}

/// Data required to create a standalone occurrence
#[derive(Debug, Clone)]
pub struct NewOccurrenceData {
    pub kind: SeriesKind,
    pub title: String,
    pub amount: Decimal,
    pub is_planned: bool,
    pub date: NaiveDate,
}

impl NewOccurrenceData {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_fields(&self.title, self.amount)
    }
}

/// Changes a user made in an edit form. `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct OccurrenceEdits {
    pub title: Option<String>,
    pub amount: Option<Decimal>,
    pub is_planned: Option<bool>,
    /// Only honored for single-occurrence edits
    pub date: Option<NaiveDate>,
    pub rule: Option<RecurrenceRule>,
    /// `Some(None)` means the user cleared the end date
    pub end_date: Option<Option<NaiveDate>>,
}

impl OccurrenceEdits {
    pub fn touches_recurrence(&self) -> bool {
        self.rule.is_some() || self.end_date.is_some()
    }

    /// Writes the title, amount, planned flag and (optionally) date onto `occurrence`.
    pub fn apply_to_occurrence(&self, occurrence: &mut Occurrence, include_date: bool) {
        if let Some(title) = &self.title {
            occurrence.title = title.trim().to_string();
        }
        if let Some(amount) = self.amount {
            occurrence.amount = amount;
        }
        if let Some(is_planned) = self.is_planned {
            occurrence.is_planned = is_planned;
        }
        if include_date {
            if let Some(date) = self.date {
                occurrence.date = date;
            }
        }
        occurrence.updated_at = Utc::now();
    }

    /// Writes the descriptive fields and rule onto `series`. Bounds are left to the caller.
    pub fn apply_to_series(&self, series: &mut SeriesDefinition) {
        if let Some(title) = &self.title {
            series.title = title.trim().to_string();
        }
        if let Some(amount) = self.amount {
            series.amount = amount;
        }
        if let Some(is_planned) = self.is_planned {
            series.is_planned = is_planned;
        }
        if let Some(rule) = self.rule {
            series.rule = rule.clamped();
        }
        series.updated_at = Utc::now();
    }

    /// End date after the edit, given the current one.
    pub fn resolve_end_date(&self, current: NaiveDate) -> Result<NaiveDate, ValidationError> {
        match self.end_date {
            None => Ok(current),
            Some(None) => Err(ValidationError::MissingEndDate),
            Some(Some(end)) => Ok(end),
        }
    }
}

pub(crate) fn validate_fields(title: &str, amount: Decimal) -> Result<(), ValidationError> {
    if title.trim().is_empty() {
        return Err(ValidationError::BlankTitle);
    }
    if amount <= Decimal::ZERO {
        return Err(ValidationError::NonPositiveAmount(amount));
    }
    Ok(())
}

pub(crate) fn validate_bounds(start: NaiveDate, end: NaiveDate) -> Result<(), ValidationError> {
    if end < start {
        return Err(ValidationError::EndBeforeStart { start, end });
    }
    Ok(())
}

/// Scope for edits made to an occurrence that belongs to a series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditScope {
    /// Affect only the selected occurrence
    JustThis,
    /// Split the series and apply the edit from this occurrence forward
    ThisAndFuture,
    /// Rewrite the whole series, keeping its start date
    AllInSeries,
}

impl std::fmt::Display for EditScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EditScope::JustThis => write!(f, "this"),
            EditScope::ThisAndFuture => write!(f, "future"),
            EditScope::AllInSeries => write!(f, "all"),
        }
    }
}

impl FromStr for EditScope {
    type Err = ParseEditScopeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "this" | "occurrence" | "just_this" => Ok(EditScope::JustThis),
            "future" | "this_and_future" => Ok(EditScope::ThisAndFuture),
            "all" | "series" | "entire" => Ok(EditScope::AllInSeries),
            _ => Err(ParseEditScopeError(s.to_string())),
        }
    }
}

#[derive(Error, Debug, PartialEq)]
#[error("Invalid edit scope: {0}")]
pub struct ParseEditScopeError(String);

// ============================================================================
// Results
// ============================================================================

/// Counts from one regeneration pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegenerationReport {
    pub created: usize,
    pub deleted: usize,
    pub preserved_exceptions: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EditOutcome {
    /// A single occurrence changed in place
    Occurrence(Occurrence),
    /// The whole series was rewritten and regenerated
    Series {
        series: SeriesDefinition,
        report: RegenerationReport,
    },
    /// The series was split at the edited occurrence
    Split {
        past: SeriesDefinition,
        future: SeriesDefinition,
        /// The split point was at or before the original start, so `past`
        /// was collapsed to a single day
        degenerate: bool,
    },
    /// A standalone occurrence gained a repeat rule and became a series
    Converted(SeriesDefinition),
}
