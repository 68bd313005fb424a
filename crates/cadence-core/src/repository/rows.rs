//! Storage shapes of the two tables and their conversion to domain records.
//!
//! Ids and amounts are stored as text; decoding them can fail on a hand-edited
//! database, which surfaces as [`CoreError::CorruptRecord`]. Unknown enum
//! strings do not fail and fall back to a default instead.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::CoreError;
use crate::models::{Frequency, Occurrence, RecurrenceRule, SeriesDefinition, SeriesKind};

pub(crate) const SERIES_COLUMNS: &str = "id, kind, title, amount, is_planned, frequency, \
     repeat_interval, weekly_weekday, monthly_day_of_month, monthly_is_last_day, yearly_month, \
     yearly_day_of_month, start_date, end_date, created_at, updated_at";

pub(crate) const OCCURRENCE_COLUMNS: &str = "id, series_id, kind, date, scheduled_date, \
     title, amount, is_planned, is_exception, created_at, updated_at";

#[derive(Debug, Clone, FromRow)]
pub struct SeriesRow {
    pub id: String,
    pub kind: String,
    pub title: String,
    pub amount: String,
    pub is_planned: bool,
    pub frequency: String,
    pub repeat_interval: i64,
    pub weekly_weekday: i64,
    pub monthly_day_of_month: i64,
    pub monthly_is_last_day: bool,
    pub yearly_month: i64,
    pub yearly_day_of_month: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct OccurrenceRow {
    pub id: String,
    pub series_id: Option<String>,
    pub kind: String,
    pub date: NaiveDate,
    pub scheduled_date: NaiveDate,
    pub title: String,
    pub amount: String,
    pub is_planned: bool,
    pub is_exception: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn corrupt(id: &str, reason: impl Into<String>) -> CoreError {
    CoreError::CorruptRecord {
        id: id.to_string(),
        reason: reason.into(),
    }
}

fn parse_id(row_id: &str, raw: &str) -> Result<Uuid, CoreError> {
    Uuid::parse_str(raw).map_err(|e| corrupt(row_id, format!("bad id {:?}: {}", raw, e)))
}

fn parse_amount(row_id: &str, raw: &str) -> Result<Decimal, CoreError> {
    Decimal::from_str(raw).map_err(|e| corrupt(row_id, format!("bad amount {:?}: {}", raw, e)))
}

/// Saturating conversion for stored small integers; the rule clamps afterwards.
fn small(value: i64) -> u32 {
    u32::try_from(value.max(0)).unwrap_or(u32::MAX)
}

impl TryFrom<SeriesRow> for SeriesDefinition {
    type Error = CoreError;

    fn try_from(row: SeriesRow) -> Result<Self, Self::Error> {
        let rule = RecurrenceRule {
            frequency: Frequency::from_raw(&row.frequency),
            interval: small(row.repeat_interval),
            weekly_weekday: small(row.weekly_weekday),
            monthly_day_of_month: small(row.monthly_day_of_month),
            monthly_is_last_day: row.monthly_is_last_day,
            yearly_month: small(row.yearly_month),
            yearly_day_of_month: small(row.yearly_day_of_month),
        }
        .clamped();

        Ok(SeriesDefinition {
            id: parse_id(&row.id, &row.id)?,
            kind: SeriesKind::from_raw(&row.kind),
            amount: parse_amount(&row.id, &row.amount)?,
            title: row.title,
            is_planned: row.is_planned,
            rule,
            start_date: row.start_date,
            end_date: row.end_date,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl TryFrom<OccurrenceRow> for Occurrence {
    type Error = CoreError;

    fn try_from(row: OccurrenceRow) -> Result<Self, Self::Error> {
        let series_id = row
            .series_id
            .as_deref()
            .map(|raw| parse_id(&row.id, raw))
            .transpose()?;

        Ok(Occurrence {
            id: parse_id(&row.id, &row.id)?,
            series_id,
            kind: SeriesKind::from_raw(&row.kind),
            date: row.date,
            scheduled_date: row.scheduled_date,
            amount: parse_amount(&row.id, &row.amount)?,
            title: row.title,
            is_planned: row.is_planned,
            is_exception: row.is_exception,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

pub(crate) fn series_from_rows(rows: Vec<SeriesRow>) -> Result<Vec<SeriesDefinition>, CoreError> {
    rows.into_iter().map(SeriesDefinition::try_from).collect()
}

pub(crate) fn occurrences_from_rows(
    rows: Vec<OccurrenceRow>,
) -> Result<Vec<Occurrence>, CoreError> {
    rows.into_iter().map(Occurrence::try_from).collect()
}
