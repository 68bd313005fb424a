use std::collections::BTreeSet;

use chrono::{NaiveDate, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::calendar::previous_day;
use crate::error::CoreError;
use crate::models::{
    validate_bounds, validate_fields, EditOutcome, EditScope, Frequency, NewOccurrenceData,
    NewSeriesData, Occurrence, OccurrenceEdits, RegenerationReport, SeriesDefinition,
};
use crate::recurrence::RecurrenceEngine;
use crate::unit_of_work::UnitOfWork;

/// SeriesEditCoordinator: keeps stored occurrences consistent with their series.
///
/// Responsibilities:
/// 1. Regenerate a series' occurrences while preserving hand-edited exceptions
/// 2. Apply edits at occurrence, series or split scope
/// 3. Turn standalone occurrences into series and back
///
/// Every operation works against a [`UnitOfWork`] and validates before it
/// mutates, so a rejected edit leaves the staged state as it was.
pub struct SeriesEditCoordinator<'a> {
    uow: &'a mut UnitOfWork,
}

impl<'a> SeriesEditCoordinator<'a> {
    pub fn new(uow: &'a mut UnitOfWork) -> Self {
        Self { uow }
    }

    fn series(&self, id: Uuid) -> Result<SeriesDefinition, CoreError> {
        self.uow
            .series(id)
            .cloned()
            .ok_or_else(|| CoreError::NotFound(format!("Series with id {} not found", id)))
    }

    fn occurrence(&self, id: Uuid) -> Result<Occurrence, CoreError> {
        self.uow
            .occurrence(id)
            .cloned()
            .ok_or_else(|| CoreError::NotFound(format!("Occurrence with id {} not found", id)))
    }

    /// Validates `data`, stores the series and generates its occurrences.
    pub fn create_series(&mut self, data: &NewSeriesData) -> Result<SeriesDefinition, CoreError> {
        let end_date = data.validate()?;
        let series = SeriesDefinition::from_new(data, end_date);
        self.uow.insert_series(series.clone())?;
        let report = self.regenerate(series.id, true)?;
        info!(series_id = %series.id, created = report.created, "series created");
        Ok(series)
    }

    pub fn create_occurrence(&mut self, data: &NewOccurrenceData) -> Result<Occurrence, CoreError> {
        data.validate()?;
        let occurrence = Occurrence::standalone(data);
        self.uow.insert_occurrence(occurrence.clone())?;
        Ok(occurrence)
    }

    /// Rebuilds every non-exception occurrence of a series from its rule.
    ///
    /// With `preserve_exceptions`, exceptions stay and the slots they were
    /// scheduled for are not generated again, even when they were moved to
    /// another day. Without it they are dropped like everything else.
    pub fn regenerate(
        &mut self,
        series_id: Uuid,
        preserve_exceptions: bool,
    ) -> Result<RegenerationReport, CoreError> {
        self.regenerate_through(series_id, preserve_exceptions, None)
    }

    fn regenerate_through(
        &mut self,
        series_id: Uuid,
        preserve_exceptions: bool,
        through: Option<NaiveDate>,
    ) -> Result<RegenerationReport, CoreError> {
        let series = self.series(series_id)?;
        let owned: Vec<(Uuid, NaiveDate, bool)> = self
            .uow
            .occurrences_of(series_id)
            .iter()
            .map(|o| (o.id, o.scheduled_date, o.is_exception))
            .collect();

        let mut report = RegenerationReport::default();
        let mut claimed_slots = BTreeSet::new();
        for (id, slot, is_exception) in owned {
            if preserve_exceptions && is_exception {
                claimed_slots.insert(slot);
                report.preserved_exceptions += 1;
            } else {
                self.uow.delete_occurrence(id);
                report.deleted += 1;
            }
        }

        for date in RecurrenceEngine::for_series(&series).iter() {
            if through.is_some_and(|limit| date > limit) {
                break;
            }
            if claimed_slots.contains(&date) {
                continue;
            }
            self.uow.insert_occurrence(Occurrence::from_series(&series, date))?;
            report.created += 1;
        }

        debug!(
            series_id = %series_id,
            created = report.created,
            deleted = report.deleted,
            preserved = report.preserved_exceptions,
            "series regenerated"
        );
        Ok(report)
    }

    /// Replaces a standalone occurrence with a new series built from `data`.
    pub fn convert_single_to_series(
        &mut self,
        occurrence_id: Uuid,
        data: &NewSeriesData,
    ) -> Result<SeriesDefinition, CoreError> {
        let occurrence = self.occurrence(occurrence_id)?;
        if !occurrence.is_standalone() {
            return Err(CoreError::InvalidInput(
                "Occurrence already belongs to a series".to_string(),
            ));
        }
        let series = self.create_series(data)?;
        self.uow.delete_occurrence(occurrence.id);
        info!(
            occurrence_id = %occurrence.id,
            series_id = %series.id,
            "occurrence converted to series"
        );
        Ok(series)
    }

    /// Applies `edits` to an occurrence at the requested scope.
    ///
    /// Standalone occurrences ignore `scope`: a repeating rule converts them to
    /// a series, anything else edits them in place.
    pub fn apply_edit_scope(
        &mut self,
        occurrence_id: Uuid,
        edits: &OccurrenceEdits,
        scope: EditScope,
    ) -> Result<EditOutcome, CoreError> {
        let occurrence = self.occurrence(occurrence_id)?;
        match occurrence.series_id {
            None => self.edit_standalone(occurrence, edits),
            Some(series_id) => match scope {
                EditScope::JustThis => self.edit_just_this(occurrence, edits),
                EditScope::AllInSeries => self.edit_all_in_series(series_id, edits),
                EditScope::ThisAndFuture => self.split(occurrence, series_id, edits),
            },
        }
    }

    fn edit_standalone(
        &mut self,
        occurrence: Occurrence,
        edits: &OccurrenceEdits,
    ) -> Result<EditOutcome, CoreError> {
        if let Some(rule) = edits.rule.filter(|r| r.frequency.is_repeating()) {
            let data = NewSeriesData {
                kind: occurrence.kind,
                title: edits.title.clone().unwrap_or_else(|| occurrence.title.clone()),
                amount: edits.amount.unwrap_or(occurrence.amount),
                is_planned: edits.is_planned.unwrap_or(occurrence.is_planned),
                rule,
                start_date: edits.date.unwrap_or(occurrence.date),
                end_date: edits.end_date.flatten(),
            };
            let series = self.convert_single_to_series(occurrence.id, &data)?;
            return Ok(EditOutcome::Converted(series));
        }

        let mut updated = occurrence;
        edits.apply_to_occurrence(&mut updated, true);
        updated.scheduled_date = updated.date;
        validate_fields(&updated.title, updated.amount)?;
        self.uow.update_occurrence(updated.clone())?;
        Ok(EditOutcome::Occurrence(updated))
    }

    fn edit_just_this(
        &mut self,
        occurrence: Occurrence,
        edits: &OccurrenceEdits,
    ) -> Result<EditOutcome, CoreError> {
        if edits.touches_recurrence() {
            return Err(CoreError::InvalidInput(
                "Repeat and end date changes apply to the series; use the future or all scope"
                    .to_string(),
            ));
        }
        let mut updated = occurrence;
        edits.apply_to_occurrence(&mut updated, true);
        validate_fields(&updated.title, updated.amount)?;
        updated.is_exception = true;
        self.uow.update_occurrence(updated.clone())?;
        debug!(occurrence_id = %updated.id, "occurrence marked as exception");
        Ok(EditOutcome::Occurrence(updated))
    }

    /// Builds the edited copy of `series` without touching storage.
    fn edited_series(
        series: &SeriesDefinition,
        edits: &OccurrenceEdits,
    ) -> Result<(SeriesDefinition, NaiveDate), CoreError> {
        let mut edited = series.clone();
        edits.apply_to_series(&mut edited);
        if !edited.rule.frequency.is_repeating() {
            return Err(CoreError::InvalidInput(
                "A series must keep repeating; detach the occurrence instead".to_string(),
            ));
        }
        let end_date = edits.resolve_end_date(series.end_date)?;
        validate_fields(&edited.title, edited.amount)?;
        Ok((edited, end_date))
    }

    fn edit_all_in_series(
        &mut self,
        series_id: Uuid,
        edits: &OccurrenceEdits,
    ) -> Result<EditOutcome, CoreError> {
        let series = self.series(series_id)?;
        let (mut edited, end_date) = Self::edited_series(&series, edits)?;
        validate_bounds(edited.start_date, end_date)?;
        edited.end_date = end_date;

        self.uow.update_series(edited.clone())?;
        let report = self.regenerate(series_id, true)?;
        info!(series_id = %series_id, created = report.created, "series updated");
        Ok(EditOutcome::Series {
            series: edited,
            report,
        })
    }

    /// Ends the series before the edited occurrence's slot and starts an
    /// edited copy on it.
    ///
    /// The split follows `scheduled_date`, so editing an occurrence that was
    /// moved by hand keeps the future series on the original cadence.
    fn split(
        &mut self,
        occurrence: Occurrence,
        series_id: Uuid,
        edits: &OccurrenceEdits,
    ) -> Result<EditOutcome, CoreError> {
        let original = self.series(series_id)?;
        let split_day = occurrence.scheduled_date;

        if split_day > original.end_date {
            debug!(
                occurrence_id = %occurrence.id,
                "split point is past the series end, editing the occurrence only"
            );
            let field_edits = OccurrenceEdits {
                rule: None,
                end_date: None,
                ..edits.clone()
            };
            return self.edit_just_this(occurrence, &field_edits);
        }

        let (mut future, future_end) = Self::edited_series(&original, edits)?;
        validate_bounds(split_day, future_end)?;

        let degenerate = split_day <= original.start_date;
        let now = Utc::now();

        // A collapsed past series keeps its single day but stops repeating,
        // so regenerating it cannot produce a date the future series owns.
        let mut past = original.clone();
        if degenerate {
            past.end_date = original.start_date;
            past.rule.frequency = Frequency::None;
        } else {
            past.end_date = previous_day(split_day);
        }
        past.updated_at = now;

        future.id = Uuid::now_v7();
        future.start_date = split_day;
        future.end_date = future_end;
        future.created_at = now;
        future.updated_at = now;

        self.uow.update_series(past.clone())?;
        self.uow.insert_series(future.clone())?;

        let tail: Vec<Occurrence> = self
            .uow
            .occurrences_of(series_id)
            .into_iter()
            .filter(|o| o.scheduled_date >= split_day)
            .cloned()
            .collect();
        for mut moved in tail {
            if !moved.is_exception {
                self.uow.delete_occurrence(moved.id);
                continue;
            }
            moved.series_id = Some(future.id);
            if moved.id == occurrence.id {
                edits.apply_to_occurrence(&mut moved, false);
            }
            moved.updated_at = now;
            self.uow.update_occurrence(moved)?;
        }

        self.regenerate_through(past.id, true, Some(previous_day(split_day)))?;
        self.regenerate(future.id, true)?;

        if degenerate {
            warn!(
                series_id = %past.id,
                split_day = %split_day,
                "split at or before series start, past series collapsed to a single day"
            );
        }
        info!(past = %past.id, future = %future.id, split_day = %split_day, "series split");
        Ok(EditOutcome::Split {
            past,
            future,
            degenerate,
        })
    }

    /// Makes a series occurrence standalone. It is no longer an exception.
    pub fn detach_occurrence(&mut self, occurrence_id: Uuid) -> Result<Occurrence, CoreError> {
        let mut occurrence = self.occurrence(occurrence_id)?;
        if occurrence.is_standalone() {
            return Err(CoreError::InvalidInput(
                "Occurrence is not part of a series".to_string(),
            ));
        }
        occurrence.series_id = None;
        occurrence.is_exception = false;
        occurrence.scheduled_date = occurrence.date;
        occurrence.updated_at = Utc::now();
        self.uow.update_occurrence(occurrence.clone())?;
        Ok(occurrence)
    }

    /// Deletes a series and its occurrences. Returns how many occurrences went with it.
    pub fn delete_series(&mut self, series_id: Uuid) -> Result<usize, CoreError> {
        let removed = self.uow.delete_series(series_id)?;
        info!(series_id = %series_id, occurrences = removed, "series deleted");
        Ok(removed)
    }
}
