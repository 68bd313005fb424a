use std::collections::HashMap;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::error::CoreError;
use crate::models::{Occurrence, SeriesDefinition};
use crate::repository::ChangeRepository;

/// Net set of mutations produced by one unit of work.
///
/// A repository applies it all-or-nothing, in this order: insert series, update
/// series, insert occurrences, update occurrences, delete occurrences, delete
/// series.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangeSet {
    pub inserted_series: Vec<SeriesDefinition>,
    pub updated_series: Vec<SeriesDefinition>,
    pub deleted_series: Vec<Uuid>,
    pub inserted_occurrences: Vec<Occurrence>,
    pub updated_occurrences: Vec<Occurrence>,
    pub deleted_occurrences: Vec<Uuid>,
}

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total number of row-level mutations.
    pub fn len(&self) -> usize {
        self.inserted_series.len()
            + self.updated_series.len()
            + self.deleted_series.len()
            + self.inserted_occurrences.len()
            + self.updated_occurrences.len()
            + self.deleted_occurrences.len()
    }
}

/// In-memory staging area for a reconciliation.
///
/// Records are loaded once, mutated freely by the coordinator, and turned into
/// a [`ChangeSet`] by diffing against what was loaded. Nothing reaches storage
/// until [`UnitOfWork::commit`], so an error anywhere before that leaves
/// persisted state untouched.
#[derive(Debug, Clone, Default)]
pub struct UnitOfWork {
    series: HashMap<Uuid, SeriesDefinition>,
    occurrences: HashMap<Uuid, Occurrence>,
    loaded_series: HashMap<Uuid, SeriesDefinition>,
    loaded_occurrences: HashMap<Uuid, Occurrence>,
}

impl UnitOfWork {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from records already in storage.
    pub fn load(series: Vec<SeriesDefinition>, occurrences: Vec<Occurrence>) -> Self {
        let series: HashMap<Uuid, SeriesDefinition> =
            series.into_iter().map(|s| (s.id, s)).collect();
        let occurrences: HashMap<Uuid, Occurrence> =
            occurrences.into_iter().map(|o| (o.id, o)).collect();
        Self {
            loaded_series: series.clone(),
            loaded_occurrences: occurrences.clone(),
            series,
            occurrences,
        }
    }

    pub fn series(&self, id: Uuid) -> Option<&SeriesDefinition> {
        self.series.get(&id)
    }

    pub fn occurrence(&self, id: Uuid) -> Option<&Occurrence> {
        self.occurrences.get(&id)
    }

    /// Occurrences currently owned by `series_id`, ordered by date.
    pub fn occurrences_of(&self, series_id: Uuid) -> Vec<&Occurrence> {
        let mut owned: Vec<&Occurrence> = self
            .occurrences
            .values()
            .filter(|o| o.series_id == Some(series_id))
            .collect();
        owned.sort_by_key(|o| (o.date, o.id));
        owned
    }

    /// Dates currently owned by `series_id`, ordered.
    pub fn dates_of(&self, series_id: Uuid) -> Vec<NaiveDate> {
        self.occurrences_of(series_id).iter().map(|o| o.date).collect()
    }

    pub fn all_series(&self) -> impl Iterator<Item = &SeriesDefinition> {
        self.series.values()
    }

    pub fn insert_series(&mut self, series: SeriesDefinition) -> Result<(), CoreError> {
        if self.series.contains_key(&series.id) {
            return Err(CoreError::Conflict(format!("series {} already exists", series.id)));
        }
        self.series.insert(series.id, series);
        Ok(())
    }

    pub fn update_series(&mut self, series: SeriesDefinition) -> Result<(), CoreError> {
        match self.series.get_mut(&series.id) {
            Some(slot) => {
                *slot = series;
                Ok(())
            }
            None => Err(CoreError::NotFound(format!("Series with id {} not found", series.id))),
        }
    }

    /// Removes a series and every occurrence it owns. Returns the occurrence count.
    pub fn delete_series(&mut self, id: Uuid) -> Result<usize, CoreError> {
        if self.series.remove(&id).is_none() {
            return Err(CoreError::NotFound(format!("Series with id {} not found", id)));
        }
        let before = self.occurrences.len();
        self.occurrences.retain(|_, o| o.series_id != Some(id));
        Ok(before - self.occurrences.len())
    }

    pub fn insert_occurrence(&mut self, occurrence: Occurrence) -> Result<(), CoreError> {
        if let Some(series_id) = occurrence.series_id {
            if !self.series.contains_key(&series_id) {
                return Err(CoreError::NotFound(format!("Series with id {} not found", series_id)));
            }
        }
        if self.occurrences.contains_key(&occurrence.id) {
            return Err(CoreError::Conflict(format!(
                "occurrence {} already exists",
                occurrence.id
            )));
        }
        self.occurrences.insert(occurrence.id, occurrence);
        Ok(())
    }

    pub fn update_occurrence(&mut self, occurrence: Occurrence) -> Result<(), CoreError> {
        if let Some(series_id) = occurrence.series_id {
            if !self.series.contains_key(&series_id) {
                return Err(CoreError::NotFound(format!("Series with id {} not found", series_id)));
            }
        }
        match self.occurrences.get_mut(&occurrence.id) {
            Some(slot) => {
                *slot = occurrence;
                Ok(())
            }
            None => Err(CoreError::NotFound(format!(
                "Occurrence with id {} not found",
                occurrence.id
            ))),
        }
    }

    pub fn delete_occurrence(&mut self, id: Uuid) -> Option<Occurrence> {
        self.occurrences.remove(&id)
    }

    pub fn has_changes(&self) -> bool {
        self.series != self.loaded_series || self.occurrences != self.loaded_occurrences
    }

    /// Diffs the staged state against what was loaded.
    pub fn changes(&self) -> ChangeSet {
        let mut changes = ChangeSet::default();

        for (id, series) in &self.series {
            match self.loaded_series.get(id) {
                None => changes.inserted_series.push(series.clone()),
                Some(loaded) if loaded != series => changes.updated_series.push(series.clone()),
                Some(_) => {}
            }
        }
        changes.deleted_series = self
            .loaded_series
            .keys()
            .filter(|id| !self.series.contains_key(id))
            .copied()
            .collect();

        for (id, occurrence) in &self.occurrences {
            match self.loaded_occurrences.get(id) {
                None => changes.inserted_occurrences.push(occurrence.clone()),
                Some(loaded) if loaded != occurrence => {
                    changes.updated_occurrences.push(occurrence.clone())
                }
                Some(_) => {}
            }
        }
        changes.deleted_occurrences = self
            .loaded_occurrences
            .keys()
            .filter(|id| !self.occurrences.contains_key(id))
            .copied()
            .collect();

        changes.inserted_series.sort_by_key(|s| (s.start_date, s.id));
        changes.updated_series.sort_by_key(|s| (s.start_date, s.id));
        changes.deleted_series.sort();
        changes.inserted_occurrences.sort_by_key(|o| (o.date, o.id));
        changes.updated_occurrences.sort_by_key(|o| (o.date, o.id));
        changes.deleted_occurrences.sort();
        changes
    }

    /// Hands the net changes to `repository` as one atomic batch.
    pub async fn commit<R>(self, repository: &R) -> Result<ChangeSet, CoreError>
    where
        R: ChangeRepository + ?Sized,
    {
        let changes = self.changes();
        if !changes.is_empty() {
            repository.apply_changes(&changes).await?;
        }
        tracing::debug!(mutations = changes.len(), "unit of work committed");
        Ok(changes)
    }
}
