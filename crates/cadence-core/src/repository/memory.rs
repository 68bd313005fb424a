use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::error::CoreError;
use crate::models::{Occurrence, SeriesDefinition};
use crate::repository::{ChangeRepository, OccurrenceRepository, SeriesRepository};
use crate::unit_of_work::ChangeSet;

#[derive(Debug, Clone, Default)]
struct MemoryState {
    series: BTreeMap<Uuid, SeriesDefinition>,
    occurrences: BTreeMap<Uuid, Occurrence>,
}

impl MemoryState {
    fn apply(&mut self, changes: &ChangeSet) -> Result<(), CoreError> {
        for series in &changes.inserted_series {
            if self.series.contains_key(&series.id) {
                return Err(CoreError::Conflict(format!("series {} already exists", series.id)));
            }
            self.series.insert(series.id, series.clone());
        }
        for series in &changes.updated_series {
            match self.series.get_mut(&series.id) {
                Some(slot) => *slot = series.clone(),
                None => {
                    return Err(CoreError::NotFound(format!(
                        "Series with id {} not found",
                        series.id
                    )))
                }
            }
        }
        for occurrence in &changes.inserted_occurrences {
            self.check_owner(occurrence)?;
            if self.occurrences.contains_key(&occurrence.id) {
                return Err(CoreError::Conflict(format!(
                    "occurrence {} already exists",
                    occurrence.id
                )));
            }
            self.occurrences.insert(occurrence.id, occurrence.clone());
        }
        for occurrence in &changes.updated_occurrences {
            self.check_owner(occurrence)?;
            match self.occurrences.get_mut(&occurrence.id) {
                Some(slot) => *slot = occurrence.clone(),
                None => {
                    return Err(CoreError::NotFound(format!(
                        "Occurrence with id {} not found",
                        occurrence.id
                    )))
                }
            }
        }
        for id in &changes.deleted_occurrences {
            self.occurrences.remove(id);
        }
        for id in &changes.deleted_series {
            self.series.remove(id);
            self.occurrences.retain(|_, o| o.series_id != Some(*id));
        }
        Ok(())
    }

    fn check_owner(&self, occurrence: &Occurrence) -> Result<(), CoreError> {
        match occurrence.series_id {
            Some(series_id) if !self.series.contains_key(&series_id) => {
                Err(CoreError::Conflict(format!(
                    "occurrence {} references missing series {}",
                    occurrence.id, series_id
                )))
            }
            _ => Ok(()),
        }
    }
}

/// In-process repository with the same all-or-nothing semantics as SQLite.
///
/// A change set is applied to a copy of the state, which replaces the live
/// state only when every step succeeded.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    state: Mutex<MemoryState>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn matches_prefix(id: &Uuid, short_id: &str) -> bool {
    id.to_string().starts_with(&short_id.to_lowercase())
}

#[async_trait]
impl SeriesRepository for MemoryRepository {
    async fn find_series_by_id(&self, id: Uuid) -> Result<Option<SeriesDefinition>, CoreError> {
        Ok(self.state().series.get(&id).cloned())
    }

    async fn find_all_series(&self) -> Result<Vec<SeriesDefinition>, CoreError> {
        let mut all: Vec<SeriesDefinition> = self.state().series.values().cloned().collect();
        all.sort_by_key(|s| (s.start_date, s.id));
        Ok(all)
    }

    async fn find_series_by_short_id_prefix(
        &self,
        short_id: &str,
    ) -> Result<Vec<SeriesDefinition>, CoreError> {
        Ok(self
            .state()
            .series
            .values()
            .filter(|s| matches_prefix(&s.id, short_id))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl OccurrenceRepository for MemoryRepository {
    async fn find_occurrence_by_id(&self, id: Uuid) -> Result<Option<Occurrence>, CoreError> {
        Ok(self.state().occurrences.get(&id).cloned())
    }

    async fn find_occurrences_for_series(
        &self,
        series_id: Uuid,
    ) -> Result<Vec<Occurrence>, CoreError> {
        let mut owned: Vec<Occurrence> = self
            .state()
            .occurrences
            .values()
            .filter(|o| o.series_id == Some(series_id))
            .cloned()
            .collect();
        owned.sort_by_key(|o| (o.date, o.id));
        Ok(owned)
    }

    async fn find_occurrences_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Occurrence>, CoreError> {
        let mut found: Vec<Occurrence> = self
            .state()
            .occurrences
            .values()
            .filter(|o| o.date >= start && o.date <= end)
            .cloned()
            .collect();
        found.sort_by_key(|o| (o.date, o.id));
        Ok(found)
    }

    async fn find_occurrences_by_short_id_prefix(
        &self,
        short_id: &str,
    ) -> Result<Vec<Occurrence>, CoreError> {
        Ok(self
            .state()
            .occurrences
            .values()
            .filter(|o| matches_prefix(&o.id, short_id))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ChangeRepository for MemoryRepository {
    async fn apply_changes(&self, changes: &ChangeSet) -> Result<(), CoreError> {
        let mut guard = self.state();
        let mut next = guard.clone();
        next.apply(changes)?;
        *guard = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewSeriesData, RecurrenceRule, SeriesKind};
    use rust_decimal::Decimal;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn series() -> SeriesDefinition {
        let data = NewSeriesData {
            kind: SeriesKind::PlannedExpense,
            title: "Insurance".to_string(),
            amount: Decimal::new(120, 0),
            is_planned: true,
            rule: RecurrenceRule::yearly(1, 4, 1),
            start_date: ymd(2025, 1, 1),
            end_date: Some(ymd(2027, 12, 31)),
        };
        SeriesDefinition::from_new(&data, ymd(2027, 12, 31))
    }

    #[tokio::test]
    async fn test_failed_change_set_leaves_state_untouched() {
        let repo = MemoryRepository::new();
        let owner = series();
        let good = Occurrence::from_series(&owner, ymd(2025, 4, 1));

        let dangling_owner = series();
        let dangling = Occurrence::from_series(&dangling_owner, ymd(2026, 4, 1));

        let changes = ChangeSet {
            inserted_series: vec![owner.clone()],
            inserted_occurrences: vec![good, dangling],
            ..Default::default()
        };
        let err = repo.apply_changes(&changes).await.unwrap_err();
        assert!(matches!(err, CoreError::Conflict(_)));
        assert!(repo.find_all_series().await.unwrap().is_empty());
        assert!(repo
            .find_occurrences_between(ymd(2025, 1, 1), ymd(2027, 12, 31))
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_deleting_series_cascades() {
        let repo = MemoryRepository::new();
        let owner = series();
        let owned = Occurrence::from_series(&owner, ymd(2025, 4, 1));
        repo.apply_changes(&ChangeSet {
            inserted_series: vec![owner.clone()],
            inserted_occurrences: vec![owned.clone()],
            ..Default::default()
        })
        .await
        .unwrap();

        repo.apply_changes(&ChangeSet {
            deleted_series: vec![owner.id],
            ..Default::default()
        })
        .await
        .unwrap();
        assert!(repo.find_occurrence_by_id(owned.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_short_id_prefix_lookup() {
        let repo = MemoryRepository::new();
        let owner = series();
        repo.apply_changes(&ChangeSet {
            inserted_series: vec![owner.clone()],
            ..Default::default()
        })
        .await
        .unwrap();

        let prefix = &owner.id.to_string()[..8];
        let found = repo.find_series_by_short_id_prefix(prefix).await.unwrap();
        assert_eq!(found, vec![owner]);
        assert!(repo
            .find_series_by_short_id_prefix("zzzz")
            .await
            .unwrap()
            .is_empty());
    }
}
