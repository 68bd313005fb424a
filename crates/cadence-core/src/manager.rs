use chrono::NaiveDate;
use tracing::info;
use uuid::Uuid;

use crate::coordinator::SeriesEditCoordinator;
use crate::error::CoreError;
use crate::matching::{CategorySuggestion, MerchantMatcher};
use crate::models::{
    EditOutcome, EditScope, NewOccurrenceData, NewSeriesData, Occurrence, OccurrenceEdits,
    RegenerationReport, SeriesDefinition,
};
use crate::repository::Repository;
use crate::summary::PeriodSummary;
use crate::unit_of_work::UnitOfWork;

/// SeriesManager: the async entry point used by front ends.
///
/// Each mutating call loads the records it touches into a fresh
/// [`UnitOfWork`], lets [`SeriesEditCoordinator`] reconcile them, and commits
/// the resulting change set in one batch.
pub struct SeriesManager<R: Repository> {
    repo: R,
    matcher: MerchantMatcher,
}

impl<R: Repository> SeriesManager<R> {
    pub fn new(repo: R) -> Self {
        Self {
            repo,
            matcher: MerchantMatcher::default(),
        }
    }

    pub fn with_matcher(mut self, matcher: MerchantMatcher) -> Self {
        self.matcher = matcher;
        self
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    async fn load_series(&self, series_id: Uuid) -> Result<UnitOfWork, CoreError> {
        let series = self
            .repo
            .find_series_by_id(series_id)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("Series with id {} not found", series_id)))?;
        let occurrences = self.repo.find_occurrences_for_series(series_id).await?;
        Ok(UnitOfWork::load(vec![series], occurrences))
    }

    async fn load_occurrence(&self, occurrence_id: Uuid) -> Result<UnitOfWork, CoreError> {
        let occurrence = self
            .repo
            .find_occurrence_by_id(occurrence_id)
            .await?
            .ok_or_else(|| {
                CoreError::NotFound(format!("Occurrence with id {} not found", occurrence_id))
            })?;
        match occurrence.series_id {
            Some(series_id) => self.load_series(series_id).await,
            None => Ok(UnitOfWork::load(Vec::new(), vec![occurrence])),
        }
    }

    pub async fn create_series(&self, data: NewSeriesData) -> Result<SeriesDefinition, CoreError> {
        let mut uow = UnitOfWork::new();
        let series = SeriesEditCoordinator::new(&mut uow).create_series(&data)?;
        uow.commit(&self.repo).await?;
        Ok(series)
    }

    pub async fn create_occurrence(
        &self,
        data: NewOccurrenceData,
    ) -> Result<Occurrence, CoreError> {
        let mut uow = UnitOfWork::new();
        let occurrence = SeriesEditCoordinator::new(&mut uow).create_occurrence(&data)?;
        uow.commit(&self.repo).await?;
        info!(occurrence_id = %occurrence.id, "standalone occurrence created");
        Ok(occurrence)
    }

    pub async fn regenerate_series(
        &self,
        series_id: Uuid,
        preserve_exceptions: bool,
    ) -> Result<RegenerationReport, CoreError> {
        let mut uow = self.load_series(series_id).await?;
        let report =
            SeriesEditCoordinator::new(&mut uow).regenerate(series_id, preserve_exceptions)?;
        uow.commit(&self.repo).await?;
        Ok(report)
    }

    pub async fn convert_single_to_series(
        &self,
        occurrence_id: Uuid,
        data: NewSeriesData,
    ) -> Result<SeriesDefinition, CoreError> {
        let mut uow = self.load_occurrence(occurrence_id).await?;
        let series =
            SeriesEditCoordinator::new(&mut uow).convert_single_to_series(occurrence_id, &data)?;
        uow.commit(&self.repo).await?;
        Ok(series)
    }

    pub async fn edit_occurrence(
        &self,
        occurrence_id: Uuid,
        edits: OccurrenceEdits,
        scope: EditScope,
    ) -> Result<EditOutcome, CoreError> {
        let mut uow = self.load_occurrence(occurrence_id).await?;
        let outcome =
            SeriesEditCoordinator::new(&mut uow).apply_edit_scope(occurrence_id, &edits, scope)?;
        uow.commit(&self.repo).await?;
        Ok(outcome)
    }

    pub async fn detach_occurrence(&self, occurrence_id: Uuid) -> Result<Occurrence, CoreError> {
        let mut uow = self.load_occurrence(occurrence_id).await?;
        let occurrence = SeriesEditCoordinator::new(&mut uow).detach_occurrence(occurrence_id)?;
        uow.commit(&self.repo).await?;
        info!(occurrence_id = %occurrence_id, "occurrence detached");
        Ok(occurrence)
    }

    pub async fn delete_series(&self, series_id: Uuid) -> Result<usize, CoreError> {
        let mut uow = self.load_series(series_id).await?;
        let removed = SeriesEditCoordinator::new(&mut uow).delete_series(series_id)?;
        uow.commit(&self.repo).await?;
        Ok(removed)
    }

    pub async fn find_series(&self, series_id: Uuid) -> Result<SeriesDefinition, CoreError> {
        self.repo
            .find_series_by_id(series_id)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("Series with id {} not found", series_id)))
    }

    pub async fn list_series(&self) -> Result<Vec<SeriesDefinition>, CoreError> {
        self.repo.find_all_series().await
    }

    pub async fn series_occurrences(&self, series_id: Uuid) -> Result<Vec<Occurrence>, CoreError> {
        self.repo.find_occurrences_for_series(series_id).await
    }

    pub async fn occurrences_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Occurrence>, CoreError> {
        if end < start {
            return Err(CoreError::InvalidInput(format!(
                "Period end {} is before its start {}",
                end, start
            )));
        }
        self.repo.find_occurrences_between(start, end).await
    }

    pub async fn summarize(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PeriodSummary, CoreError> {
        let occurrences = self.occurrences_between(start, end).await?;
        Ok(PeriodSummary::from_occurrences(start, end, &occurrences))
    }

    pub fn suggest_category(&self, merchant: &str) -> Option<CategorySuggestion> {
        self.matcher.suggest(merchant)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RecurrenceRule, SeriesKind};
    use crate::repository::MemoryRepository;
    use rust_decimal::Decimal;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn rent() -> NewSeriesData {
        NewSeriesData {
            kind: SeriesKind::PlannedExpense,
            title: "Rent".to_string(),
            amount: Decimal::new(1450, 0),
            is_planned: true,
            rule: RecurrenceRule::monthly_last_day(1),
            start_date: ymd(2025, 1, 1),
            end_date: Some(ymd(2025, 6, 30)),
        }
    }

    #[tokio::test]
    async fn test_create_and_summarize() {
        let manager = SeriesManager::new(MemoryRepository::new());
        let series = manager.create_series(rent()).await.unwrap();

        let stored = manager.series_occurrences(series.id).await.unwrap();
        assert_eq!(stored.len(), 6);
        assert_eq!(stored[1].date, ymd(2025, 2, 28));

        let summary = manager.summarize(ymd(2025, 1, 1), ymd(2025, 3, 31)).await.unwrap();
        assert_eq!(summary.planned_expenses, Decimal::new(4350, 0));
        assert_eq!(summary.occurrence_count, 3);
    }

    #[tokio::test]
    async fn test_rejected_edit_commits_nothing() {
        let manager = SeriesManager::new(MemoryRepository::new());
        let series = manager.create_series(rent()).await.unwrap();
        let before = manager.series_occurrences(series.id).await.unwrap();

        let edits = OccurrenceEdits {
            end_date: Some(None),
            ..Default::default()
        };
        let err = manager
            .edit_occurrence(before[2].id, edits, EditScope::ThisAndFuture)
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
        assert_eq!(manager.series_occurrences(series.id).await.unwrap(), before);
        assert_eq!(manager.list_series().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_split_persists_both_series() {
        let manager = SeriesManager::new(MemoryRepository::new());
        let series = manager.create_series(rent()).await.unwrap();
        let stored = manager.series_occurrences(series.id).await.unwrap();

        let edits = OccurrenceEdits {
            amount: Some(Decimal::new(1500, 0)),
            ..Default::default()
        };
        let outcome = manager
            .edit_occurrence(stored[3].id, edits, EditScope::ThisAndFuture)
            .await
            .unwrap();
        let EditOutcome::Split { past, future, .. } = outcome else {
            panic!("expected a split");
        };

        assert_eq!(manager.list_series().await.unwrap().len(), 2);
        assert_eq!(manager.series_occurrences(past.id).await.unwrap().len(), 3);
        let tail = manager.series_occurrences(future.id).await.unwrap();
        assert_eq!(tail.len(), 3);
        assert!(tail.iter().all(|o| o.amount == Decimal::new(1500, 0)));
    }

    #[tokio::test]
    async fn test_occurrences_between_rejects_reversed_period() {
        let manager = SeriesManager::new(MemoryRepository::new());
        assert!(matches!(
            manager.occurrences_between(ymd(2025, 2, 1), ymd(2025, 1, 1)).await,
            Err(CoreError::InvalidInput(_))
        ));
    }
}
