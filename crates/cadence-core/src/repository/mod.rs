use crate::db::DbPool;
use crate::error::CoreError;
use crate::models::{Occurrence, SeriesDefinition};
use crate::unit_of_work::ChangeSet;
use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

// Domain modules
pub mod changes;
pub mod memory;
pub mod occurrences;
pub mod rows;
pub mod series;

pub use memory::MemoryRepository;

/// Domain-specific trait for series reads
#[async_trait]
pub trait SeriesRepository {
    async fn find_series_by_id(&self, id: Uuid) -> Result<Option<SeriesDefinition>, CoreError>;
    async fn find_all_series(&self) -> Result<Vec<SeriesDefinition>, CoreError>;
    async fn find_series_by_short_id_prefix(
        &self,
        short_id: &str,
    ) -> Result<Vec<SeriesDefinition>, CoreError>;
}

/// Domain-specific trait for occurrence reads
#[async_trait]
pub trait OccurrenceRepository {
    async fn find_occurrence_by_id(&self, id: Uuid) -> Result<Option<Occurrence>, CoreError>;
    async fn find_occurrences_for_series(
        &self,
        series_id: Uuid,
    ) -> Result<Vec<Occurrence>, CoreError>;
    /// Occurrences dated inside `[start, end]`, ordered by date.
    async fn find_occurrences_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Occurrence>, CoreError>;
    async fn find_occurrences_by_short_id_prefix(
        &self,
        short_id: &str,
    ) -> Result<Vec<Occurrence>, CoreError>;
}

/// Atomic write side: a whole [`ChangeSet`] lands or none of it does.
#[async_trait]
pub trait ChangeRepository {
    async fn apply_changes(&self, changes: &ChangeSet) -> Result<(), CoreError>;
}

/// Main repository trait that composes all domain traits
pub trait Repository: SeriesRepository + OccurrenceRepository + ChangeRepository + Send + Sync {}

impl<T> Repository for T where
    T: SeriesRepository + OccurrenceRepository + ChangeRepository + Send + Sync
{
}

/// SQLite implementation of the repository pattern
pub struct SqliteRepository {
    pool: DbPool,
}

impl SqliteRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Get a reference to the database pool for internal use across modules
    pub(crate) fn pool(&self) -> &DbPool {
        &self.pool
    }
}
