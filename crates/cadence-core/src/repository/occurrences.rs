use crate::error::CoreError;
use crate::models::Occurrence;
use crate::repository::rows::{occurrences_from_rows, OccurrenceRow, OCCURRENCE_COLUMNS};
use crate::repository::SqliteRepository;
use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

#[async_trait]
impl super::OccurrenceRepository for SqliteRepository {
    async fn find_occurrence_by_id(&self, id: Uuid) -> Result<Option<Occurrence>, CoreError> {
        let row: Option<OccurrenceRow> = sqlx::query_as(&format!(
            "SELECT {} FROM occurrences WHERE id = $1",
            OCCURRENCE_COLUMNS
        ))
        .bind(id.to_string())
        .fetch_optional(self.pool())
        .await?;
        row.map(Occurrence::try_from).transpose()
    }

    async fn find_occurrences_for_series(
        &self,
        series_id: Uuid,
    ) -> Result<Vec<Occurrence>, CoreError> {
        let rows: Vec<OccurrenceRow> = sqlx::query_as(&format!(
            "SELECT {} FROM occurrences WHERE series_id = $1 ORDER BY date, id",
            OCCURRENCE_COLUMNS
        ))
        .bind(series_id.to_string())
        .fetch_all(self.pool())
        .await?;
        occurrences_from_rows(rows)
    }

    async fn find_occurrences_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Occurrence>, CoreError> {
        let rows: Vec<OccurrenceRow> = sqlx::query_as(&format!(
            "SELECT {} FROM occurrences WHERE date >= $1 AND date <= $2 ORDER BY date, id",
            OCCURRENCE_COLUMNS
        ))
        .bind(start)
        .bind(end)
        .fetch_all(self.pool())
        .await?;
        occurrences_from_rows(rows)
    }

    async fn find_occurrences_by_short_id_prefix(
        &self,
        short_id: &str,
    ) -> Result<Vec<Occurrence>, CoreError> {
        let rows: Vec<OccurrenceRow> = sqlx::query_as(&format!(
            "SELECT {} FROM occurrences WHERE id LIKE $1 ORDER BY id",
            OCCURRENCE_COLUMNS
        ))
        .bind(format!("{}%", short_id.to_lowercase()))
        .fetch_all(self.pool())
        .await?;
        occurrences_from_rows(rows)
    }
}
