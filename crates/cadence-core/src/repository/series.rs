use crate::error::CoreError;
use crate::models::SeriesDefinition;
use crate::repository::rows::{series_from_rows, SeriesRow, SERIES_COLUMNS};
use crate::repository::SqliteRepository;
use async_trait::async_trait;
use uuid::Uuid;

#[async_trait]
impl super::SeriesRepository for SqliteRepository {
    async fn find_series_by_id(&self, id: Uuid) -> Result<Option<SeriesDefinition>, CoreError> {
        let row: Option<SeriesRow> =
            sqlx::query_as(&format!("SELECT {} FROM series WHERE id = $1", SERIES_COLUMNS))
                .bind(id.to_string())
                .fetch_optional(self.pool())
                .await?;
        row.map(SeriesDefinition::try_from).transpose()
    }

    async fn find_all_series(&self) -> Result<Vec<SeriesDefinition>, CoreError> {
        let rows: Vec<SeriesRow> = sqlx::query_as(&format!(
            "SELECT {} FROM series ORDER BY start_date, id",
            SERIES_COLUMNS
        ))
        .fetch_all(self.pool())
        .await?;
        series_from_rows(rows)
    }

    async fn find_series_by_short_id_prefix(
        &self,
        short_id: &str,
    ) -> Result<Vec<SeriesDefinition>, CoreError> {
        let rows: Vec<SeriesRow> = sqlx::query_as(&format!(
            "SELECT {} FROM series WHERE id LIKE $1 ORDER BY id",
            SERIES_COLUMNS
        ))
        .bind(format!("{}%", short_id.to_lowercase()))
        .fetch_all(self.pool())
        .await?;
        series_from_rows(rows)
    }
}
