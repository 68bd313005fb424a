use crate::error::CoreError;
use crate::models::{Occurrence, SeriesDefinition};
use crate::repository::SqliteRepository;
use crate::unit_of_work::ChangeSet;
use async_trait::async_trait;
use sqlx::{Sqlite, Transaction};

#[async_trait]
impl super::ChangeRepository for SqliteRepository {
    async fn apply_changes(&self, changes: &ChangeSet) -> Result<(), CoreError> {
        let mut tx = self.pool().begin().await?;

        for series in &changes.inserted_series {
            insert_series(&mut tx, series).await?;
        }
        for series in &changes.updated_series {
            update_series(&mut tx, series).await?;
        }
        for occurrence in &changes.inserted_occurrences {
            insert_occurrence(&mut tx, occurrence).await?;
        }
        for occurrence in &changes.updated_occurrences {
            update_occurrence(&mut tx, occurrence).await?;
        }
        for id in &changes.deleted_occurrences {
            sqlx::query("DELETE FROM occurrences WHERE id = $1")
                .bind(id.to_string())
                .execute(&mut *tx)
                .await?;
        }
        for id in &changes.deleted_series {
            sqlx::query("DELETE FROM series WHERE id = $1")
                .bind(id.to_string())
                .execute(&mut *tx)
                .await?;
        }

        // Dropping `tx` on any early return above rolls everything back
        tx.commit().await?;
        tracing::debug!(mutations = changes.len(), "change set applied");
        Ok(())
    }
}

async fn insert_series(
    tx: &mut Transaction<'_, Sqlite>,
    series: &SeriesDefinition,
) -> Result<(), CoreError> {
    sqlx::query(
        r#"INSERT INTO series (id, kind, title, amount, is_planned, frequency, repeat_interval,
            weekly_weekday, monthly_day_of_month, monthly_is_last_day, yearly_month,
            yearly_day_of_month, start_date, end_date, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)"#,
    )
    .bind(series.id.to_string())
    .bind(series.kind.as_str())
    .bind(&series.title)
    .bind(series.amount.to_string())
    .bind(series.is_planned)
    .bind(series.rule.frequency.as_str())
    .bind(i64::from(series.rule.interval))
    .bind(i64::from(series.rule.weekly_weekday))
    .bind(i64::from(series.rule.monthly_day_of_month))
    .bind(series.rule.monthly_is_last_day)
    .bind(i64::from(series.rule.yearly_month))
    .bind(i64::from(series.rule.yearly_day_of_month))
    .bind(series.start_date)
    .bind(series.end_date)
    .bind(series.created_at)
    .bind(series.updated_at)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

async fn update_series(
    tx: &mut Transaction<'_, Sqlite>,
    series: &SeriesDefinition,
) -> Result<(), CoreError> {
    let result = sqlx::query(
        r#"UPDATE series SET kind = $2, title = $3, amount = $4, is_planned = $5, frequency = $6,
            repeat_interval = $7, weekly_weekday = $8, monthly_day_of_month = $9,
            monthly_is_last_day = $10, yearly_month = $11, yearly_day_of_month = $12,
            start_date = $13, end_date = $14, updated_at = $15
        WHERE id = $1"#,
    )
    .bind(series.id.to_string())
    .bind(series.kind.as_str())
    .bind(&series.title)
    .bind(series.amount.to_string())
    .bind(series.is_planned)
    .bind(series.rule.frequency.as_str())
    .bind(i64::from(series.rule.interval))
    .bind(i64::from(series.rule.weekly_weekday))
    .bind(i64::from(series.rule.monthly_day_of_month))
    .bind(series.rule.monthly_is_last_day)
    .bind(i64::from(series.rule.yearly_month))
    .bind(i64::from(series.rule.yearly_day_of_month))
    .bind(series.start_date)
    .bind(series.end_date)
    .bind(series.updated_at)
    .execute(&mut **tx)
    .await?;

    if result.rows_affected() == 0 {
        return Err(CoreError::NotFound(format!(
            "Series with id {} not found",
            series.id
        )));
    }
    Ok(())
}

async fn insert_occurrence(
    tx: &mut Transaction<'_, Sqlite>,
    occurrence: &Occurrence,
) -> Result<(), CoreError> {
    sqlx::query(
        r#"INSERT INTO occurrences (id, series_id, kind, date, scheduled_date, title, amount,
            is_planned, is_exception, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)"#,
    )
    .bind(occurrence.id.to_string())
    .bind(occurrence.series_id.map(|id| id.to_string()))
    .bind(occurrence.kind.as_str())
    .bind(occurrence.date)
    .bind(occurrence.scheduled_date)
    .bind(&occurrence.title)
    .bind(occurrence.amount.to_string())
    .bind(occurrence.is_planned)
    .bind(occurrence.is_exception)
    .bind(occurrence.created_at)
    .bind(occurrence.updated_at)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

async fn update_occurrence(
    tx: &mut Transaction<'_, Sqlite>,
    occurrence: &Occurrence,
) -> Result<(), CoreError> {
    let result = sqlx::query(
        r#"UPDATE occurrences SET series_id = $2, kind = $3, date = $4, scheduled_date = $5,
            title = $6, amount = $7, is_planned = $8, is_exception = $9, updated_at = $10
        WHERE id = $1"#,
    )
    .bind(occurrence.id.to_string())
    .bind(occurrence.series_id.map(|id| id.to_string()))
    .bind(occurrence.kind.as_str())
    .bind(occurrence.date)
    .bind(occurrence.scheduled_date)
    .bind(&occurrence.title)
    .bind(occurrence.amount.to_string())
    .bind(occurrence.is_planned)
    .bind(occurrence.is_exception)
    .bind(occurrence.updated_at)
    .execute(&mut **tx)
    .await?;

    if result.rows_affected() == 0 {
        return Err(CoreError::NotFound(format!(
            "Occurrence with id {} not found",
            occurrence.id
        )));
    }
    Ok(())
}
