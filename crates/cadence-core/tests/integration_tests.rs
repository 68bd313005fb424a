use cadence_core::db::{establish_connection, DbPool};
use cadence_core::error::{CoreError, ValidationError};
use cadence_core::manager::SeriesManager;
use cadence_core::models::*;
use cadence_core::repository::{
    ChangeRepository, OccurrenceRepository, SeriesRepository, SqliteRepository,
};
use cadence_core::unit_of_work::ChangeSet;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use tempfile::TempDir;

/// Helper function to create a test database
async fn setup_test_db() -> (SeriesManager<SqliteRepository>, DbPool, TempDir) {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
    let db_path = temp_dir.path().join("test.db");

    let pool = establish_connection(&db_path.to_string_lossy())
        .await
        .expect("Failed to establish test database connection");

    let manager = SeriesManager::new(SqliteRepository::new(pool.clone()));
    (manager, pool, temp_dir)
}

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn monthly_salary() -> NewSeriesData {
    NewSeriesData {
        kind: SeriesKind::Income,
        title: "Salary".to_string(),
        amount: Decimal::new(300000, 2),
        is_planned: true,
        rule: RecurrenceRule::monthly(1, 1),
        start_date: ymd(2025, 1, 1),
        end_date: Some(ymd(2025, 12, 31)),
    }
}

fn dates(occurrences: &[Occurrence]) -> Vec<NaiveDate> {
    occurrences.iter().map(|o| o.date).collect()
}

async fn occurrence_on(
    manager: &SeriesManager<SqliteRepository>,
    series_id: uuid::Uuid,
    date: NaiveDate,
) -> Occurrence {
    manager
        .series_occurrences(series_id)
        .await
        .unwrap()
        .into_iter()
        .find(|o| o.date == date)
        .expect("occurrence on date")
}

#[tokio::test]
async fn test_biweekly_friday_series_round_trips() {
    let (manager, _pool, _temp_dir) = setup_test_db().await;

    let series = manager
        .create_series(NewSeriesData {
            title: "Paycheck".to_string(),
            amount: Decimal::new(215075, 2),
            rule: RecurrenceRule::weekly(2, 6),
            start_date: ymd(2026, 1, 2),
            end_date: Some(ymd(2026, 3, 13)),
            ..monthly_salary()
        })
        .await
        .unwrap();

    let stored = manager.find_series(series.id).await.unwrap();
    assert_eq!(stored, series);

    let occurrences = manager.series_occurrences(series.id).await.unwrap();
    assert_eq!(
        dates(&occurrences),
        vec![
            ymd(2026, 1, 2),
            ymd(2026, 1, 16),
            ymd(2026, 1, 30),
            ymd(2026, 2, 13),
            ymd(2026, 2, 27),
            ymd(2026, 3, 13),
        ]
    );
    assert!(occurrences
        .iter()
        .all(|o| o.amount == Decimal::new(215075, 2) && !o.is_exception));
}

#[tokio::test]
async fn test_regenerate_twice_keeps_same_dates() {
    let (manager, _pool, _temp_dir) = setup_test_db().await;
    let series = manager.create_series(monthly_salary()).await.unwrap();
    let first = dates(&manager.series_occurrences(series.id).await.unwrap());

    manager.regenerate_series(series.id, true).await.unwrap();
    manager.regenerate_series(series.id, true).await.unwrap();

    assert_eq!(dates(&manager.series_occurrences(series.id).await.unwrap()), first);
}

#[tokio::test]
async fn test_exception_survives_series_edit() {
    let (manager, _pool, _temp_dir) = setup_test_db().await;
    let series = manager.create_series(monthly_salary()).await.unwrap();

    let april = occurrence_on(&manager, series.id, ymd(2025, 4, 1)).await;
    manager
        .edit_occurrence(
            april.id,
            OccurrenceEdits {
                amount: Some(Decimal::new(350000, 2)),
                ..Default::default()
            },
            EditScope::JustThis,
        )
        .await
        .unwrap();

    let may = occurrence_on(&manager, series.id, ymd(2025, 5, 1)).await;
    manager
        .edit_occurrence(
            may.id,
            OccurrenceEdits {
                amount: Some(Decimal::new(310000, 2)),
                ..Default::default()
            },
            EditScope::AllInSeries,
        )
        .await
        .unwrap();

    let occurrences = manager.series_occurrences(series.id).await.unwrap();
    assert_eq!(occurrences.len(), 12);
    let april = occurrences.iter().find(|o| o.id == april.id).unwrap();
    assert!(april.is_exception);
    assert_eq!(april.amount, Decimal::new(350000, 2));
    assert!(occurrences
        .iter()
        .filter(|o| !o.is_exception)
        .all(|o| o.amount == Decimal::new(310000, 2)));
}

#[tokio::test]
async fn test_split_in_july_partitions_original_dates() {
    let (manager, _pool, _temp_dir) = setup_test_db().await;
    let series = manager.create_series(monthly_salary()).await.unwrap();
    let original = dates(&manager.series_occurrences(series.id).await.unwrap());

    let july = occurrence_on(&manager, series.id, ymd(2025, 7, 1)).await;
    let outcome = manager
        .edit_occurrence(july.id, OccurrenceEdits::default(), EditScope::ThisAndFuture)
        .await
        .unwrap();
    let EditOutcome::Split { past, future, degenerate } = outcome else {
        panic!("expected a split");
    };
    assert!(!degenerate);

    let stored_past = manager.find_series(past.id).await.unwrap();
    assert_eq!(stored_past.end_date, ymd(2025, 6, 30));
    let stored_future = manager.find_series(future.id).await.unwrap();
    assert_eq!(stored_future.start_date, ymd(2025, 7, 1));

    let mut union = dates(&manager.series_occurrences(past.id).await.unwrap());
    union.extend(dates(&manager.series_occurrences(future.id).await.unwrap()));
    assert_eq!(union, original);
}

#[tokio::test]
async fn test_future_edit_of_moved_paycheck_keeps_biweekly_cadence() {
    let (manager, _pool, _temp_dir) = setup_test_db().await;
    let series = manager
        .create_series(NewSeriesData {
            title: "Paycheck".to_string(),
            rule: RecurrenceRule::weekly(2, 6),
            start_date: ymd(2026, 1, 2),
            end_date: Some(ymd(2026, 3, 13)),
            ..monthly_salary()
        })
        .await
        .unwrap();

    let payday = occurrence_on(&manager, series.id, ymd(2026, 1, 16)).await;
    manager
        .edit_occurrence(
            payday.id,
            OccurrenceEdits {
                date: Some(ymd(2026, 1, 17)),
                ..Default::default()
            },
            EditScope::JustThis,
        )
        .await
        .unwrap();
    let moved = manager
        .repository()
        .find_occurrence_by_id(payday.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(moved.date, ymd(2026, 1, 17));
    assert_eq!(moved.scheduled_date, ymd(2026, 1, 16));

    let outcome = manager
        .edit_occurrence(
            payday.id,
            OccurrenceEdits {
                amount: Some(Decimal::new(320000, 2)),
                ..Default::default()
            },
            EditScope::ThisAndFuture,
        )
        .await
        .unwrap();
    let EditOutcome::Split { past, future, .. } = outcome else {
        panic!("expected a split");
    };

    let mut union = dates(&manager.series_occurrences(past.id).await.unwrap());
    union.extend(dates(&manager.series_occurrences(future.id).await.unwrap()));
    assert_eq!(
        union,
        vec![
            ymd(2026, 1, 2),
            ymd(2026, 1, 17),
            ymd(2026, 1, 30),
            ymd(2026, 2, 13),
            ymd(2026, 2, 27),
            ymd(2026, 3, 13),
        ]
    );
}

#[tokio::test]
async fn test_split_at_first_occurrence_keeps_collapsed_series() {
    let (manager, _pool, _temp_dir) = setup_test_db().await;
    let series = manager.create_series(monthly_salary()).await.unwrap();
    let original = dates(&manager.series_occurrences(series.id).await.unwrap());

    let january = occurrence_on(&manager, series.id, ymd(2025, 1, 1)).await;
    let outcome = manager
        .edit_occurrence(january.id, OccurrenceEdits::default(), EditScope::ThisAndFuture)
        .await
        .unwrap();
    let EditOutcome::Split { past, future, degenerate } = outcome else {
        panic!("expected a split");
    };
    assert!(degenerate);

    let collapsed = manager.find_series(past.id).await.unwrap();
    assert_eq!(collapsed.start_date, collapsed.end_date);
    assert!(manager.series_occurrences(past.id).await.unwrap().is_empty());
    assert_eq!(dates(&manager.series_occurrences(future.id).await.unwrap()), original);

    manager.regenerate_series(past.id, true).await.unwrap();
    assert!(manager.series_occurrences(past.id).await.unwrap().is_empty());
    assert_eq!(dates(&manager.series_occurrences(future.id).await.unwrap()), original);
}

#[tokio::test]
async fn test_invalid_edit_leaves_database_untouched() {
    let (manager, _pool, _temp_dir) = setup_test_db().await;
    let series = manager.create_series(monthly_salary()).await.unwrap();
    let before = manager.series_occurrences(series.id).await.unwrap();

    let edits = OccurrenceEdits {
        end_date: Some(Some(ymd(2024, 12, 31))),
        ..Default::default()
    };
    let err = manager
        .edit_occurrence(before[5].id, edits, EditScope::AllInSeries)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        CoreError::Validation(ValidationError::EndBeforeStart { .. })
    ));

    assert_eq!(manager.series_occurrences(series.id).await.unwrap(), before);
    assert_eq!(manager.find_series(series.id).await.unwrap(), series);
}

#[tokio::test]
async fn test_failed_batch_rolls_back() {
    let (manager, _pool, _temp_dir) = setup_test_db().await;
    let repo = manager.repository();

    let valid = SeriesDefinition::from_new(&monthly_salary(), ymd(2025, 12, 31));
    let unsaved_owner = SeriesDefinition::from_new(&monthly_salary(), ymd(2025, 12, 31));
    let changes = ChangeSet {
        inserted_series: vec![valid.clone()],
        inserted_occurrences: vec![
            Occurrence::from_series(&valid, ymd(2025, 1, 1)),
            // Violates the foreign key
            Occurrence::from_series(&unsaved_owner, ymd(2025, 2, 1)),
        ],
        ..Default::default()
    };

    let err = repo.apply_changes(&changes).await.unwrap_err();
    assert!(matches!(err, CoreError::Database(_)));
    assert!(repo.find_series_by_id(valid.id).await.unwrap().is_none());
    assert!(repo
        .find_occurrences_between(ymd(2025, 1, 1), ymd(2025, 12, 31))
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_delete_series_cascades_but_keeps_detached() {
    let (manager, _pool, _temp_dir) = setup_test_db().await;
    let series = manager.create_series(monthly_salary()).await.unwrap();

    let june = occurrence_on(&manager, series.id, ymd(2025, 6, 1)).await;
    let detached = manager.detach_occurrence(june.id).await.unwrap();
    assert!(detached.series_id.is_none());

    let removed = manager.delete_series(series.id).await.unwrap();
    assert_eq!(removed, 11);

    let remaining = manager
        .occurrences_between(ymd(2025, 1, 1), ymd(2025, 12, 31))
        .await
        .unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, june.id);
    assert!(matches!(
        manager.find_series(series.id).await,
        Err(CoreError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_standalone_occurrence_converts_to_series() {
    let (manager, _pool, _temp_dir) = setup_test_db().await;
    let single = manager
        .create_occurrence(NewOccurrenceData {
            kind: SeriesKind::PlannedExpense,
            title: "Phone plan".to_string(),
            amount: Decimal::new(3500, 2),
            is_planned: true,
            date: ymd(2025, 3, 31),
        })
        .await
        .unwrap();

    let edits = OccurrenceEdits {
        rule: Some(RecurrenceRule::monthly_last_day(1)),
        end_date: Some(Some(ymd(2025, 6, 30))),
        ..Default::default()
    };
    let outcome = manager
        .edit_occurrence(single.id, edits, EditScope::JustThis)
        .await
        .unwrap();
    let EditOutcome::Converted(series) = outcome else {
        panic!("expected a conversion");
    };

    assert!(manager
        .repository()
        .find_occurrence_by_id(single.id)
        .await
        .unwrap()
        .is_none());
    assert_eq!(
        dates(&manager.series_occurrences(series.id).await.unwrap()),
        vec![ymd(2025, 3, 31), ymd(2025, 4, 30), ymd(2025, 5, 31), ymd(2025, 6, 30)]
    );
}

#[tokio::test]
async fn test_short_id_prefix_lookup() {
    let (manager, _pool, _temp_dir) = setup_test_db().await;
    let series = manager.create_series(monthly_salary()).await.unwrap();

    let prefix = &series.id.to_string()[..8];
    let found = manager
        .repository()
        .find_series_by_short_id_prefix(prefix)
        .await
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, series.id);
}

#[tokio::test]
async fn test_corrupt_amount_is_reported() {
    let (manager, pool, _temp_dir) = setup_test_db().await;
    let series = manager.create_series(monthly_salary()).await.unwrap();

    sqlx::query("UPDATE series SET amount = 'n/a' WHERE id = $1")
        .bind(series.id.to_string())
        .execute(&pool)
        .await
        .unwrap();

    assert!(matches!(
        manager.find_series(series.id).await,
        Err(CoreError::CorruptRecord { .. })
    ));
}

#[tokio::test]
async fn test_summary_over_period() {
    let (manager, _pool, _temp_dir) = setup_test_db().await;
    manager.create_series(monthly_salary()).await.unwrap();
    manager
        .create_series(NewSeriesData {
            kind: SeriesKind::PlannedExpense,
            title: "Rent".to_string(),
            amount: Decimal::new(120000, 2),
            rule: RecurrenceRule::monthly(1, 5),
            ..monthly_salary()
        })
        .await
        .unwrap();

    let summary = manager.summarize(ymd(2025, 1, 1), ymd(2025, 3, 31)).await.unwrap();
    assert_eq!(summary.planned_income, Decimal::new(900000, 2));
    assert_eq!(summary.planned_expenses, Decimal::new(360000, 2));
    assert_eq!(summary.net_planned(), Decimal::new(540000, 2));
    assert_eq!(summary.occurrence_count, 6);
}
