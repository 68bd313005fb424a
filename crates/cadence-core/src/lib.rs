//! # Cadence Core Library
//!
//! Recurring income and planned expense series for a budgeting app: date
//! generation, exception-preserving regeneration, and scoped edits that can
//! split a series in two.
//!
//! ## Features
//!
//! - **Pure Recurrence**: Daily, weekly, monthly and yearly rules with intervals,
//!   month-end clamping and inclusive bounds
//! - **Exception Preservation**: Hand-edited occurrences survive regeneration
//! - **Scoped Edits**: Just this occurrence, this and future (a split), or the
//!   whole series
//! - **Atomic Persistence**: Every reconciliation is one change set applied in a
//!   single SQLite transaction
//! - **Merchant Matching**: Category suggestions from remembered merchant rules
//!
//! ## Core Modules
//!
//! - [`calendar`]: Calendar-day helpers and timezone handling
//! - [`models`]: Core data structures and transfer objects
//! - [`recurrence`]: Occurrence date generation
//! - [`unit_of_work`]: Staged changes and their net diff
//! - [`coordinator`]: Regeneration and edit-scope reconciliation
//! - [`repository`]: Data access layer with Repository pattern
//! - [`manager`]: Async entry point tying the above together
//! - [`summary`]: Period totals
//! - [`matching`]: Merchant to category suggestions
//! - [`db`]: Database connection and migration management
//! - [`error`]: Error types
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use cadence_core::{
//!     db, manager::SeriesManager,
//!     models::{NewSeriesData, RecurrenceRule, SeriesKind},
//!     repository::SqliteRepository,
//! };
//! use chrono::NaiveDate;
//! use rust_decimal::Decimal;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), cadence_core::error::CoreError> {
//!     let pool = db::establish_connection("cadence.db").await?;
//!     let manager = SeriesManager::new(SqliteRepository::new(pool));
//!
//!     // Paid every other Friday through the first quarter
//!     let series = manager
//!         .create_series(NewSeriesData {
//!             kind: SeriesKind::Income,
//!             title: "Paycheck".to_string(),
//!             amount: Decimal::new(215000, 2),
//!             is_planned: true,
//!             rule: RecurrenceRule::weekly(2, 6),
//!             start_date: NaiveDate::from_ymd_opt(2026, 1, 2).unwrap(),
//!             end_date: NaiveDate::from_ymd_opt(2026, 3, 13),
//!         })
//!         .await?;
//!     println!("Created series: {}", series.title);
//!
//!     Ok(())
//! }
//! ```

pub mod calendar;
pub mod coordinator;
pub mod db;
pub mod error;
pub mod manager;
pub mod matching;
pub mod models;
pub mod recurrence;
pub mod repository;
pub mod summary;
pub mod unit_of_work;
