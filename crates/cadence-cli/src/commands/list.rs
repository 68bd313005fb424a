use anyhow::Result;
use cadence_core::calendar::today_in;
use cadence_core::manager::SeriesManager;
use cadence_core::repository::Repository;
use chrono::Days;
use chrono_tz::Tz;

use crate::cli::ListCommand;
use crate::parser::{parse_date, parse_optional_date};
use crate::views::table::display_occurrences;

const DEFAULT_WINDOW_DAYS: u64 = 30;

pub async fn list_occurrences<R: Repository>(
    manager: &SeriesManager<R>,
    command: ListCommand,
    tz: &Tz,
) -> Result<()> {
    let from = parse_optional_date(command.from.as_deref(), tz)?;
    let to = match command.to.as_deref() {
        Some(raw) => parse_date(raw, tz)?,
        None => from
            .checked_add_days(Days::new(DEFAULT_WINDOW_DAYS))
            .unwrap_or(from),
    };

    let occurrences = manager.occurrences_between(from, to).await?;
    display_occurrences(&occurrences, today_in(tz));
    Ok(())
}
