use anyhow::Result;
use cadence_core::calendar::{last_day_of_month, today_in};
use cadence_core::manager::SeriesManager;
use cadence_core::repository::Repository;
use chrono::Datelike;
use chrono_tz::Tz;

use crate::cli::SummaryCommand;
use crate::parser::parse_date;
use crate::views::table::display_summary;

pub async fn summarize<R: Repository>(
    manager: &SeriesManager<R>,
    command: SummaryCommand,
    tz: &Tz,
) -> Result<()> {
    let from = match command.from.as_deref() {
        Some(raw) => parse_date(raw, tz)?,
        None => today_in(tz).with_day(1).unwrap_or_else(|| today_in(tz)),
    };
    let to = match command.to.as_deref() {
        Some(raw) => parse_date(raw, tz)?,
        None => last_day_of_month(from.year(), from.month()).unwrap_or(from),
    };

    let summary = manager.summarize(from, to).await?;
    display_summary(&summary);
    Ok(())
}
