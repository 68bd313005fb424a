use anyhow::Result;
use cadence_core::manager::SeriesManager;
use cadence_core::models::NewOccurrenceData;
use cadence_core::repository::Repository;
use chrono_tz::Tz;
use owo_colors::OwoColorize;

use crate::cli::AddCommand;
use crate::parser::parse_optional_date;

pub async fn add_occurrence<R: Repository>(
    manager: &SeriesManager<R>,
    command: AddCommand,
    tz: &Tz,
) -> Result<()> {
    let date = parse_optional_date(command.date.as_deref(), tz)?;
    let occurrence = manager
        .create_occurrence(NewOccurrenceData {
            kind: command.kind,
            title: command.title,
            amount: command.amount,
            is_planned: !command.unplanned,
            date,
        })
        .await?;

    println!(
        "{} Added {} '{}' on {} ({})",
        "✓".green().bold(),
        occurrence.kind,
        occurrence.title.bold(),
        occurrence.date,
        occurrence.id
    );
    Ok(())
}
