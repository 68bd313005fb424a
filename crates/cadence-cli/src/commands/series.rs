use anyhow::Result;
use cadence_core::calendar::today_in;
use cadence_core::manager::SeriesManager;
use cadence_core::models::NewSeriesData;
use cadence_core::recurrence::RecurrenceEngine;
use cadence_core::repository::Repository;
use chrono_tz::Tz;
use dialoguer::Confirm;
use owo_colors::OwoColorize;

use crate::cli::{
    AddSeriesCommand, DeleteSeriesCommand, RegenerateCommand, SeriesCommand, SeriesSubcommand,
    ShowSeriesCommand,
};
use crate::config::Config;
use crate::parser::{parse_date, parse_optional_date, rule_from_args};
use crate::util::resolve_series_id;
use crate::views::table::{display_occurrences, display_series};

pub async fn series_command<R: Repository>(
    manager: &SeriesManager<R>,
    command: SeriesCommand,
    config: &Config,
    tz: &Tz,
) -> Result<()> {
    match command.command {
        SeriesSubcommand::Add(command) => add_series(manager, command, tz).await,
        SeriesSubcommand::List => {
            display_series(&manager.list_series().await?);
            Ok(())
        }
        SeriesSubcommand::Show(command) => show_series(manager, command, config, tz).await,
        SeriesSubcommand::Regenerate(command) => regenerate_series(manager, command).await,
        SeriesSubcommand::Delete(command) => delete_series(manager, command).await,
    }
}

async fn add_series<R: Repository>(
    manager: &SeriesManager<R>,
    command: AddSeriesCommand,
    tz: &Tz,
) -> Result<()> {
    let start_date = parse_optional_date(command.start.as_deref(), tz)?;
    let end_date = parse_date(&command.until, tz)?;
    let rule = rule_from_args(&command.rule, start_date)?;

    let series = manager
        .create_series(NewSeriesData {
            kind: command.kind,
            title: command.title,
            amount: command.amount,
            is_planned: !command.unplanned,
            rule,
            start_date,
            end_date: Some(end_date),
        })
        .await?;
    let count = manager.series_occurrences(series.id).await?.len();

    println!(
        "{} Created series '{}' ({})",
        "✓".green().bold(),
        series.title.bold(),
        series.id
    );
    println!(
        "  {} from {} until {}, {} occurrences",
        series.rule.describe().cyan(),
        series.start_date,
        series.end_date,
        count
    );
    Ok(())
}

async fn show_series<R: Repository>(
    manager: &SeriesManager<R>,
    command: ShowSeriesCommand,
    config: &Config,
    tz: &Tz,
) -> Result<()> {
    let series_id = resolve_series_id(manager.repository(), &command.id).await?;
    let series = manager.find_series(series_id).await?;
    let today = today_in(tz);

    display_series(std::slice::from_ref(&series));
    match RecurrenceEngine::for_series(&series).next_occurrence_on_or_after(today) {
        Some(next) => println!("Next scheduled date: {}", next.to_string().cyan()),
        None => println!("{}", "No scheduled dates left.".dimmed()),
    }

    let occurrences = manager.series_occurrences(series_id).await?;
    let exceptions = occurrences.iter().filter(|o| o.is_exception).count();
    println!(
        "{} occurrences, {} edited by hand",
        occurrences.len(),
        exceptions
    );
    let upcoming: Vec<_> = occurrences
        .into_iter()
        .filter(|o| o.date >= today)
        .take(config.preview_count)
        .collect();
    display_occurrences(&upcoming, today);
    Ok(())
}

async fn regenerate_series<R: Repository>(
    manager: &SeriesManager<R>,
    command: RegenerateCommand,
) -> Result<()> {
    let series_id = resolve_series_id(manager.repository(), &command.id).await?;
    let report = manager
        .regenerate_series(series_id, !command.drop_exceptions)
        .await?;
    println!(
        "{} Regenerated series: {} created, {} removed, {} hand edits kept",
        "✓".green().bold(),
        report.created,
        report.deleted,
        report.preserved_exceptions
    );
    Ok(())
}

async fn delete_series<R: Repository>(
    manager: &SeriesManager<R>,
    command: DeleteSeriesCommand,
) -> Result<()> {
    let series_id = resolve_series_id(manager.repository(), &command.id).await?;
    let series = manager.find_series(series_id).await?;

    if !command.force {
        let confirmation = Confirm::new()
            .with_prompt(format!(
                "Delete series '{}' and all of its occurrences?",
                series.title
            ))
            .default(false)
            .interact()
            .unwrap_or(false);

        if !confirmation {
            println!("Deletion cancelled.");
            return Ok(());
        }
    }

    let removed = manager.delete_series(series_id).await?;
    println!(
        "{} Deleted series '{}' and {} occurrences",
        "✓".green().bold(),
        series.title,
        removed
    );
    Ok(())
}
