use anyhow::{anyhow, Result};
use cadence_core::manager::SeriesManager;
use cadence_core::models::{EditOutcome, EditScope, OccurrenceEdits, RecurrenceRule};
use cadence_core::repository::Repository;
use chrono_tz::Tz;
use dialoguer::Select;
use owo_colors::OwoColorize;

use crate::cli::EditCommand;
use crate::parser::{apply_rule_args, parse_date};
use crate::util::resolve_occurrence_id;

pub async fn edit_occurrence<R: Repository>(
    manager: &SeriesManager<R>,
    command: EditCommand,
    tz: &Tz,
) -> Result<()> {
    let occurrence_id = resolve_occurrence_id(manager.repository(), &command.id).await?;
    let occurrence = manager
        .repository()
        .find_occurrence_by_id(occurrence_id)
        .await?
        .ok_or_else(|| anyhow!("Occurrence not found"))?;

    let date = command.date.as_deref().map(|d| parse_date(d, tz)).transpose()?;

    let rule = if command.rule.is_empty() {
        None
    } else {
        let base = match occurrence.series_id {
            Some(series_id) => manager.find_series(series_id).await?.rule,
            None => RecurrenceRule::none(),
        };
        let anchor = date.unwrap_or(occurrence.date);
        Some(apply_rule_args(base, &command.rule, anchor)?)
    };

    let end_date = if command.until_clear {
        Some(None)
    } else {
        command
            .until
            .as_deref()
            .map(|d| parse_date(d, tz).map(Some))
            .transpose()?
    };

    let is_planned = if command.planned {
        Some(true)
    } else if command.unplanned {
        Some(false)
    } else {
        None
    };

    let edits = OccurrenceEdits {
        title: command.title,
        amount: command.amount,
        is_planned,
        date,
        rule,
        end_date,
    };

    let scope = match (occurrence.series_id, command.scope) {
        (None, _) => EditScope::JustThis,
        (Some(_), Some(scope)) => scope,
        (Some(_), None) => {
            let scope_options = vec![
                format!("This occurrence only ({})", occurrence.date),
                "This and future occurrences".to_string(),
                "Entire series".to_string(),
            ];

            println!("{}", "This entry is part of a recurring series.".yellow());
            let selection = Select::new()
                .with_prompt("How would you like to apply your changes?")
                .items(&scope_options)
                .default(0)
                .interact()?;

            match selection {
                0 => EditScope::JustThis,
                1 => EditScope::ThisAndFuture,
                _ => EditScope::AllInSeries,
            }
        }
    };

    let outcome = manager.edit_occurrence(occurrence_id, edits, scope).await?;

    match outcome {
        EditOutcome::Occurrence(occurrence) => println!(
            "{} Updated '{}' on {}",
            "✓".green().bold(),
            occurrence.title,
            occurrence.date
        ),
        EditOutcome::Series { series, report } => println!(
            "{} Updated series '{}': {} created, {} removed, {} hand edits kept",
            "✓".green().bold(),
            series.title,
            report.created,
            report.deleted,
            report.preserved_exceptions
        ),
        EditOutcome::Split {
            past,
            future,
            degenerate,
        } => {
            println!(
                "{} Split series: '{}' ends {}, '{}' ({}) runs {} to {}",
                "✓".green().bold(),
                past.title,
                past.end_date,
                future.title,
                future.id,
                future.start_date,
                future.end_date
            );
            if degenerate {
                println!(
                    "{}",
                    "  The edit started at the first occurrence; \
                     the earlier series now covers a single day."
                        .yellow()
                );
            }
        }
        EditOutcome::Converted(series) => println!(
            "{} Converted into series '{}' ({}), {}",
            "✓".green().bold(),
            series.title,
            series.id,
            series.rule.describe()
        ),
    }

    Ok(())
}
