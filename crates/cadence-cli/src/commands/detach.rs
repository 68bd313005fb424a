use anyhow::Result;
use cadence_core::manager::SeriesManager;
use cadence_core::repository::Repository;
use owo_colors::OwoColorize;

use crate::cli::DetachCommand;
use crate::util::resolve_occurrence_id;

pub async fn detach_occurrence<R: Repository>(
    manager: &SeriesManager<R>,
    command: DetachCommand,
) -> Result<()> {
    let occurrence_id = resolve_occurrence_id(manager.repository(), &command.id).await?;
    let occurrence = manager.detach_occurrence(occurrence_id).await?;
    println!(
        "{} '{}' on {} is now a standalone entry",
        "✓".green().bold(),
        occurrence.title,
        occurrence.date
    );
    Ok(())
}
