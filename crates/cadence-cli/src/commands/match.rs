use anyhow::Result;
use cadence_core::manager::SeriesManager;
use cadence_core::repository::Repository;
use owo_colors::OwoColorize;

use crate::cli::MatchCommand;

pub fn match_merchant<R: Repository>(
    manager: &SeriesManager<R>,
    command: MatchCommand,
) -> Result<()> {
    match manager.suggest_category(&command.merchant) {
        Some(suggestion) => {
            println!(
                "{} {} (score {:.2})",
                "Suggested category:".bold(),
                suggestion.category.green(),
                suggestion.score
            );
            if let Some(runner_up) = suggestion.runner_up {
                println!("  next best category scored {:.2}", runner_up);
            }
        }
        None => println!("No confident category match for '{}'.", command.merchant),
    }
    Ok(())
}
