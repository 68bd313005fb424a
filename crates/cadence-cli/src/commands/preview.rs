use anyhow::Result;
use cadence_core::recurrence;
use chrono_tz::Tz;
use owo_colors::OwoColorize;

use crate::cli::PreviewCommand;
use crate::config::Config;
use crate::parser::{parse_date, parse_optional_date, rule_from_args};
use crate::views::table::display_dates;

pub fn preview_rule(command: PreviewCommand, config: &Config, tz: &Tz) -> Result<()> {
    let start = parse_optional_date(command.start.as_deref(), tz)?;
    let end = parse_date(&command.until, tz)?;
    let rule = rule_from_args(&command.rule, start)?;
    let count = command.count.unwrap_or(config.preview_count);

    println!("{} from {} until {}", rule.describe().cyan(), start, end);
    display_dates(&recurrence::preview(rule, start, end, count));
    Ok(())
}
