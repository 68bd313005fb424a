use clap::{Args, Parser, Subcommand};
use cadence_core::models::{EditScope, Frequency, SeriesKind};
use rust_decimal::Decimal;

/// Plan recurring income and expenses from the command line
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Manage recurring series
    Series(SeriesCommand),
    /// Show the dates a rule would produce without saving anything
    Preview(PreviewCommand),
    /// Add a one-off income or expense
    Add(AddCommand),
    /// List occurrences in a date range
    List(ListCommand),
    /// Edit an occurrence, optionally across its series
    Edit(EditCommand),
    /// Detach an occurrence from its series
    Detach(DetachCommand),
    /// Totals for a period
    Summary(SummaryCommand),
    /// Suggest a category for a merchant name
    Match(MatchCommand),
}

#[derive(Parser, Debug, Clone)]
pub struct SeriesCommand {
    #[command(subcommand)]
    pub command: SeriesSubcommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum SeriesSubcommand {
    /// Create a series and generate its occurrences
    Add(AddSeriesCommand),
    /// List every series
    List,
    /// Show a series with its occurrences
    Show(ShowSeriesCommand),
    /// Rebuild the occurrences of a series from its rule
    Regenerate(RegenerateCommand),
    /// Delete a series and all of its occurrences
    Delete(DeleteSeriesCommand),
}

/// Recurrence flags shared by `series add`, `preview` and `edit`
#[derive(Args, Debug, Clone, Default)]
pub struct RuleArgs {
    /// How often it repeats (none, daily, weekly, monthly, yearly)
    #[arg(long)]
    pub every: Option<Frequency>,
    /// Repeat every N periods
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub interval: Option<u32>,
    /// Weekday for weekly rules (name, or 1 = Sunday ... 7 = Saturday)
    #[arg(long)]
    pub weekday: Option<String>,
    /// Day of month for monthly rules, or day for yearly rules
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=31), conflicts_with = "last_day")]
    pub day: Option<u32>,
    /// Monthly rules land on the last day of the month
    #[arg(long)]
    pub last_day: bool,
    /// Month for yearly rules
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=12))]
    pub month: Option<u32>,
}

impl RuleArgs {
    pub fn is_empty(&self) -> bool {
        self.every.is_none()
            && self.interval.is_none()
            && self.weekday.is_none()
            && self.day.is_none()
            && !self.last_day
            && self.month.is_none()
    }
}

#[derive(Parser, Debug, Clone)]
pub struct AddSeriesCommand {
    /// Title of the series
    pub title: String,
    /// Amount of each occurrence
    #[arg(short, long)]
    pub amount: Decimal,
    #[arg(short, long, default_value = "income")]
    pub kind: SeriesKind,
    /// First day of the series (defaults to today)
    #[arg(long)]
    pub start: Option<String>,
    /// Last day of the series
    #[arg(long)]
    pub until: String,
    /// Record occurrences as already received rather than planned
    #[arg(long)]
    pub unplanned: bool,
    #[command(flatten)]
    pub rule: RuleArgs,
}

#[derive(Parser, Debug, Clone)]
pub struct ShowSeriesCommand {
    /// ID (or unique prefix) of the series
    pub id: String,
}

#[derive(Parser, Debug, Clone)]
pub struct RegenerateCommand {
    /// ID (or unique prefix) of the series
    pub id: String,
    /// Throw away hand-edited occurrences as well
    #[arg(long)]
    pub drop_exceptions: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct DeleteSeriesCommand {
    /// ID (or unique prefix) of the series
    pub id: String,
    /// Delete without confirmation
    #[arg(short, long)]
    pub force: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct PreviewCommand {
    /// First day (defaults to today)
    #[arg(long)]
    pub start: Option<String>,
    /// Last day
    #[arg(long)]
    pub until: String,
    /// How many dates to show (defaults to the configured preview count)
    #[arg(short = 'n', long)]
    pub count: Option<usize>,
    #[command(flatten)]
    pub rule: RuleArgs,
}

#[derive(Parser, Debug, Clone)]
pub struct AddCommand {
    /// Title of the entry
    pub title: String,
    #[arg(short, long)]
    pub amount: Decimal,
    #[arg(short, long, default_value = "income")]
    pub kind: SeriesKind,
    /// Date of the entry (defaults to today)
    #[arg(short, long)]
    pub date: Option<String>,
    /// Record as already received rather than planned
    #[arg(long)]
    pub unplanned: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct ListCommand {
    /// First day of the range (defaults to today)
    #[arg(long)]
    pub from: Option<String>,
    /// Last day of the range (defaults to 30 days after the start)
    #[arg(long)]
    pub to: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct EditCommand {
    /// ID (or unique prefix) of the occurrence to edit
    pub id: String,

    /// How to apply changes to a series occurrence (this, future, all)
    #[arg(long)]
    pub scope: Option<EditScope>,

    #[arg(long)]
    pub title: Option<String>,

    #[arg(long)]
    pub amount: Option<Decimal>,

    /// Move a single occurrence, or start a standalone entry's new series
    #[arg(long)]
    pub date: Option<String>,

    #[arg(long, conflicts_with = "unplanned")]
    pub planned: bool,
    #[arg(long)]
    pub unplanned: bool,

    /// New last day of the series
    #[arg(long)]
    pub until: Option<String>,
    #[arg(long, conflicts_with = "until")]
    pub until_clear: bool,

    #[command(flatten)]
    pub rule: RuleArgs,
}

#[derive(Parser, Debug, Clone)]
pub struct DetachCommand {
    /// ID (or unique prefix) of the occurrence
    pub id: String,
}

#[derive(Parser, Debug, Clone)]
pub struct SummaryCommand {
    /// First day of the period (defaults to the first of this month)
    #[arg(long)]
    pub from: Option<String>,
    /// Last day of the period (defaults to the end of that month)
    #[arg(long)]
    pub to: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct MatchCommand {
    /// Merchant name as it appears on a statement
    pub merchant: String,
}
