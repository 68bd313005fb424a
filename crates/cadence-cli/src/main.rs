use cadence_core::db;
use cadence_core::error::CoreError;
use cadence_core::manager::SeriesManager;
use cadence_core::repository::SqliteRepository;
use clap::Parser;
use owo_colors::{OwoColorize, Style};
use tracing::debug;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod cli;
mod commands;
mod config;
mod parser;
mod util;
mod views;

fn init_tracing(level: &str) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .init();
}

#[tokio::main]
async fn main() {
    let cli = cli::Cli::parse();

    let config = match config::Config::new() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} Invalid configuration: {}", "Error:".red().bold(), e);
            std::process::exit(1);
        }
    };
    init_tracing(&config.log_level);

    let tz = match config.tz() {
        Ok(tz) => tz,
        Err(e) => {
            handle_error(e.into());
            std::process::exit(1);
        }
    };

    debug!(database = %config.database_path, timezone = %tz, "starting");
    let db_pool = match db::establish_connection(&config.database_path).await {
        Ok(pool) => pool,
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e);
            std::process::exit(1);
        }
    };
    let manager = SeriesManager::new(SqliteRepository::new(db_pool)).with_matcher(config.matcher());

    let result = match cli.command {
        cli::Commands::Series(command) => {
            commands::series::series_command(&manager, command, &config, &tz).await
        }
        cli::Commands::Preview(command) => commands::preview::preview_rule(command, &config, &tz),
        cli::Commands::Add(command) => commands::add::add_occurrence(&manager, command, &tz).await,
        cli::Commands::List(command) => {
            commands::list::list_occurrences(&manager, command, &tz).await
        }
        cli::Commands::Edit(command) => {
            commands::edit::edit_occurrence(&manager, command, &tz).await
        }
        cli::Commands::Detach(command) => {
            commands::detach::detach_occurrence(&manager, command).await
        }
        cli::Commands::Summary(command) => {
            commands::summary::summarize(&manager, command, &tz).await
        }
        cli::Commands::Match(command) => commands::r#match::match_merchant(&manager, command),
    };

    if let Err(e) = result {
        handle_error(e);
        std::process::exit(1);
    }
}

fn handle_error(err: anyhow::Error) {
    let error_style = Style::new().red().bold();

    if let Some(core_error) = err.chain().find_map(|e| e.downcast_ref::<CoreError>()) {
        match core_error {
            CoreError::NotFound(s) => {
                eprintln!("{} {}", "Error:".style(error_style), s);
            }
            CoreError::AmbiguousId(candidates) => {
                eprintln!("{}", "Error: Ambiguous ID.".style(error_style));
                eprintln!("Did you mean one of these?");
                for (id, title) in candidates {
                    eprintln!("  {} ({})", id.yellow(), title);
                }
            }
            CoreError::InvalidInput(s) => {
                eprintln!("{} Invalid input: {}", "Error:".style(error_style), s);
            }
            CoreError::Validation(v) => {
                eprintln!("{} Validation failed: {}", "Error:".style(error_style), v);
            }
            CoreError::CorruptRecord { id, reason } => {
                eprintln!(
                    "{} Stored record {} is unreadable: {}",
                    "Error:".style(error_style),
                    id.yellow(),
                    reason
                );
            }
            _ => eprintln!("{} {:#}", "Error:".style(error_style), err),
        }
    } else {
        eprintln!("{} {:#}", "Error:".style(error_style), err);
    }
}
