//! Command-line front end over the tally services.

mod args;
mod commands;
pub mod output;
pub mod system_clock;

use std::path::PathBuf;

use clap::Parser;
use tally_config::{ConfigError, ConfigManager};
use tally_core::CoreError;
use thiserror::Error;

pub use args::{BudgetCommand, CategoryCommand, Cli, Command, SectionCommand, UserCommand};
pub use system_clock::SystemClock;

/// User-facing CLI error wrapper.
#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Output error: {0}")]
    Output(#[from] serde_json::Error),
}

impl CliError {
    /// Process exit code: 2 for unauthorized, 3 for missing records, 1 otherwise.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Core(CoreError::Unauthorized) => 2,
            CliError::Core(err) if err.is_not_found() => 3,
            _ => 1,
        }
    }
}

/// Parses process arguments and runs the selected command.
pub fn run_cli() -> Result<(), CliError> {
    run(Cli::parse())
}

pub fn run(cli: Cli) -> Result<(), CliError> {
    let manager = match &cli.config {
        Some(path) => ConfigManager::new(path.clone()),
        None => ConfigManager::default_location()?,
    };
    let mut config = manager.load()?;
    if let Some(dir) = &cli.data_dir {
        config.data_root = Some(dir.clone());
    }
    crate::init_with_filter(config.log_filter.as_deref());
    output::set_plain(cli.plain);
    output::set_currency(&config.currency);

    let data_root: PathBuf = config.resolve_data_root();
    tracing::debug!(data_root = %data_root.display(), "resolved storage root");
    commands::dispatch(&cli, &config, &data_root)
}
