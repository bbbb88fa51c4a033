//! Clap definitions for the `linebook` binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::error::Result;
use crate::infrastructure::config::Config;

/// Linebook - sportsbook catalog index and wager client.
#[derive(Parser, Debug)]
#[command(name = "linebook")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch the catalog once and print index statistics
    Sync(SyncArgs),

    /// Poll the catalog and wager history until Ctrl-C
    Run(RunArgs),

    /// Convert a signed or decimal price
    Odds(OddsArgs),
}

/// Options shared by commands that talk to the venue.
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Override log level (debug, info, warn, error)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Use JSON log format instead of pretty
    #[arg(long)]
    pub json_logs: bool,
}

impl ConfigArgs {
    /// Load the config file, apply overrides and start logging.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be loaded or fails validation.
    #[allow(clippy::result_large_err)]
    pub fn load(&self) -> Result<Config> {
        let mut config = Config::load(&self.config)?;
        if let Some(ref level) = self.log_level {
            config.logging.level = level.clone();
        }
        if self.json_logs {
            config.logging.format = "json".to_string();
        }
        config.init_logging();
        Ok(config)
    }
}

/// Arguments for the `sync` subcommand.
#[derive(Parser, Debug)]
pub struct SyncArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Print the sync report as JSON
    #[arg(long)]
    pub json: bool,

    /// Also print every indexed selection
    #[arg(long)]
    pub selections: bool,
}

/// Arguments for the `run` subcommand.
#[derive(Parser, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Skip wager history polling
    #[arg(long)]
    pub no_orders: bool,
}

/// Arguments for the `odds` subcommand.
#[derive(Parser, Debug)]
pub struct OddsArgs {
    /// Price to convert: signed (+150, -110) or decimal (2.5)
    #[arg(allow_hyphen_values = true)]
    pub value: String,

    /// Snap the decimal price onto the venue's odds ladder
    #[arg(long)]
    pub snap: bool,

    /// Path to configuration file (used with --snap)
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,
}
