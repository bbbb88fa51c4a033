//! Command-line interface definitions.

pub mod command;
pub mod odds;
pub mod output;
pub mod run;
pub mod sync;

pub use command::{Cli, Commands, ConfigArgs, OddsArgs, RunArgs, SyncArgs};
