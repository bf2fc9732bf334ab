//! Command-line entry points.

pub mod command;
pub mod output;
pub mod plan;
pub mod tag;

use crate::error::Result;
use command::{Cli, Commands};

/// Dispatch a parsed command line to its handler.
///
/// # Errors
///
/// Returns the handler's error.
pub async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Plan(args) => plan::execute(args).await,
        Commands::Tag(args) => tag::execute(&args),
    }
}
