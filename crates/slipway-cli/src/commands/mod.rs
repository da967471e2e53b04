//! Subcommand implementations.

mod generate;
mod inspect;

use crate::cli::Commands;

/// Dispatch a parsed subcommand.
pub fn run(command: Commands) -> miette::Result<()> {
    match command {
        Commands::Generate {
            project,
            config,
            output,
            dry_run,
        } => generate::run(&project, &config, &output, dry_run),
        Commands::Inspect { project } => inspect::run(&project),
    }
}
