//! Command-line surface.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Top-level argument parser.
#[derive(Parser, Debug)]
#[command(name = "slipway")]
#[command(about = "Generates CI pipeline documents from a project's on-disk capabilities")]
#[command(version)]
pub struct Cli {
    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Probe the project and write one workflow document per branch pattern
    Generate {
        /// Directory of the project to inspect
        #[arg(long, short = 'p', default_value = ".")]
        project: PathBuf,
        /// Path to the generator configuration file
        #[arg(long, short = 'c', default_value = "slipway.yml")]
        config: PathBuf,
        /// Directory the documents are written to
        #[arg(long, short = 'o', default_value = ".github/workflows")]
        output: PathBuf,
        /// Render and print the documents without writing any file
        #[arg(long)]
        dry_run: bool,
    },
    /// Probe the project and print the derived capability snapshot
    Inspect {
        /// Directory of the project to inspect
        #[arg(long, short = 'p', default_value = ".")]
        project: PathBuf,
    },
}
