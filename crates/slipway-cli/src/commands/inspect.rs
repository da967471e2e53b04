//! The `inspect` subcommand: print the derived capability snapshot.

use miette::IntoDiagnostic;
use std::path::Path;

pub fn run(project: &Path) -> miette::Result<()> {
    let caps = slipway_probe::probe(project).into_diagnostic()?;
    let yaml = serde_yaml::to_string(&caps).into_diagnostic()?;
    print!("{yaml}");
    Ok(())
}
