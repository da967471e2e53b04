//! The `generate` subcommand: probe, compose, emit.

use miette::IntoDiagnostic;
use slipway_core::GeneratorConfig;
use slipway_engine::template::EmbeddedTemplateStore;
use slipway_engine::{
    CompositionEngine, DocumentEmitter, SharedTemplateStore, default_registry, write_documents,
};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

pub fn run(project: &Path, config: &Path, output: &Path, dry_run: bool) -> miette::Result<()> {
    let caps = slipway_probe::probe(project).into_diagnostic()?;
    let config = GeneratorConfig::load(config).into_diagnostic()?;

    let store: SharedTemplateStore = Arc::new(EmbeddedTemplateStore::new());
    let emitter = DocumentEmitter::new(CompositionEngine::new(default_registry(&store)));
    let documents = emitter.render_all(&caps, &config).into_diagnostic()?;

    if dry_run {
        for document in &documents {
            println!("# --- {}", document.file_name);
            println!("{}", document.content);
        }
        return Ok(());
    }

    std::fs::create_dir_all(output).into_diagnostic()?;
    write_documents(output, &documents).into_diagnostic()?;
    info!(
        count = documents.len(),
        output = %output.display(),
        "generation finished"
    );
    for document in &documents {
        println!("{}", document.file_name);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_generate_writes_documents() {
        let project = tempfile::tempdir().unwrap();
        fs::write(project.path().join("pom.xml"), "<project/>").unwrap();
        let config_path = project.path().join("slipway.yml");
        fs::write(&config_path, "environments:\n  dev: develop\n").unwrap();
        let output = tempfile::tempdir().unwrap();

        run(project.path(), &config_path, output.path(), false).unwrap();

        let written = fs::read_to_string(output.path().join("develop-workflow.yml")).unwrap();
        assert!(written.contains("  compile:"));
    }

    #[test]
    fn test_generate_dry_run_writes_nothing() {
        let project = tempfile::tempdir().unwrap();
        fs::write(project.path().join("pom.xml"), "<project/>").unwrap();
        let config_path = project.path().join("slipway.yml");
        fs::write(&config_path, "environments:\n  dev: develop\n").unwrap();
        let output = tempfile::tempdir().unwrap();

        run(project.path(), &config_path, output.path(), true).unwrap();

        assert!(fs::read_dir(output.path()).unwrap().next().is_none());
    }

    #[test]
    fn test_generate_fails_on_missing_config() {
        let project = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();

        let result = run(
            project.path(),
            &project.path().join("absent.yml"),
            output.path(),
            false,
        );
        assert!(result.is_err());
    }
}
