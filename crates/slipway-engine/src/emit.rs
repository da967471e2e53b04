//! Document assembly and file emission.
//!
//! One rendered document per branch descriptor, except when two patterns
//! normalize to the same branch name; then each affected descriptor is split
//! into one document per (branch, stage) pair so file names stay unique.

use crate::compose::CompositionEngine;
use crate::context::{BranchDescriptor, PipelineContext};
use crate::provider::stage_slug;
use slipway_core::{CapabilitySnapshot, Error, GeneratorConfig, Result};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info};

/// Suffix shared by every emitted file; also the purge pattern.
pub const WORKFLOW_FILE_SUFFIX: &str = "-workflow.yml";

const HEADER: &str = "# This file is generated from the project capability snapshot.\n\
                      # Manual edits will be overwritten on the next generator run.\n";

/// A fully rendered pipeline document ready to be written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDocument {
    /// File name within the output directory.
    pub file_name: String,
    /// Complete document content.
    pub content: String,
}

/// Renders all documents for one capability snapshot and configuration.
pub struct DocumentEmitter {
    engine: CompositionEngine,
}

impl DocumentEmitter {
    /// Create an emitter over a composition engine.
    #[must_use]
    pub fn new(engine: CompositionEngine) -> Self {
        Self { engine }
    }

    /// Render one document per branch descriptor.
    ///
    /// Descriptors whose normalized branch name collides with another
    /// descriptor's are split into one single-stage document each.
    /// Documents with no applicable jobs are dropped.
    ///
    /// # Errors
    /// Fails on the first provider or template error.
    pub fn render_all(
        &self,
        caps: &CapabilitySnapshot,
        config: &GeneratorConfig,
    ) -> Result<Vec<RenderedDocument>> {
        let descriptors = BranchDescriptor::group(config);
        let mut name_counts: HashMap<&str, usize> = HashMap::new();
        for descriptor in &descriptors {
            *name_counts.entry(descriptor.branch_name.as_str()).or_default() += 1;
        }

        let mut documents = Vec::new();
        for descriptor in &descriptors {
            let collides = name_counts[descriptor.branch_name.as_str()] > 1;
            let ctx = PipelineContext::new(config, descriptor.clone());
            if collides && !descriptor.stage_names.is_empty() {
                for stage in &descriptor.stage_names {
                    let stage_ctx = ctx.for_single_stage(stage);
                    let stem = format!("{}-{}", descriptor.branch_name, stage_slug(stage));
                    if let Some(document) = self.render_one(caps, &stage_ctx, &stem)? {
                        documents.push(document);
                    }
                }
            } else if let Some(document) = self.render_one(caps, &ctx, &descriptor.branch_name)? {
                documents.push(document);
            }
        }
        Ok(documents)
    }

    fn render_one(
        &self,
        caps: &CapabilitySnapshot,
        ctx: &PipelineContext,
        stem: &str,
    ) -> Result<Option<RenderedDocument>> {
        let jobs = self.engine.compose(caps, ctx)?;
        if jobs.is_empty() {
            debug!(branch = %ctx.branch.branch_pattern, "no applicable jobs, document skipped");
            return Ok(None);
        }

        let mut content = String::from(HEADER);
        content.push_str(&format!("name: {stem}-workflow\n"));
        content.push_str("on:\n  push:\n    branches:\n");
        content.push_str(&format!("      - \"{}\"\n", ctx.branch.branch_pattern));
        if !ctx.variables.is_empty() {
            content.push_str("env:\n");
            for (name, value) in ctx.variables.iter() {
                content.push_str(&format!("  {name}: {value}\n"));
            }
        }
        content.push_str("jobs:\n");
        content.push_str(&jobs);
        content.push('\n');

        Ok(Some(RenderedDocument {
            file_name: format!("{stem}{WORKFLOW_FILE_SUFFIX}"),
            content,
        }))
    }
}

/// Remove previously generated documents, then write the given set.
///
/// Only files matching the generated suffix are purged; anything else in the
/// directory is left alone.
///
/// # Errors
/// Fails when the directory cannot be read or a file cannot be removed or
/// written.
pub fn write_documents(directory: &Path, documents: &[RenderedDocument]) -> Result<()> {
    purge_generated(directory)?;
    for document in documents {
        let path = directory.join(&document.file_name);
        std::fs::write(&path, &document.content).map_err(|source| {
            Error::output_with_source("failed to write document", Some(path.clone()), source)
        })?;
        info!(path = %path.display(), "wrote pipeline document");
    }
    Ok(())
}

fn purge_generated(directory: &Path) -> Result<()> {
    let entries = std::fs::read_dir(directory).map_err(|source| {
        Error::output_with_source(
            "failed to read output directory",
            Some(directory.to_path_buf()),
            source,
        )
    })?;
    for entry in entries {
        let entry = entry?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if name.ends_with(WORKFLOW_FILE_SUFFIX) {
            let path = entry.path();
            std::fs::remove_file(&path).map_err(|source| {
                Error::output_with_source("failed to remove stale document", Some(path), source)
            })?;
            debug!(file = name, "purged stale document");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::default_registry;
    use crate::template::{EmbeddedTemplateStore, SharedTemplateStore};
    use std::sync::Arc;

    fn make_emitter() -> DocumentEmitter {
        let store: SharedTemplateStore = Arc::new(EmbeddedTemplateStore::new());
        DocumentEmitter::new(CompositionEngine::new(default_registry(&store)))
    }

    fn make_config(yaml: &str) -> GeneratorConfig {
        GeneratorConfig::from_yaml(yaml).unwrap()
    }

    #[test]
    fn test_one_document_per_pattern() {
        let emitter = make_emitter();
        let caps = CapabilitySnapshot::new().with_source_code();
        let config = make_config(
            r#"
environments:
  dev: develop
  prod: master
"#,
        );

        let documents = emitter.render_all(&caps, &config).unwrap();
        assert_eq!(documents.len(), 2);
        assert_eq!(documents[0].file_name, "develop-workflow.yml");
        assert_eq!(documents[1].file_name, "master-workflow.yml");
    }

    #[test]
    fn test_document_shape() {
        let emitter = make_emitter();
        let caps = CapabilitySnapshot::new().with_source_code();
        let config = make_config(
            r#"
environments:
  dev: develop
variables:
  MAVEN_OPTS: -Xmx2g
"#,
        );

        let documents = emitter.render_all(&caps, &config).unwrap();
        let content = &documents[0].content;
        assert!(content.starts_with("# This file is generated"));
        assert!(content.contains("name: develop-workflow\n"));
        assert!(content.contains("on:\n  push:\n    branches:\n      - \"develop\"\n"));
        assert!(content.contains("env:\n  MAVEN_OPTS: -Xmx2g\n"));
        assert!(content.contains("jobs:\n  versioning:"));
        assert!(content.ends_with('\n'));
    }

    #[test]
    fn test_env_block_omitted_without_variables() {
        let emitter = make_emitter();
        let caps = CapabilitySnapshot::new().with_source_code();
        let config = make_config("environments:\n  dev: develop\n");

        let documents = emitter.render_all(&caps, &config).unwrap();
        assert!(!documents[0].content.contains("env:"));
    }

    #[test]
    fn test_empty_documents_are_dropped() {
        let emitter = make_emitter();
        let caps = CapabilitySnapshot::new();
        let config = make_config("environments:\n  none: feature/*\n");

        let documents = emitter.render_all(&caps, &config).unwrap();
        assert!(documents.is_empty());
    }

    #[test]
    fn test_colliding_branch_names_split_per_stage() {
        let emitter = make_emitter();
        let caps = CapabilitySnapshot::new().with_source_code();
        // both patterns normalize to "release"
        let config = make_config(
            r#"
environments:
  stage: release/*
  qa: release-*
"#,
        );

        let documents = emitter.render_all(&caps, &config).unwrap();
        let names: Vec<_> = documents.iter().map(|d| d.file_name.as_str()).collect();
        assert_eq!(
            names,
            vec!["release-stage-workflow.yml", "release-qa-workflow.yml"]
        );
        assert!(documents[0].content.contains("name: release-stage-workflow"));
        assert!(documents[0].content.contains("- \"release/*\""));
        assert!(documents[1].content.contains("- \"release-*\""));
    }

    #[test]
    fn test_write_documents_purges_stale_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("old-workflow.yml"), "stale").unwrap();
        std::fs::write(dir.path().join("keep.txt"), "untouched").unwrap();

        let documents = vec![RenderedDocument {
            file_name: "develop-workflow.yml".to_string(),
            content: "name: develop-workflow\n".to_string(),
        }];
        write_documents(dir.path(), &documents).unwrap();

        assert!(!dir.path().join("old-workflow.yml").exists());
        assert!(dir.path().join("keep.txt").exists());
        let written =
            std::fs::read_to_string(dir.path().join("develop-workflow.yml")).unwrap();
        assert_eq!(written, "name: develop-workflow\n");
    }

    #[test]
    fn test_write_documents_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        let err = write_documents(&missing, &[]).unwrap_err();
        assert!(err.to_string().contains("Output error"));
    }
}
