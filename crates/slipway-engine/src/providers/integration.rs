//! Downstream integration family: workflow triggers and notifications.
//!
//! Both providers resolve per-stage target references of the form
//! `"<label>[:<target>]"`. The job id is derived from the display label,
//! not from the stage name, so several differently-labeled triggers can
//! coexist for the same stage.

use crate::context::PipelineContext;
use crate::provider::{
    StageProvider, display_name, label_slug, latest_applicable_ids, needs_clause, stage_slug,
};
use crate::template::{SharedTemplateStore, substitute};
use slipway_core::{CapabilitySnapshot, Result};
use std::sync::Arc;

/// A parsed `"<label>[:<target>]"` reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetReference {
    /// Human-readable display label.
    pub label: String,
    /// Target repository, workflow or channel.
    pub target: String,
}

impl TargetReference {
    /// Parse a raw reference, substituting `default_target` when the
    /// optional target segment is absent or empty.
    #[must_use]
    pub fn parse(raw: &str, default_target: &str) -> Self {
        match raw.split_once(':') {
            Some((label, target)) if !target.trim().is_empty() => Self {
                label: label.trim().to_string(),
                target: target.trim().to_string(),
            },
            _ => Self {
                label: raw.trim_end_matches(':').trim().to_string(),
                target: default_target.to_string(),
            },
        }
    }

    /// The job id derived from the label, stage-qualified under fan-out.
    #[must_use]
    pub fn job_id(&self, ctx: &PipelineContext, stage: &str) -> String {
        let slug = label_slug(&self.label);
        if ctx.is_fan_out() {
            format!("{slug}-{}", stage_slug(stage))
        } else {
            slug
        }
    }
}

/// Triggers a downstream workflow for each stage that declares a target.
pub struct DownstreamTriggerProvider {
    store: SharedTemplateStore,
    predecessors: Vec<Arc<dyn StageProvider>>,
}

impl DownstreamTriggerProvider {
    /// Create the provider. `predecessors` are earlier-registered
    /// build/test/deploy providers in registration order; the latest
    /// applicable one per stage becomes the `needs` edge.
    #[must_use]
    pub fn new(store: SharedTemplateStore, predecessors: Vec<Arc<dyn StageProvider>>) -> Self {
        Self {
            store,
            predecessors,
        }
    }
}

impl StageProvider for DownstreamTriggerProvider {
    fn default_name(&self) -> &'static str {
        "downstream-trigger"
    }

    fn is_applicable(&self, _caps: &CapabilitySnapshot, ctx: &PipelineContext) -> bool {
        ctx.branch
            .stage_names
            .iter()
            .any(|stage| ctx.downstream.contains_key(stage))
    }

    fn job_identifiers(&self, ctx: &PipelineContext, stage: &str) -> Vec<String> {
        ctx.downstream
            .get(stage)
            .map(|raw| TargetReference::parse(raw, &ctx.default_downstream_target))
            .map(|reference| vec![reference.job_id(ctx, stage)])
            .unwrap_or_default()
    }

    fn render(&self, caps: &CapabilitySnapshot, ctx: &PipelineContext) -> Result<Option<String>> {
        if !self.is_applicable(caps, ctx) {
            return Ok(None);
        }
        let body = self.store.load(self.default_name())?;
        let mut blocks = Vec::new();
        for stage in &ctx.branch.stage_names {
            let Some(raw) = ctx.downstream.get(stage) else {
                continue;
            };
            let reference = TargetReference::parse(raw, &ctx.default_downstream_target);
            let needs = latest_applicable_ids(&self.predecessors, caps, ctx, stage);
            let rendered = substitute(
                self.default_name(),
                &body,
                &[
                    ("JOB_ID", reference.job_id(ctx, stage)),
                    ("JOB_NAME", display_name(&reference.label, ctx, stage)),
                    ("RUNS_ON", ctx.runs_on()),
                    ("NEEDS", needs_clause(&needs)),
                    ("TARGET", reference.target.clone()),
                    ("STAGE_NAME", stage.clone()),
                ],
            )?;
            blocks.push(rendered.trim_end().to_string());
        }
        Ok(Some(blocks.join("\n\n")))
    }
}

/// Sends a completion notification for each stage that declares a channel.
pub struct NotificationProvider {
    store: SharedTemplateStore,
    predecessors: Vec<Arc<dyn StageProvider>>,
}

impl NotificationProvider {
    /// Create the provider.
    #[must_use]
    pub fn new(store: SharedTemplateStore, predecessors: Vec<Arc<dyn StageProvider>>) -> Self {
        Self {
            store,
            predecessors,
        }
    }
}

impl StageProvider for NotificationProvider {
    fn default_name(&self) -> &'static str {
        "notify"
    }

    fn is_applicable(&self, _caps: &CapabilitySnapshot, ctx: &PipelineContext) -> bool {
        ctx.branch
            .stage_names
            .iter()
            .any(|stage| ctx.notifications.contains_key(stage))
    }

    fn job_identifiers(&self, ctx: &PipelineContext, stage: &str) -> Vec<String> {
        ctx.notifications
            .get(stage)
            .map(|raw| TargetReference::parse(raw, &ctx.default_notification_channel))
            .map(|reference| vec![reference.job_id(ctx, stage)])
            .unwrap_or_default()
    }

    fn render(&self, caps: &CapabilitySnapshot, ctx: &PipelineContext) -> Result<Option<String>> {
        if !self.is_applicable(caps, ctx) {
            return Ok(None);
        }
        let body = self.store.load(self.default_name())?;
        let mut blocks = Vec::new();
        for stage in &ctx.branch.stage_names {
            let Some(raw) = ctx.notifications.get(stage) else {
                continue;
            };
            let reference = TargetReference::parse(raw, &ctx.default_notification_channel);
            let needs = latest_applicable_ids(&self.predecessors, caps, ctx, stage);
            let rendered = substitute(
                self.default_name(),
                &body,
                &[
                    ("JOB_ID", reference.job_id(ctx, stage)),
                    ("JOB_NAME", display_name(&reference.label, ctx, stage)),
                    ("RUNS_ON", ctx.runs_on()),
                    ("NEEDS", needs_clause(&needs)),
                    ("CHANNEL", reference.target.clone()),
                    ("STAGE_NAME", stage.clone()),
                ],
            )?;
            blocks.push(rendered.trim_end().to_string());
        }
        Ok(Some(blocks.join("\n\n")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::BranchDescriptor;
    use crate::providers::{CompileProvider, UnitTestProvider, VersioningProvider};
    use crate::template::EmbeddedTemplateStore;
    use slipway_core::GeneratorConfig;

    fn make_ctx(yaml: &str) -> PipelineContext {
        let config = GeneratorConfig::from_yaml(yaml).unwrap();
        PipelineContext::new(&config, BranchDescriptor::group(&config).remove(0))
    }

    fn make_downstream() -> DownstreamTriggerProvider {
        let store: SharedTemplateStore = Arc::new(EmbeddedTemplateStore::new());
        let versioning = Arc::new(VersioningProvider::new(store.clone()));
        let compile = Arc::new(CompileProvider::new(store.clone(), versioning));
        let unit_test = Arc::new(UnitTestProvider::new(store.clone(), compile.clone()));
        DownstreamTriggerProvider::new(store, vec![compile, unit_test])
    }

    #[test]
    fn test_parse_with_target() {
        let reference = TargetReference::parse("E2E Test:org/other-repo", "default");
        assert_eq!(reference.label, "E2E Test");
        assert_eq!(reference.target, "org/other-repo");
    }

    #[test]
    fn test_parse_without_target_uses_default() {
        let reference = TargetReference::parse("E2E Test", "org/fallback");
        assert_eq!(reference.label, "E2E Test");
        assert_eq!(reference.target, "org/fallback");

        let trailing = TargetReference::parse("E2E Test:", "org/fallback");
        assert_eq!(trailing.label, "E2E Test");
        assert_eq!(trailing.target, "org/fallback");
    }

    #[test]
    fn test_job_id_is_label_slug_not_stage_name() {
        let ctx = make_ctx(
            r#"
environments:
  dev: develop
downstream:
  dev: "E2E Test:org/other-repo"
"#,
        );
        let reference = TargetReference::parse("E2E Test:org/other-repo", "d");
        assert_eq!(reference.job_id(&ctx, "dev"), "e2e-test");
    }

    #[test]
    fn test_downstream_render_uses_applicable_predecessor() {
        let provider = make_downstream();
        let caps = CapabilitySnapshot::new().with_source_code().with_unit_tests();
        let ctx = make_ctx(
            r#"
environments:
  dev: develop
downstream:
  dev: "E2E Test:org/other-repo"
"#,
        );

        let body = provider.render(&caps, &ctx).unwrap().unwrap();
        assert!(body.contains("  e2e-test:"));
        assert!(body.contains("E2E Test"));
        assert!(body.contains("org/other-repo"));
        assert!(body.contains("needs: [unit-test]"));
    }

    #[test]
    fn test_downstream_inapplicable_without_matching_stage() {
        let provider = make_downstream();
        let caps = CapabilitySnapshot::new().with_source_code();
        let ctx = make_ctx("environments:\n  dev: develop\n");

        assert!(!provider.is_applicable(&caps, &ctx));
    }

    #[test]
    fn test_downstream_fan_out_qualifies_label_slug() {
        let provider = make_downstream();
        let caps = CapabilitySnapshot::new().with_source_code();
        let ctx = make_ctx(
            r#"
environments:
  stage: release/*
  qa: release/*
downstream:
  qa: "Smoke Check"
"#,
        );

        let body = provider.render(&caps, &ctx).unwrap().unwrap();
        assert!(body.contains("  smoke-check-qa:"));
        assert!(body.contains("[QA] Smoke Check"));
        // only the qa stage declared a target
        assert!(!body.contains("smoke-check-stage"));
    }

    #[test]
    fn test_notification_uses_default_channel() {
        let store: SharedTemplateStore = Arc::new(EmbeddedTemplateStore::new());
        let provider = NotificationProvider::new(store, vec![]);
        let caps = CapabilitySnapshot::new();
        let ctx = make_ctx(
            r#"
environments:
  dev: develop
notifications:
  dev: "Deploy Notice"
"#,
        );

        let body = provider.render(&caps, &ctx).unwrap().unwrap();
        assert!(body.contains("  deploy-notice:"));
        assert!(body.contains("deployments"));
    }
}
