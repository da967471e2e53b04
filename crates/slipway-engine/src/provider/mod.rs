//! The stage provider contract and the ordered provider registry.
//!
//! A provider owns one conceptual job (or a small family of jobs). It
//! decides applicability for a context, contributes job identifiers, and
//! renders its body from a template. Providers may query collaborators that
//! were registered *before* them for job identifiers — this is the only
//! cross-provider read and it is always pure, which is what makes the
//! resulting `needs` graph acyclic without any cycle-detection pass.
//!
//! Collaborators are wired by constructor injection when the registry is
//! built (see [`crate::providers::default_registry`]); the registration
//! order is an explicit, inspectable list.

use crate::context::PipelineContext;
use slipway_core::{CapabilitySnapshot, Result};
use std::sync::Arc;

/// The rule unit of the composition engine.
///
/// All methods are pure and deterministic for a fixed capability snapshot
/// and context; two invocations must produce byte-identical output.
pub trait StageProvider: Send + Sync {
    /// Stable lower-kebab identifier; doubles as base job id and template
    /// key.
    fn default_name(&self) -> &'static str;

    /// Whether this provider contributes to the given context.
    ///
    /// Pure predicate: may consult collaborators' `is_applicable`, never
    /// their rendered output.
    fn is_applicable(&self, caps: &CapabilitySnapshot, ctx: &PipelineContext) -> bool;

    /// The job identifiers this provider contributes for one stage name.
    ///
    /// Empty when the provider does not apply to that stage. Providers that
    /// are stage-independent ignore `stage` and return the same ids for any
    /// argument. Downstream providers call this to build `needs` lists —
    /// always with the stage they are rendering for, never a different one.
    fn job_identifiers(&self, ctx: &PipelineContext, stage: &str) -> Vec<String>;

    /// Render the fully substituted job body, or `None` when inapplicable.
    ///
    /// # Errors
    /// Fails when a strictly required collaborator id cannot be resolved,
    /// or on template errors.
    fn render(&self, caps: &CapabilitySnapshot, ctx: &PipelineContext) -> Result<Option<String>>;
}

/// Ordered collection of stage providers.
///
/// Registration order is a total order chosen so that any provider that
/// references another provider's job ids is registered strictly after it.
#[derive(Default)]
pub struct ProviderRegistry {
    providers: Vec<Arc<dyn StageProvider>>,
}

impl ProviderRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a provider. Order of calls is the composition order.
    pub fn register(&mut self, provider: Arc<dyn StageProvider>) {
        self.providers.push(provider);
    }

    /// Iterate providers in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn StageProvider>> {
        self.providers.iter()
    }

    /// Number of registered providers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// True when no provider is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

/// Slug used to qualify job ids with a stage name: lowercase,
/// non-alphanumeric characters stripped.
#[must_use]
pub fn stage_slug(stage: &str) -> String {
    stage
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .collect::<String>()
        .to_lowercase()
}

/// Slug used for display-label-derived job ids: lowercase words joined by
/// single hyphens, repeated separators collapsed, empty segments dropped.
#[must_use]
pub fn label_slug(label: &str) -> String {
    label
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|segment| !segment.is_empty())
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

/// Qualify a base job id with a stage name when the context fans out over
/// several stages; single-stage contexts keep the unqualified base id.
#[must_use]
pub fn qualified_job_id(base: &str, ctx: &PipelineContext, stage: &str) -> String {
    if ctx.is_fan_out() {
        format!("{base}-{}", stage_slug(stage))
    } else {
        base.to_string()
    }
}

/// Qualify a display name with an uppercase bracketed stage prefix when the
/// context fans out; single-stage contexts keep the plain label.
#[must_use]
pub fn display_name(label: &str, ctx: &PipelineContext, stage: &str) -> String {
    if ctx.is_fan_out() {
        format!("[{}] {label}", stage.to_uppercase())
    } else {
        label.to_string()
    }
}

/// Render a `needs:` line for a job body, or an empty string when the job
/// has no predecessors. The value is a full line including indentation and
/// trailing newline so templates can carry a bare `%NEEDS%` token at line
/// start.
#[must_use]
pub fn needs_clause(ids: &[String]) -> String {
    if ids.is_empty() {
        String::new()
    } else {
        format!("    needs: [{}]\n", ids.join(", "))
    }
}

/// Resolve the ids of the latest-registered applicable candidate for a
/// stage.
///
/// Walks `candidates` (given in registration order) from the back and
/// returns the first non-empty id set. Empty when no candidate applies.
#[must_use]
pub fn latest_applicable_ids(
    candidates: &[Arc<dyn StageProvider>],
    caps: &CapabilitySnapshot,
    ctx: &PipelineContext,
    stage: &str,
) -> Vec<String> {
    for candidate in candidates.iter().rev() {
        if candidate.is_applicable(caps, ctx) {
            let ids = candidate.job_identifiers(ctx, stage);
            if !ids.is_empty() {
                return ids;
            }
        }
    }
    Vec::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::BranchDescriptor;
    use slipway_core::GeneratorConfig;

    fn make_ctx(yaml: &str) -> PipelineContext {
        let config = GeneratorConfig::from_yaml(yaml).unwrap();
        PipelineContext::new(&config, BranchDescriptor::group(&config).remove(0))
    }

    fn fan_out_ctx() -> PipelineContext {
        make_ctx("environments:\n  stage: release/*\n  qa: release/*\n")
    }

    fn single_ctx() -> PipelineContext {
        make_ctx("environments:\n  dev: develop\n")
    }

    #[test]
    fn test_stage_slug_strips_non_alphanumerics() {
        assert_eq!(stage_slug("QA"), "qa");
        assert_eq!(stage_slug("pre-prod"), "preprod");
        assert_eq!(stage_slug("eu_west_1"), "euwest1");
    }

    #[test]
    fn test_label_slug_collapses_separators() {
        assert_eq!(label_slug("E2E Test"), "e2e-test");
        assert_eq!(label_slug("E2E  --  Test"), "e2e-test");
        assert_eq!(label_slug("  smoke "), "smoke");
    }

    #[test]
    fn test_qualified_job_id_under_fan_out() {
        let ctx = fan_out_ctx();
        assert_eq!(qualified_job_id("deployment", &ctx, "qa"), "deployment-qa");
        assert_eq!(
            qualified_job_id("deployment", &ctx, "stage"),
            "deployment-stage"
        );
    }

    #[test]
    fn test_qualified_job_id_single_stage_collapse() {
        let ctx = single_ctx();
        assert_eq!(qualified_job_id("deployment", &ctx, "dev"), "deployment");
    }

    #[test]
    fn test_display_name_prefix_only_under_fan_out() {
        let fan = fan_out_ctx();
        assert_eq!(display_name("Deployment", &fan, "qa"), "[QA] Deployment");

        let single = single_ctx();
        assert_eq!(display_name("Deployment", &single, "dev"), "Deployment");
    }

    #[test]
    fn test_needs_clause() {
        assert_eq!(needs_clause(&[]), "");
        assert_eq!(
            needs_clause(&["compile".to_string(), "unit-test".to_string()]),
            "    needs: [compile, unit-test]\n"
        );
    }

    #[test]
    fn test_registry_preserves_order() {
        struct Named(&'static str);
        impl StageProvider for Named {
            fn default_name(&self) -> &'static str {
                self.0
            }
            fn is_applicable(&self, _: &CapabilitySnapshot, _: &PipelineContext) -> bool {
                true
            }
            fn job_identifiers(&self, _: &PipelineContext, _: &str) -> Vec<String> {
                vec![self.0.to_string()]
            }
            fn render(
                &self,
                _: &CapabilitySnapshot,
                _: &PipelineContext,
            ) -> Result<Option<String>> {
                Ok(None)
            }
        }

        let mut registry = ProviderRegistry::new();
        registry.register(Arc::new(Named("a")));
        registry.register(Arc::new(Named("b")));
        registry.register(Arc::new(Named("c")));

        let names: Vec<_> = registry.iter().map(|p| p.default_name()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
        assert_eq!(registry.len(), 3);
    }
}
