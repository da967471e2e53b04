//! Per-document composition context.
//!
//! An invocation groups the configured environment stages by branch pattern
//! into [`BranchDescriptor`] values, one per output document, and wraps each
//! descriptor together with the run-wide configuration into a read-only
//! [`PipelineContext`] that every provider call receives.

use indexmap::IndexMap;
use slipway_core::GeneratorConfig;
use slipway_core::config::STAGELESS;

/// The grouping of stage names that share one branch-trigger pattern.
///
/// One descriptor produces one pipeline document. `stage_names` preserves
/// configuration declaration order and is empty only for patterns declared
/// under the stage-less `"none"` name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchDescriptor {
    /// Normalized branch name (alphanumeric only), used in file and
    /// document names.
    pub branch_name: String,
    /// The raw branch pattern, possibly containing a glob.
    pub branch_pattern: String,
    /// Stage names triggered by this pattern, in declaration order.
    pub stage_names: Vec<String>,
}

impl BranchDescriptor {
    /// Group the configured environment stages by branch pattern.
    ///
    /// Pattern order follows first appearance in the configuration; within
    /// a pattern, stage names keep declaration order. The `"none"` stage
    /// contributes its pattern without any stage name.
    #[must_use]
    pub fn group(config: &GeneratorConfig) -> Vec<Self> {
        let mut by_pattern: IndexMap<String, Vec<String>> = IndexMap::new();
        for (stage, pattern) in config.stage_patterns() {
            let stages = by_pattern.entry(pattern).or_default();
            // a stage listed twice for one pattern must not fan out twice
            if stage != STAGELESS && !stages.iter().any(|s| s == stage) {
                stages.push(stage.to_string());
            }
        }

        by_pattern
            .into_iter()
            .map(|(pattern, stage_names)| Self {
                branch_name: normalize_branch_name(&pattern),
                branch_pattern: pattern,
                stage_names,
            })
            .collect()
    }

    /// True when more than one stage shares this pattern and providers
    /// must fan out.
    #[must_use]
    pub fn is_fan_out(&self) -> bool {
        self.stage_names.len() > 1
    }
}

/// Normalize a branch pattern into a name usable in identifiers and file
/// names: lowercase, alphanumeric characters only.
#[must_use]
pub fn normalize_branch_name(pattern: &str) -> String {
    pattern
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .collect::<String>()
        .to_lowercase()
}

/// Immutable global template variables, built once per run and passed down.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlobalVariables(IndexMap<String, String>);

impl GlobalVariables {
    /// Build the variable set from an ordered map.
    #[must_use]
    pub fn new(variables: IndexMap<String, String>) -> Self {
        Self(variables)
    }

    /// True when no variables are declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate `(name, value)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// The unit of work passed into every provider call.
///
/// Read-only during composition; one context exists per branch descriptor
/// (or per (branch, stage) pair when duplicate branch names force document
/// splitting).
#[derive(Debug, Clone)]
pub struct PipelineContext {
    /// The branch descriptor this document is generated for.
    pub branch: BranchDescriptor,
    /// Downstream workflow targets keyed by stage name.
    pub downstream: IndexMap<String, String>,
    /// Notification targets keyed by stage name.
    pub notifications: IndexMap<String, String>,
    /// Global template variables.
    pub variables: GlobalVariables,
    /// Runner labels for the `runs-on` clause.
    pub runtime_pool: Vec<String>,
    /// Target for downstream references without an explicit target segment.
    pub default_downstream_target: String,
    /// Channel for notification references without an explicit target segment.
    pub default_notification_channel: String,
}

impl PipelineContext {
    /// Build the context for one branch descriptor from the run
    /// configuration.
    #[must_use]
    pub fn new(config: &GeneratorConfig, branch: BranchDescriptor) -> Self {
        Self {
            branch,
            downstream: config.downstream.clone(),
            notifications: config.notifications.clone(),
            variables: GlobalVariables::new(config.variables.clone()),
            runtime_pool: config.runtime_pool.clone(),
            default_downstream_target: config
                .default_downstream_target
                .clone()
                .unwrap_or_else(|| "${{ github.repository }}".to_string()),
            default_notification_channel: config
                .default_notification_channel
                .clone()
                .unwrap_or_else(|| "deployments".to_string()),
        }
    }

    /// Derive a single-stage context from this one, used when duplicate
    /// branch names force one document per (branch, stage) pair.
    #[must_use]
    pub fn for_single_stage(&self, stage: &str) -> Self {
        let mut ctx = self.clone();
        ctx.branch.stage_names = vec![stage.to_string()];
        ctx
    }

    /// The `runs-on` clause for every job in this document.
    #[must_use]
    pub fn runs_on(&self) -> String {
        if self.runtime_pool.is_empty() {
            "ubuntu-latest".to_string()
        } else {
            format!("[{}]", self.runtime_pool.join(", "))
        }
    }

    /// True when providers must fan out over several stage names.
    #[must_use]
    pub fn is_fan_out(&self) -> bool {
        self.branch.is_fan_out()
    }
}
