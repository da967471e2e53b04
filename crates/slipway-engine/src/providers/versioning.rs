//! Versioning provider.
//!
//! Emits the job that records the build version. The emitted version is a
//! pure function of the branch kind and the raw project version (see
//! [`crate::version`]).

use super::render_single;
use crate::context::PipelineContext;
use crate::provider::StageProvider;
use crate::template::SharedTemplateStore;
use crate::version::{BranchKind, emitted_version};
use slipway_core::{CapabilitySnapshot, Result};

/// Property holding the raw project version.
pub const PROJECT_VERSION_PROPERTY: &str = "project-version";

/// Records the computed build version for every later job.
pub struct VersioningProvider {
    store: SharedTemplateStore,
}

impl VersioningProvider {
    /// Create the provider.
    #[must_use]
    pub fn new(store: SharedTemplateStore) -> Self {
        Self { store }
    }

    /// The version string this run will emit.
    #[must_use]
    pub fn version(caps: &CapabilitySnapshot, ctx: &PipelineContext) -> String {
        let raw = caps.property(PROJECT_VERSION_PROPERTY, "0.1.0-SNAPSHOT");
        emitted_version(BranchKind::from_pattern(&ctx.branch.branch_pattern), &raw)
    }
}

impl StageProvider for VersioningProvider {
    fn default_name(&self) -> &'static str {
        "versioning"
    }

    fn is_applicable(&self, caps: &CapabilitySnapshot, _ctx: &PipelineContext) -> bool {
        caps.has_buildable_code()
    }

    fn job_identifiers(&self, _ctx: &PipelineContext, _stage: &str) -> Vec<String> {
        vec![self.default_name().to_string()]
    }

    fn render(&self, caps: &CapabilitySnapshot, ctx: &PipelineContext) -> Result<Option<String>> {
        if !self.is_applicable(caps, ctx) {
            return Ok(None);
        }
        let version = Self::version(caps, ctx);
        render_single(
            &self.store,
            self.default_name(),
            "Versioning",
            ctx,
            &[],
            &[("VERSION", version)],
        )
        .map(Some)
    }
}
