//! Build family: compilation jobs for JVM and Node projects.

use super::render_single;
use super::versioning::VersioningProvider;
use crate::context::PipelineContext;
use crate::provider::StageProvider;
use crate::template::SharedTemplateStore;
use slipway_core::{CapabilitySnapshot, Result};
use std::sync::Arc;

/// Compiles a JVM source tree.
pub struct CompileProvider {
    store: SharedTemplateStore,
    versioning: Arc<VersioningProvider>,
}

impl CompileProvider {
    /// Create the provider.
    #[must_use]
    pub fn new(store: SharedTemplateStore, versioning: Arc<VersioningProvider>) -> Self {
        Self { store, versioning }
    }
}

impl StageProvider for CompileProvider {
    fn default_name(&self) -> &'static str {
        "compile"
    }

    fn is_applicable(&self, caps: &CapabilitySnapshot, _ctx: &PipelineContext) -> bool {
        caps.has_source_code && !caps.is_node_project && !caps.is_deployment_repo
    }

    fn job_identifiers(&self, _ctx: &PipelineContext, _stage: &str) -> Vec<String> {
        vec![self.default_name().to_string()]
    }

    fn render(&self, caps: &CapabilitySnapshot, ctx: &PipelineContext) -> Result<Option<String>> {
        if !self.is_applicable(caps, ctx) {
            return Ok(None);
        }
        render_single(
            &self.store,
            self.default_name(),
            "Compile",
            ctx,
            &self.versioning.job_identifiers(ctx, ""),
            &[("JAVA_VERSION", caps.property("java-version", "21"))],
        )
        .map(Some)
    }
}

/// Builds a Node project (install, build, test in one job).
pub struct NodeBuildProvider {
    store: SharedTemplateStore,
    versioning: Arc<VersioningProvider>,
}

impl NodeBuildProvider {
    /// Create the provider.
    #[must_use]
    pub fn new(store: SharedTemplateStore, versioning: Arc<VersioningProvider>) -> Self {
        Self { store, versioning }
    }
}

impl StageProvider for NodeBuildProvider {
    fn default_name(&self) -> &'static str {
        "node-build"
    }

    fn is_applicable(&self, caps: &CapabilitySnapshot, _ctx: &PipelineContext) -> bool {
        caps.is_node_project
    }

    fn job_identifiers(&self, _ctx: &PipelineContext, _stage: &str) -> Vec<String> {
        vec![self.default_name().to_string()]
    }

    fn render(&self, caps: &CapabilitySnapshot, ctx: &PipelineContext) -> Result<Option<String>> {
        if !self.is_applicable(caps, ctx) {
            return Ok(None);
        }
        render_single(
            &self.store,
            self.default_name(),
            "Node Build",
            ctx,
            &self.versioning.job_identifiers(ctx, ""),
            &[("NODE_VERSION", caps.property("node-version", "20"))],
        )
        .map(Some)
    }
}
