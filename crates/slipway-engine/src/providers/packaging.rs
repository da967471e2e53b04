//! Packaging family: image build, per-stage promotion, library publishing.

use super::build::CompileProvider;
use super::versioning::VersioningProvider;
use super::{render_fan_out, render_single};
use crate::context::PipelineContext;
use crate::provider::{StageProvider, latest_applicable_ids};
use crate::template::SharedTemplateStore;
use slipway_core::{CapabilitySnapshot, Error, Result};
use std::sync::Arc;

/// Builds the container image.
///
/// Collapse rule: the image build is shared physical infrastructure, so the
/// job id stays unqualified even when several stages share the branch
/// pattern — one docker build serves all of them.
pub struct PackageProvider {
    store: SharedTemplateStore,
    build_candidates: Vec<Arc<dyn StageProvider>>,
}

impl PackageProvider {
    /// Create the provider. `build_candidates` are earlier-registered
    /// build/test providers, in registration order; the latest applicable
    /// one becomes the `needs` predecessor.
    #[must_use]
    pub fn new(store: SharedTemplateStore, build_candidates: Vec<Arc<dyn StageProvider>>) -> Self {
        Self {
            store,
            build_candidates,
        }
    }
}

impl StageProvider for PackageProvider {
    fn default_name(&self) -> &'static str {
        "package"
    }

    fn is_applicable(&self, caps: &CapabilitySnapshot, _ctx: &PipelineContext) -> bool {
        caps.has_dockerfile
    }

    fn job_identifiers(&self, _ctx: &PipelineContext, _stage: &str) -> Vec<String> {
        // Shared job: same unqualified id for every stage.
        vec![self.default_name().to_string()]
    }

    fn render(&self, caps: &CapabilitySnapshot, ctx: &PipelineContext) -> Result<Option<String>> {
        if !self.is_applicable(caps, ctx) {
            return Ok(None);
        }
        let needs = latest_applicable_ids(&self.build_candidates, caps, ctx, "");
        let version = VersioningProvider::version(caps, ctx);
        render_single(
            &self.store,
            self.default_name(),
            "Package",
            ctx,
            &needs,
            &[("VERSION", version)],
        )
        .map(Some)
    }
}

/// Promotes the built image into a stage-specific registry namespace.
pub struct PromoteProvider {
    store: SharedTemplateStore,
    package: Arc<PackageProvider>,
}

impl PromoteProvider {
    /// Create the provider.
    #[must_use]
    pub fn new(store: SharedTemplateStore, package: Arc<PackageProvider>) -> Self {
        Self { store, package }
    }
}

impl StageProvider for PromoteProvider {
    fn default_name(&self) -> &'static str {
        "promote"
    }

    fn is_applicable(&self, caps: &CapabilitySnapshot, ctx: &PipelineContext) -> bool {
        caps.has_dockerfile && !ctx.branch.stage_names.is_empty()
    }

    fn job_identifiers(&self, ctx: &PipelineContext, stage: &str) -> Vec<String> {
        vec![crate::provider::qualified_job_id(
            self.default_name(),
            ctx,
            stage,
        )]
    }

    fn render(&self, caps: &CapabilitySnapshot, ctx: &PipelineContext) -> Result<Option<String>> {
        if !self.is_applicable(caps, ctx) {
            return Ok(None);
        }
        let package = &self.package;
        let name = self.default_name();
        let version = VersioningProvider::version(caps, ctx);
        render_fan_out(&self.store, name, "Promote Image", ctx, |stage| {
            let needs = package.job_identifiers(ctx, stage);
            if needs.is_empty() {
                return Err(Error::missing_collaborator(name, stage));
            }
            Ok((needs, vec![("VERSION", version.clone())]))
        })
        .map(Some)
    }
}

/// Publishes a library artifact to the package repository.
pub struct PublishLibraryProvider {
    store: SharedTemplateStore,
    compile: Arc<CompileProvider>,
    verify_candidates: Vec<Arc<dyn StageProvider>>,
}

impl PublishLibraryProvider {
    /// Create the provider. `verify_candidates` are the build/test
    /// providers publishing must wait for, in registration order.
    #[must_use]
    pub fn new(
        store: SharedTemplateStore,
        compile: Arc<CompileProvider>,
        verify_candidates: Vec<Arc<dyn StageProvider>>,
    ) -> Self {
        Self {
            store,
            compile,
            verify_candidates,
        }
    }
}

impl StageProvider for PublishLibraryProvider {
    fn default_name(&self) -> &'static str {
        "publish-library"
    }

    fn is_applicable(&self, caps: &CapabilitySnapshot, ctx: &PipelineContext) -> bool {
        caps.is_library_repo && self.compile.is_applicable(caps, ctx)
    }

    fn job_identifiers(&self, _ctx: &PipelineContext, _stage: &str) -> Vec<String> {
        vec![self.default_name().to_string()]
    }

    fn render(&self, caps: &CapabilitySnapshot, ctx: &PipelineContext) -> Result<Option<String>> {
        if !self.is_applicable(caps, ctx) {
            return Ok(None);
        }
        let needs = latest_applicable_ids(&self.verify_candidates, caps, ctx, "");
        let version = VersioningProvider::version(caps, ctx);
        render_single(
            &self.store,
            self.default_name(),
            "Publish Library",
            ctx,
            &needs,
            &[("VERSION", version)],
        )
        .map(Some)
    }
}
