//! Static-analysis family.

use super::build::CompileProvider;
use super::render_single;
use super::test::UnitTestProvider;
use crate::context::PipelineContext;
use crate::provider::StageProvider;
use crate::template::SharedTemplateStore;
use slipway_core::{CapabilitySnapshot, Result};
use std::sync::Arc;

/// Runs the sonar scanner; scheduled after unit tests when those exist so
/// coverage data is available, otherwise directly after compilation.
pub struct SonarScanProvider {
    store: SharedTemplateStore,
    compile: Arc<CompileProvider>,
    unit_test: Arc<UnitTestProvider>,
}

impl SonarScanProvider {
    /// Create the provider.
    #[must_use]
    pub fn new(
        store: SharedTemplateStore,
        compile: Arc<CompileProvider>,
        unit_test: Arc<UnitTestProvider>,
    ) -> Self {
        Self {
            store,
            compile,
            unit_test,
        }
    }
}

impl StageProvider for SonarScanProvider {
    fn default_name(&self) -> &'static str {
        "sonar-scan"
    }

    fn is_applicable(&self, caps: &CapabilitySnapshot, ctx: &PipelineContext) -> bool {
        caps.has_sonar_config && self.compile.is_applicable(caps, ctx)
    }

    fn job_identifiers(&self, _ctx: &PipelineContext, _stage: &str) -> Vec<String> {
        vec![self.default_name().to_string()]
    }

    fn render(&self, caps: &CapabilitySnapshot, ctx: &PipelineContext) -> Result<Option<String>> {
        if !self.is_applicable(caps, ctx) {
            return Ok(None);
        }
        let needs = if self.unit_test.is_applicable(caps, ctx) {
            self.unit_test.job_identifiers(ctx, "")
        } else {
            self.compile.job_identifiers(ctx, "")
        };
        render_single(
            &self.store,
            self.default_name(),
            "Sonar Scan",
            ctx,
            &needs,
            &[(
                "SONAR_TOKEN",
                caps.property("sonar-token-secret", "SONAR_TOKEN"),
            )],
        )
        .map(Some)
    }
}
