//! The composition engine: drives providers in registration order and
//! assembles the `jobs:` body for one context.

use crate::context::PipelineContext;
use crate::provider::ProviderRegistry;
use slipway_core::{CapabilitySnapshot, Result};
use tracing::debug;

/// Composes job bodies from an ordered provider registry.
pub struct CompositionEngine {
    registry: ProviderRegistry,
}

impl CompositionEngine {
    /// Create an engine over a registry.
    #[must_use]
    pub fn new(registry: ProviderRegistry) -> Self {
        Self { registry }
    }

    /// Render every applicable provider for the context and join the
    /// non-empty bodies with one blank line.
    ///
    /// The result is empty when no provider applies.
    ///
    /// # Errors
    /// Propagates the first provider failure; composition is fail-fast.
    pub fn compose(&self, caps: &CapabilitySnapshot, ctx: &PipelineContext) -> Result<String> {
        let mut blocks = Vec::new();
        for provider in self.registry.iter() {
            match provider.render(caps, ctx)? {
                Some(body) if !body.trim().is_empty() => {
                    debug!(
                        provider = provider.default_name(),
                        branch = %ctx.branch.branch_pattern,
                        "provider contributed"
                    );
                    blocks.push(body.trim_end().to_string());
                }
                Some(_) | None => {
                    debug!(
                        provider = provider.default_name(),
                        branch = %ctx.branch.branch_pattern,
                        "provider skipped"
                    );
                }
            }
        }
        Ok(blocks.join("\n\n"))
    }
}
