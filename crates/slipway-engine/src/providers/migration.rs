//! Database migration family.

use super::render_fan_out;
use crate::context::PipelineContext;
use crate::provider::StageProvider;
use crate::template::SharedTemplateStore;
use slipway_core::{CapabilitySnapshot, Result};

/// Applies Liquibase changelogs, one job per target stage.
pub struct LiquibaseChangelogProvider {
    store: SharedTemplateStore,
}

impl LiquibaseChangelogProvider {
    /// Create the provider.
    #[must_use]
    pub fn new(store: SharedTemplateStore) -> Self {
        Self { store }
    }
}

impl StageProvider for LiquibaseChangelogProvider {
    fn default_name(&self) -> &'static str {
        "db-changelog"
    }

    fn is_applicable(&self, caps: &CapabilitySnapshot, ctx: &PipelineContext) -> bool {
        caps.uses_liquibase && !ctx.branch.stage_names.is_empty()
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
        render_fan_out(
            &self.store,
            self.default_name(),
            "Database Changelog",
            ctx,
            |_stage| Ok((vec![], vec![])),
        )
        .map(Some)
    }
}

/// Runs Flyway migrations, one job per target stage.
pub struct FlywayMigrateProvider {
    store: SharedTemplateStore,
}

impl FlywayMigrateProvider {
    /// Create the provider.
    #[must_use]
    pub fn new(store: SharedTemplateStore) -> Self {
        Self { store }
    }
}

impl StageProvider for FlywayMigrateProvider {
    fn default_name(&self) -> &'static str {
        "db-migrate"
    }

    fn is_applicable(&self, caps: &CapabilitySnapshot, ctx: &PipelineContext) -> bool {
        caps.uses_flyway && !ctx.branch.stage_names.is_empty()
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
        render_fan_out(
            &self.store,
            self.default_name(),
            "Database Migration",
            ctx,
            |_stage| Ok((vec![], vec![])),
        )
        .map(Some)
    }
}
