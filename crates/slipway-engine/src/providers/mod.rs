//! The built-in stage providers, grouped by family.
//!
//! [`default_registry`] wires every provider with its collaborators by
//! direct reference and registers them in the fixed composition order. Any
//! provider that resolves another provider's job ids appears strictly after
//! it in this list; that ordering is the acyclicity guarantee.

mod analysis;
mod build;
mod deployment;
mod integration;
mod migration;
mod packaging;
mod versioning;

pub use analysis::SonarScanProvider;
pub use build::{CompileProvider, NodeBuildProvider};
pub use deployment::{DeploymentProvider, InfrastructureApplyProvider, RollbackProvider};
pub use integration::{DownstreamTriggerProvider, NotificationProvider, TargetReference};
pub use migration::{FlywayMigrateProvider, LiquibaseChangelogProvider};
pub use packaging::{PackageProvider, PromoteProvider, PublishLibraryProvider};
pub use test::{IntegrationTestProvider, PerformanceTestProvider, UnitTestProvider};
pub use versioning::VersioningProvider;

use crate::context::PipelineContext;
use crate::provider::{
    ProviderRegistry, StageProvider, display_name, needs_clause, qualified_job_id,
};
use crate::template::SharedTemplateStore;
use slipway_core::Result;
use std::sync::Arc;

/// Build the default provider registry.
///
/// Collaborators are injected here, once, by constructor; nothing is
/// resolved at render time.
#[must_use]
pub fn default_registry(store: &SharedTemplateStore) -> ProviderRegistry {
    let versioning = Arc::new(VersioningProvider::new(store.clone()));
    let compile = Arc::new(CompileProvider::new(store.clone(), versioning.clone()));
    let node_build = Arc::new(NodeBuildProvider::new(store.clone(), versioning.clone()));
    let unit_test = Arc::new(UnitTestProvider::new(store.clone(), compile.clone()));
    let integration_test = Arc::new(IntegrationTestProvider::new(store.clone(), compile.clone()));
    let sonar_scan = Arc::new(SonarScanProvider::new(
        store.clone(),
        compile.clone(),
        unit_test.clone(),
    ));
    let publish_library = Arc::new(PublishLibraryProvider::new(
        store.clone(),
        compile.clone(),
        vec![compile.clone(), unit_test.clone(), integration_test.clone()],
    ));
    let package = Arc::new(PackageProvider::new(
        store.clone(),
        vec![
            compile.clone(),
            node_build.clone(),
            unit_test.clone(),
            integration_test.clone(),
        ],
    ));
    let promote = Arc::new(PromoteProvider::new(store.clone(), package.clone()));
    let db_changelog = Arc::new(LiquibaseChangelogProvider::new(store.clone()));
    let db_migrate = Arc::new(FlywayMigrateProvider::new(store.clone()));
    let infrastructure = Arc::new(InfrastructureApplyProvider::new(store.clone()));
    let deployment = Arc::new(DeploymentProvider::new(
        store.clone(),
        promote.clone(),
        db_changelog.clone(),
        db_migrate.clone(),
    ));
    let performance_test = Arc::new(PerformanceTestProvider::new(
        store.clone(),
        deployment.clone(),
    ));
    let rollback = Arc::new(RollbackProvider::new(store.clone(), deployment.clone()));

    let terminal_candidates: Vec<Arc<dyn StageProvider>> = vec![
        compile.clone(),
        node_build.clone(),
        unit_test.clone(),
        integration_test.clone(),
        deployment.clone(),
    ];
    let downstream = Arc::new(DownstreamTriggerProvider::new(
        store.clone(),
        terminal_candidates.clone(),
    ));
    let notify = Arc::new(NotificationProvider::new(
        store.clone(),
        terminal_candidates,
    ));

    let mut registry = ProviderRegistry::new();
    registry.register(versioning);
    registry.register(compile);
    registry.register(node_build);
    registry.register(unit_test);
    registry.register(integration_test);
    registry.register(sonar_scan);
    registry.register(publish_library);
    registry.register(package);
    registry.register(promote);
    registry.register(db_changelog);
    registry.register(db_migrate);
    registry.register(infrastructure);
    registry.register(deployment);
    registry.register(performance_test);
    registry.register(rollback);
    registry.register(downstream);
    registry.register(notify);
    registry
}

/// Render a single (non-fanning) job body.
pub(crate) fn render_single(
    store: &SharedTemplateStore,
    key: &'static str,
    label: &str,
    ctx: &PipelineContext,
    needs: &[String],
    extra: &[(&str, String)],
) -> Result<String> {
    let body = store.load(key)?;
    let mut values: Vec<(&str, String)> = vec![
        ("JOB_ID", key.to_string()),
        ("JOB_NAME", label.to_string()),
        ("RUNS_ON", ctx.runs_on()),
        ("NEEDS", needs_clause(needs)),
    ];
    values.extend(extra.iter().map(|(t, v)| (*t, v.clone())));
    Ok(crate::template::substitute(key, &body, &values)?
        .trim_end()
        .to_string())
}

/// Render one job body per stage name and join the blocks with a blank
/// line. `per_stage` supplies the needs ids and extra tokens for a stage.
pub(crate) fn render_fan_out<F>(
    store: &SharedTemplateStore,
    key: &'static str,
    label: &str,
    ctx: &PipelineContext,
    mut per_stage: F,
) -> Result<String>
where
    F: FnMut(&str) -> Result<(Vec<String>, Vec<(&'static str, String)>)>,
{
    let body = store.load(key)?;
    let mut blocks = Vec::new();
    for stage in &ctx.branch.stage_names {
        let (needs, extra) = per_stage(stage)?;
        let mut values: Vec<(&str, String)> = vec![
            ("JOB_ID", qualified_job_id(key, ctx, stage)),
            ("JOB_NAME", display_name(label, ctx, stage)),
            ("RUNS_ON", ctx.runs_on()),
            ("NEEDS", needs_clause(&needs)),
            ("STAGE_NAME", stage.clone()),
        ];
        values.extend(extra.iter().map(|(t, v)| (*t, v.clone())));
        blocks.push(
            crate::template::substitute(key, &body, &values)?
                .trim_end()
                .to_string(),
        );
    }
    Ok(blocks.join("\n\n"))
}
