//! Deployment family: rollout, infrastructure and rollback jobs.

use super::migration::{FlywayMigrateProvider, LiquibaseChangelogProvider};
use super::packaging::PromoteProvider;
use super::versioning::VersioningProvider;
use super::{render_fan_out, render_single};
use crate::context::PipelineContext;
use crate::provider::StageProvider;
use crate::template::SharedTemplateStore;
use slipway_core::{CapabilitySnapshot, Error, Result};
use std::sync::Arc;

/// Applies infrastructure-as-code changes before any rollout.
pub struct InfrastructureApplyProvider {
    store: SharedTemplateStore,
}

impl InfrastructureApplyProvider {
    /// Create the provider.
    #[must_use]
    pub fn new(store: SharedTemplateStore) -> Self {
        Self { store }
    }
}

impl StageProvider for InfrastructureApplyProvider {
    fn default_name(&self) -> &'static str {
        "infrastructure-apply"
    }

    fn is_applicable(&self, caps: &CapabilitySnapshot, _ctx: &PipelineContext) -> bool {
        caps.is_infrastructure_project
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
            "Infrastructure Apply",
            ctx,
            &[],
            &[],
        )
        .map(Some)
    }
}

/// Rolls the packaged artifact out to each target stage.
///
/// Per stage, the rollout waits for that stage's qualified promotion job
/// (strictly required when an image is built) and for any database
/// migration jobs of the same stage — never for another stage's jobs.
pub struct DeploymentProvider {
    store: SharedTemplateStore,
    promote: Arc<PromoteProvider>,
    db_changelog: Arc<LiquibaseChangelogProvider>,
    db_migrate: Arc<FlywayMigrateProvider>,
}

impl DeploymentProvider {
    /// Create the provider.
    #[must_use]
    pub fn new(
        store: SharedTemplateStore,
        promote: Arc<PromoteProvider>,
        db_changelog: Arc<LiquibaseChangelogProvider>,
        db_migrate: Arc<FlywayMigrateProvider>,
    ) -> Self {
        Self {
            store,
            promote,
            db_changelog,
            db_migrate,
        }
    }
}

impl StageProvider for DeploymentProvider {
    fn default_name(&self) -> &'static str {
        "deployment"
    }

    fn is_applicable(&self, caps: &CapabilitySnapshot, ctx: &PipelineContext) -> bool {
        !ctx.branch.stage_names.is_empty() && (caps.has_dockerfile || caps.is_deployment_repo)
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
        let name = self.default_name();
        let version = VersioningProvider::version(caps, ctx);
        render_fan_out(&self.store, name, "Deployment", ctx, |stage| {
            let mut needs = Vec::new();
            if caps.has_dockerfile {
                let promote_ids = self.promote.job_identifiers(ctx, stage);
                if promote_ids.is_empty() || !self.promote.is_applicable(caps, ctx) {
                    return Err(Error::missing_collaborator(name, stage));
                }
                needs.extend(promote_ids);
            }
            if self.db_changelog.is_applicable(caps, ctx) {
                needs.extend(self.db_changelog.job_identifiers(ctx, stage));
            }
            if self.db_migrate.is_applicable(caps, ctx) {
                needs.extend(self.db_migrate.job_identifiers(ctx, stage));
            }
            Ok((needs, vec![("VERSION", version.clone())]))
        })
        .map(Some)
    }
}

/// Manual rollback job per deployed stage.
pub struct RollbackProvider {
    store: SharedTemplateStore,
    deployment: Arc<DeploymentProvider>,
}

impl RollbackProvider {
    /// Create the provider.
    #[must_use]
    pub fn new(store: SharedTemplateStore, deployment: Arc<DeploymentProvider>) -> Self {
        Self { store, deployment }
    }
}

impl StageProvider for RollbackProvider {
    fn default_name(&self) -> &'static str {
        "rollback"
    }

    fn is_applicable(&self, caps: &CapabilitySnapshot, ctx: &PipelineContext) -> bool {
        self.deployment.is_applicable(caps, ctx)
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
        let name = self.default_name();
        render_fan_out(&self.store, name, "Rollback", ctx, |stage| {
            let needs = self.deployment.job_identifiers(ctx, stage);
            if needs.is_empty() {
                return Err(Error::missing_collaborator(name, stage));
            }
            Ok((needs, vec![]))
        })
        .map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::BranchDescriptor;
    use crate::providers::{CompileProvider, PackageProvider, VersioningProvider};
    use crate::template::EmbeddedTemplateStore;
    use slipway_core::GeneratorConfig;

    fn make_ctx(yaml: &str) -> PipelineContext {
        let config = GeneratorConfig::from_yaml(yaml).unwrap();
        PipelineContext::new(&config, BranchDescriptor::group(&config).remove(0))
    }

    fn make_deployment() -> DeploymentProvider {
        let store: SharedTemplateStore = Arc::new(EmbeddedTemplateStore::new());
        let versioning = Arc::new(VersioningProvider::new(store.clone()));
        let compile = Arc::new(CompileProvider::new(store.clone(), versioning));
        let package = Arc::new(PackageProvider::new(store.clone(), vec![compile]));
        let promote = Arc::new(PromoteProvider::new(store.clone(), package));
        DeploymentProvider::new(
            store.clone(),
            promote,
            Arc::new(LiquibaseChangelogProvider::new(store.clone())),
            Arc::new(FlywayMigrateProvider::new(store)),
        )
    }

    #[test]
    fn test_deployment_fans_out_needing_qualified_promote() {
        let provider = make_deployment();
        let caps = CapabilitySnapshot::new().with_dockerfile();
        let ctx = make_ctx("environments:\n  stage: release/*\n  qa: release/*\n");

        let body = provider.render(&caps, &ctx).unwrap().unwrap();
        assert!(body.contains("  deployment-stage:"));
        assert!(body.contains("  deployment-qa:"));
        assert!(body.contains("needs: [promote-stage]"));
        assert!(body.contains("needs: [promote-qa]"));
    }

    #[test]
    fn test_deployment_includes_same_stage_migrations() {
        let provider = make_deployment();
        let caps = CapabilitySnapshot::new().with_dockerfile().with_liquibase();
        let ctx = make_ctx("environments:\n  stage: release/*\n  qa: release/*\n");

        let body = provider.render(&caps, &ctx).unwrap().unwrap();
        assert!(body.contains("needs: [promote-qa, db-changelog-qa]"));
        assert!(!body.contains("needs: [promote-qa, db-changelog-stage]"));
    }

    #[test]
    fn test_deployment_repo_without_image_has_no_promote_edge() {
        let provider = make_deployment();
        let caps = CapabilitySnapshot::new().as_deployment_repo();
        let ctx = make_ctx("environments:\n  dev: develop\n");

        let body = provider.render(&caps, &ctx).unwrap().unwrap();
        assert!(body.contains("  deployment:"));
        assert!(!body.contains("needs:"));
    }

    #[test]
    fn test_deployment_inapplicable_without_image_or_descriptor_repo() {
        let provider = make_deployment();
        let caps = CapabilitySnapshot::new().with_source_code();
        let ctx = make_ctx("environments:\n  dev: develop\n");

        assert!(!provider.is_applicable(&caps, &ctx));
    }

    #[test]
    fn test_deployment_carries_policy_version() {
        let provider = make_deployment();
        let caps = CapabilitySnapshot::new()
            .with_dockerfile()
            .with_property("project-version", "2.3.0-SNAPSHOT");
        let ctx = make_ctx("environments:\n  qa: release/*\n");

        assert_eq!(VersioningProvider::version(&caps, &ctx), "2.3.0-RC");
        let body = provider.render(&caps, &ctx).unwrap().unwrap();
        assert!(body.contains("image.tag=2.3.0-RC"));
    }

    #[test]
    fn test_rollback_needs_deployment() {
        let store: SharedTemplateStore = Arc::new(EmbeddedTemplateStore::new());
        let provider = RollbackProvider::new(store, Arc::new(make_deployment()));
        let caps = CapabilitySnapshot::new().with_dockerfile();
        let ctx = make_ctx("environments:\n  dev: develop\n");

        let body = provider.render(&caps, &ctx).unwrap().unwrap();
        assert!(body.contains("  rollback:"));
        assert!(body.contains("needs: [deployment]"));
    }
}
