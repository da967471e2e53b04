//! The capability snapshot: a read-only fact base about an inspected project.
//!
//! A snapshot is created once per run, before composition starts, and is
//! never mutated afterwards. Providers query it freely; the engine never
//! re-derives any of these facts itself.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Immutable facts about a project's on-disk characteristics.
///
/// Boolean fields answer presence questions ("is there a Dockerfile?");
/// the `properties` map carries named string facts such as tool versions
/// or analysis tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CapabilitySnapshot {
    /// Project contains a compilable source tree
    pub has_source_code: bool,
    /// Project contains a unit test suite
    pub has_unit_tests: bool,
    /// Project contains an integration test suite
    pub has_integration_tests: bool,
    /// Project contains performance/load tests
    pub has_performance_tests: bool,
    /// A Dockerfile is present
    pub has_dockerfile: bool,
    /// A Helm chart directory is present
    pub has_helm_chart: bool,
    /// Liquibase changelogs are present
    pub uses_liquibase: bool,
    /// Flyway migration scripts are present
    pub uses_flyway: bool,
    /// Static-analysis (sonar) configuration is present
    pub has_sonar_config: bool,
    /// Repository holds a deployable microservice
    pub is_microservice_repo: bool,
    /// Repository holds a published library
    pub is_library_repo: bool,
    /// Repository only carries deployment descriptors
    pub is_deployment_repo: bool,
    /// Repository is a Node.js project
    pub is_node_project: bool,
    /// Repository holds infrastructure-as-code
    pub is_infrastructure_project: bool,

    /// Named string facts (tool versions, tokens, channels)
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub properties: IndexMap<String, String>,
}

impl CapabilitySnapshot {
    /// Create an empty snapshot (no capabilities, no properties).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a named property, falling back to `default` when absent.
    #[must_use]
    pub fn property(&self, name: &str, default: &str) -> String {
        self.properties
            .get(name)
            .cloned()
            .unwrap_or_else(|| default.to_string())
    }

    /// True when some build job can run at all.
    #[must_use]
    pub fn has_buildable_code(&self) -> bool {
        self.has_source_code || self.is_node_project
    }

    /// Set a named property.
    #[must_use]
    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    /// Mark the project as having a source tree.
    #[must_use]
    pub const fn with_source_code(mut self) -> Self {
        self.has_source_code = true;
        self
    }

    /// Mark the project as having unit tests.
    #[must_use]
    pub const fn with_unit_tests(mut self) -> Self {
        self.has_unit_tests = true;
        self
    }

    /// Mark the project as having integration tests.
    #[must_use]
    pub const fn with_integration_tests(mut self) -> Self {
        self.has_integration_tests = true;
        self
    }

    /// Mark the project as having performance tests.
    #[must_use]
    pub const fn with_performance_tests(mut self) -> Self {
        self.has_performance_tests = true;
        self
    }

    /// Mark the project as having a Dockerfile.
    #[must_use]
    pub const fn with_dockerfile(mut self) -> Self {
        self.has_dockerfile = true;
        self
    }

    /// Mark the project as having a Helm chart.
    #[must_use]
    pub const fn with_helm_chart(mut self) -> Self {
        self.has_helm_chart = true;
        self
    }

    /// Mark the project as using Liquibase.
    #[must_use]
    pub const fn with_liquibase(mut self) -> Self {
        self.uses_liquibase = true;
        self
    }

    /// Mark the project as using Flyway.
    #[must_use]
    pub const fn with_flyway(mut self) -> Self {
        self.uses_flyway = true;
        self
    }

    /// Mark the project as having sonar configuration.
    #[must_use]
    pub const fn with_sonar_config(mut self) -> Self {
        self.has_sonar_config = true;
        self
    }

    /// Mark the repository as a microservice repo.
    #[must_use]
    pub const fn as_microservice(mut self) -> Self {
        self.is_microservice_repo = true;
        self
    }

    /// Mark the repository as a library repo.
    #[must_use]
    pub const fn as_library(mut self) -> Self {
        self.is_library_repo = true;
        self
    }

    /// Mark the repository as a deployment-descriptor-only repo.
    #[must_use]
    pub const fn as_deployment_repo(mut self) -> Self {
        self.is_deployment_repo = true;
        self
    }

    /// Mark the repository as a Node.js project.
    #[must_use]
    pub const fn as_node_project(mut self) -> Self {
        self.is_node_project = true;
        self
    }

    /// Mark the repository as an infrastructure project.
    #[must_use]
    pub const fn as_infrastructure(mut self) -> Self {
        self.is_infrastructure_project = true;
        self
    }
}
