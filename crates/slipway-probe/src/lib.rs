//! Filesystem probe: inspects a project tree once and derives the
//! capability snapshot the composition engine consumes.
//!
//! Every fact is read here, up front; nothing downstream touches the
//! filesystem again. Detection is by well-known paths plus an optional
//! `pipeline.properties` file for facts a directory listing cannot carry
//! (project version, toolchain versions, repository kind overrides).

use slipway_core::{CapabilitySnapshot, Result};
use std::path::Path;
use tracing::debug;

/// Name of the optional properties file read from the project root.
pub const PROPERTIES_FILE: &str = "pipeline.properties";

/// Property that force-classifies the repository kind.
///
/// Accepted values: `microservice`, `library`, `deployment`,
/// `infrastructure`. Absent, the kind is derived from the tree layout.
pub const REPO_KIND_PROPERTY: &str = "repo-kind";

/// Inspect `root` and build the capability snapshot.
///
/// # Errors
/// Fails when the properties file exists but cannot be read.
pub fn probe(root: &Path) -> Result<CapabilitySnapshot> {
    let has = |relative: &str| root.join(relative).exists();

    let is_node_project = has("package.json");
    let has_source_code = has("pom.xml") || has("build.gradle") || has("build.gradle.kts");
    let has_dockerfile = has("Dockerfile");
    let has_helm_chart = has("helm/Chart.yaml") || has("Chart.yaml");

    let mut caps = CapabilitySnapshot::new();
    if has_source_code {
        caps = caps.with_source_code();
    }
    if is_node_project {
        caps = caps.as_node_project();
    }
    if has("src/test") {
        caps = caps.with_unit_tests();
    }
    if has("src/integration-test") {
        caps = caps.with_integration_tests();
    }
    if has("src/performance-test") {
        caps = caps.with_performance_tests();
    }
    if has_dockerfile {
        caps = caps.with_dockerfile();
    }
    if has_helm_chart {
        caps = caps.with_helm_chart();
    }
    if has("src/main/resources/db/changelog") || has("liquibase.properties") {
        caps = caps.with_liquibase();
    }
    if has("src/main/resources/db/migration") || has("flyway.conf") {
        caps = caps.with_flyway();
    }
    if has("sonar-project.properties") {
        caps = caps.with_sonar_config();
    }

    caps = apply_repo_kind(
        caps,
        &derive_repo_kind(
            has_source_code,
            is_node_project,
            has_dockerfile,
            has_helm_chart,
            has("main.tf") || has("terraform"),
        ),
    );

    let properties_path = root.join(PROPERTIES_FILE);
    if properties_path.exists() {
        let text = std::fs::read_to_string(&properties_path)?;
        for (name, value) in parse_properties(&text) {
            if name == REPO_KIND_PROPERTY {
                caps = apply_repo_kind(caps, &value);
            } else {
                caps = caps.with_property(name, value);
            }
        }
    }

    if caps.property("project-version", "").is_empty()
        && let Some(version) = pom_version(root)
    {
        caps = caps.with_property("project-version", version);
    }

    debug!(root = %root.display(), "probe complete");
    Ok(caps)
}

fn derive_repo_kind(
    has_source_code: bool,
    is_node_project: bool,
    has_dockerfile: bool,
    has_helm_chart: bool,
    has_terraform: bool,
) -> String {
    if has_terraform {
        "infrastructure".to_string()
    } else if has_helm_chart && !has_source_code && !is_node_project && !has_dockerfile {
        "deployment".to_string()
    } else if has_dockerfile && has_helm_chart {
        "microservice".to_string()
    } else {
        String::new()
    }
}

fn apply_repo_kind(caps: CapabilitySnapshot, kind: &str) -> CapabilitySnapshot {
    match kind {
        "microservice" => caps.as_microservice(),
        "library" => caps.as_library(),
        "deployment" => caps.as_deployment_repo(),
        "infrastructure" => caps.as_infrastructure(),
        _ => caps,
    }
}

/// Parse `key=value` lines; `#` starts a comment, blank lines are skipped.
fn parse_properties(text: &str) -> Vec<(String, String)> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| {
            line.split_once('=')
                .map(|(name, value)| (name.trim().to_string(), value.trim().to_string()))
        })
        .collect()
}

/// Extract the project `<version>` value from `pom.xml`.
///
/// A `<parent>` block carries the parent's version, not the project's, so
/// the search starts after `</parent>` when one is present. Values
/// containing an unexpanded Maven property expression are skipped.
fn pom_version(root: &Path) -> Option<String> {
    let text = std::fs::read_to_string(root.join("pom.xml")).ok()?;
    let search_from = text
        .find("</parent>")
        .map_or(0, |index| index + "</parent>".len());
    let scope = &text[search_from..];
    let start = scope.find("<version>")? + "<version>".len();
    let end = scope[start..].find("</version>")? + start;
    let version = scope[start..end].trim();
    if version.is_empty() || version.contains("${") {
        None
    } else {
        Some(version.to_string())
    }
}
