//! The generator configuration surface.
//!
//! Consumed, not produced, by the composition engine: an ordered map of
//! environment-stage names to branch patterns, global template variables,
//! downstream/notification targets keyed by stage name, and a runtime-pool
//! label list.

use crate::error::{Error, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Stage name that marks a branch pattern with no deployable environment.
pub const STAGELESS: &str = "none";

/// Configuration driving one generator run.
///
/// All maps are ordered; declaration order is meaningful and is preserved
/// through branch-descriptor grouping and document emission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Stage name → branch pattern(s); a value may hold several
    /// comma-separated patterns. The stage name `"none"` declares a
    /// CI-only pattern that maps to no deployable environment.
    pub environments: IndexMap<String, String>,

    /// Global template variables, rendered into the document `env:` block.
    pub variables: IndexMap<String, String>,

    /// Downstream workflow triggers keyed by stage name, in
    /// `"<label>[:<target>]"` form.
    pub downstream: IndexMap<String, String>,

    /// Notification targets keyed by stage name, same reference grammar
    /// as `downstream`.
    pub notifications: IndexMap<String, String>,

    /// Runner labels for the `runs-on` clause of every job.
    pub runtime_pool: Vec<String>,

    /// Target used for downstream references without a `:<target>` segment.
    pub default_downstream_target: Option<String>,

    /// Channel used for notification references without a `:<target>` segment.
    pub default_notification_channel: Option<String>,
}

impl GeneratorConfig {
    /// Parse a configuration from a YAML document.
    ///
    /// # Errors
    /// Returns a YAML error on malformed input and a configuration error
    /// when validation fails.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration from a YAML file.
    ///
    /// # Errors
    /// Returns an I/O error when the file cannot be read, otherwise the
    /// same errors as [`GeneratorConfig::from_yaml`].
    pub fn load(path: &Path) -> Result<Self> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml(&yaml)
    }

    /// Validate internal consistency.
    ///
    /// # Errors
    /// Returns a configuration error when no environments are declared,
    /// a pattern is empty or duplicated within a stage, or a
    /// downstream/notification target references an undeclared stage.
    pub fn validate(&self) -> Result<()> {
        if self.environments.is_empty() {
            return Err(Error::config(
                "no environments declared",
                "declare at least one stage name with a branch pattern under `environments`",
            ));
        }

        for (stage, patterns) in &self.environments {
            let mut seen = Vec::new();
            for pattern in patterns.split(',').map(str::trim) {
                if pattern.is_empty() {
                    return Err(Error::config(
                        format!("empty branch pattern for stage `{stage}`"),
                        "every environment stage needs a non-empty branch pattern",
                    ));
                }
                if seen.contains(&pattern) {
                    // A duplicate would register the stage twice for one
                    // descriptor and emit the same job id twice.
                    return Err(Error::config(
                        format!("duplicate branch pattern `{pattern}` for stage `{stage}`"),
                        "list each branch pattern at most once per stage",
                    ));
                }
                seen.push(pattern);
            }
        }

        for (map_name, map) in [("downstream", &self.downstream), ("notifications", &self.notifications)] {
            for stage in map.keys() {
                if !self.environments.contains_key(stage) {
                    return Err(Error::config(
                        format!("{map_name} target references undeclared stage `{stage}`"),
                        "targets may only be declared for stage names listed under `environments`",
                    ));
                }
            }
        }

        Ok(())
    }

    /// Iterate `(stage, pattern)` pairs in declaration order, with
    /// comma-separated pattern lists split into individual patterns.
    pub fn stage_patterns(&self) -> impl Iterator<Item = (&str, String)> {
        self.environments.iter().flat_map(|(stage, patterns)| {
            patterns
                .split(',')
                .map(|p| (stage.as_str(), p.trim().to_string()))
                .collect::<Vec<_>>()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_config() -> GeneratorConfig {
        GeneratorConfig::from_yaml(
            r#"
environments:
  dev: develop
  stage: release/*
  qa: release/*
  prod: master
  none: feature/*
variables:
  JAVA_VERSION: "21"
downstream:
  dev: "E2E Test:org/other-repo"
runtime_pool:
  - self-hosted
  - linux
"#,
        )
        .unwrap()
    }

    #[test]
    fn test_parse_preserves_declaration_order() {
        let config = make_config();
        let stages: Vec<_> = config.environments.keys().cloned().collect();
        assert_eq!(stages, vec!["dev", "stage", "qa", "prod", "none"]);
    }

    #[test]
    fn test_stage_patterns_splits_commas() {
        let config = GeneratorConfig::from_yaml(
            r#"
environments:
  prod: "master,hotfix/*"
"#,
        )
        .unwrap();

        let pairs: Vec<_> = config.stage_patterns().collect();
        assert_eq!(
            pairs,
            vec![("prod", "master".to_string()), ("prod", "hotfix/*".to_string())]
        );
    }

    #[test]
    fn test_validate_rejects_empty_environments() {
        let err = GeneratorConfig::from_yaml("variables: {}").unwrap_err();
        assert!(err.to_string().contains("no environments declared"));
    }

    #[test]
    fn test_validate_rejects_empty_pattern() {
        let err = GeneratorConfig::from_yaml(
            r#"
environments:
  dev: "develop,"
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("empty branch pattern"));
    }

    #[test]
    fn test_validate_rejects_duplicate_pattern_within_stage() {
        let err = GeneratorConfig::from_yaml(
            r#"
environments:
  dev: "develop, develop"
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("duplicate branch pattern `develop`"));
    }

    #[test]
    fn test_validate_allows_same_pattern_across_stages() {
        let config = GeneratorConfig::from_yaml(
            r#"
environments:
  stage: release/*
  qa: release/*
"#,
        );
        assert!(config.is_ok());
    }

    #[test]
    fn test_validate_rejects_unknown_downstream_stage() {
        let err = GeneratorConfig::from_yaml(
            r#"
environments:
  dev: develop
downstream:
  qa: "E2E Test"
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("undeclared stage `qa`"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("slipway.yml");
        std::fs::write(&path, "environments:\n  dev: develop\n").unwrap();

        let config = GeneratorConfig::load(&path).unwrap();
        assert_eq!(config.environments.get("dev"), Some(&"develop".to_string()));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result = GeneratorConfig::from_yaml("enviroments:\n  dev: develop\n");
        assert!(result.is_err());
    }
}
