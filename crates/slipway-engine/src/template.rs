//! Template loading and `%TOKEN%` substitution.
//!
//! Templates are plain text job bodies with literal `%TOKEN%` placeholders.
//! Substitution is a find/replace over an explicit token map; a placeholder
//! that survives substitution is an error, never silently emitted.

use indexmap::IndexMap;
use slipway_core::{Error, Result};
use std::sync::Arc;

/// Loads a template body by key.
///
/// Keys are the providers' base names (`compile`, `package`, ...).
pub trait TemplateStore: Send + Sync {
    /// Load the template body registered under `key`.
    ///
    /// # Errors
    /// Returns a template error when no body is registered for the key.
    fn load(&self, key: &str) -> Result<String>;
}

/// Template store backed by bodies compiled into the binary.
pub struct EmbeddedTemplateStore {
    bodies: IndexMap<&'static str, &'static str>,
}

macro_rules! embedded_templates {
    ($($key:literal),+ $(,)?) => {
        IndexMap::from([
            $(($key, include_str!(concat!("../templates/", $key, ".yml")))),+
        ])
    };
}

impl EmbeddedTemplateStore {
    /// Create a store holding every built-in job template.
    #[must_use]
    pub fn new() -> Self {
        Self {
            bodies: embedded_templates![
                "versioning",
                "compile",
                "node-build",
                "unit-test",
                "integration-test",
                "sonar-scan",
                "publish-library",
                "package",
                "promote",
                "db-changelog",
                "db-migrate",
                "infrastructure-apply",
                "deployment",
                "performance-test",
                "rollback",
                "downstream-trigger",
                "notify",
            ],
        }
    }

    /// The registered template keys, in registration order.
    #[must_use]
    pub fn keys(&self) -> Vec<&'static str> {
        self.bodies.keys().copied().collect()
    }
}

impl Default for EmbeddedTemplateStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateStore for EmbeddedTemplateStore {
    fn load(&self, key: &str) -> Result<String> {
        self.bodies
            .get(key)
            .map(|body| (*body).to_string())
            .ok_or_else(|| Error::template(key, "no such template"))
    }
}

/// A shareable template store handle.
pub type SharedTemplateStore = Arc<dyn TemplateStore>;

/// Substitute `%TOKEN%` placeholders in a template body.
///
/// `values` maps bare token names (without the `%` fence) to replacement
/// text. After substitution the body is scanned for leftover placeholders;
/// finding one fails the render. `key` only labels errors.
///
/// # Errors
/// Returns an unsubstituted-placeholder error when a `%TOKEN%` survives.
pub fn substitute(key: &str, body: &str, values: &[(&str, String)]) -> Result<String> {
    let mut rendered = body.to_string();
    for (token, value) in values {
        rendered = rendered.replace(&format!("%{token}%"), value);
    }

    if let Some(placeholder) = find_placeholder(&rendered) {
        return Err(Error::unsubstituted(key, placeholder));
    }

    Ok(rendered)
}

/// Find the first surviving `%TOKEN%` placeholder, if any.
fn find_placeholder(text: &str) -> Option<String> {
    let bytes = text.as_bytes();
    let mut start = None;
    for (i, &b) in bytes.iter().enumerate() {
        if b != b'%' {
            continue;
        }
        match start {
            None => start = Some(i),
            Some(s) => {
                let inner = &text[s + 1..i];
                if !inner.is_empty()
                    && inner
                        .bytes()
                        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == b'_')
                {
                    return Some(text[s..=i].to_string());
                }
                start = Some(i);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_store_has_all_provider_templates() {
        let store = EmbeddedTemplateStore::new();
        assert_eq!(store.keys().len(), 17);
        assert!(store.load("compile").is_ok());
        assert!(store.load("deployment").is_ok());
    }

    #[test]
    fn test_load_unknown_key_fails() {
        let store = EmbeddedTemplateStore::new();
        let err = store.load("does-not-exist").unwrap_err();
        assert!(err.to_string().contains("does-not-exist"));
    }

    #[test]
    fn test_substitute_replaces_all_occurrences() {
        let out = substitute(
            "t",
            "%JOB_ID%: job %JOB_ID% on %RUNS_ON%",
            &[
                ("JOB_ID", "compile".to_string()),
                ("RUNS_ON", "ubuntu-latest".to_string()),
            ],
        )
        .unwrap();
        assert_eq!(out, "compile: job compile on ubuntu-latest");
    }

    #[test]
    fn test_substitute_fails_on_leftover_placeholder() {
        let err = substitute("compile", "version: %JAVA_VERSION%", &[]).unwrap_err();
        assert!(err.to_string().contains("%JAVA_VERSION%"));
        assert!(err.to_string().contains("compile"));
    }

    #[test]
    fn test_substitute_ignores_non_token_percent_signs() {
        let out = substitute("t", "run: echo 100% done %ID%", &[("ID", "x".to_string())]).unwrap();
        assert_eq!(out, "run: echo 100% done x");
    }

    #[test]
    fn test_every_embedded_template_declares_job_id() {
        let store = EmbeddedTemplateStore::new();
        for key in store.keys() {
            let body = store.load(key).unwrap();
            assert!(
                body.contains("%JOB_ID%"),
                "template `{key}` has no %JOB_ID% placeholder"
            );
        }
    }
}
