//! Error types for workflow generation.

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for workflow generation operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while composing and emitting workflow documents.
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    /// Invalid or inconsistent generator configuration.
    #[error("Configuration error: {message}")]
    #[diagnostic(code(slipway::config), help("{help}"))]
    Config {
        /// The error message
        message: String,
        /// Help text for the user
        help: String,
    },

    /// A provider could not resolve the job id of a dependency it requires.
    ///
    /// Never degraded to a dangling `needs` reference: a dangling reference
    /// produces an unexecutable document.
    #[error("unable to resolve job id for stage `{stage}` (required by `{provider}`)")]
    #[diagnostic(
        code(slipway::missing_collaborator),
        help(
            "A job that `{provider}` must run after is not applicable for this project. \
             Check the project capabilities and the environment configuration."
        )
    )]
    MissingCollaborator {
        /// The provider that required the collaborator
        provider: String,
        /// The stage name the id was requested for
        stage: String,
    },

    /// Template body missing or malformed.
    #[error("Template error for `{key}`: {message}")]
    #[diagnostic(
        code(slipway::template),
        help("Check that a template body is registered under this key")
    )]
    Template {
        /// The template key
        key: String,
        /// The error message
        message: String,
    },

    /// A placeholder survived substitution.
    #[error("unsubstituted placeholder `{placeholder}` in template `{key}`")]
    #[diagnostic(
        code(slipway::template::placeholder),
        help("Every %TOKEN% in a template body must be covered by the substitution map")
    )]
    UnsubstitutedPlaceholder {
        /// The template key
        key: String,
        /// The placeholder that was left behind
        placeholder: String,
    },

    /// Output file error.
    #[error("Output error: {message}")]
    #[diagnostic(
        code(slipway::output),
        help("Check that the output directory exists and is writable")
    )]
    Output {
        /// The error message
        message: String,
        /// The path that caused the error
        path: Option<PathBuf>,
        /// The underlying source error
        #[source]
        source: Option<std::io::Error>,
    },

    /// Wrapped I/O error.
    #[error("I/O error: {0}")]
    #[diagnostic(code(slipway::io))]
    Io(#[from] std::io::Error),

    /// Wrapped YAML error.
    #[error("YAML error: {0}")]
    #[diagnostic(code(slipway::yaml))]
    Yaml(#[from] serde_yaml::Error),
}

impl Error {
    /// Create a new configuration error.
    #[must_use]
    pub fn config(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            help: help.into(),
        }
    }

    /// Create a new missing collaborator error.
    #[must_use]
    pub fn missing_collaborator(provider: impl Into<String>, stage: impl Into<String>) -> Self {
        Self::MissingCollaborator {
            provider: provider.into(),
            stage: stage.into(),
        }
    }

    /// Create a new template error.
    #[must_use]
    pub fn template(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Template {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Create a new unsubstituted placeholder error.
    #[must_use]
    pub fn unsubstituted(key: impl Into<String>, placeholder: impl Into<String>) -> Self {
        Self::UnsubstitutedPlaceholder {
            key: key.into(),
            placeholder: placeholder.into(),
        }
    }

    /// Create a new output error.
    #[must_use]
    pub fn output(message: impl Into<String>, path: Option<PathBuf>) -> Self {
        Self::Output {
            message: message.into(),
            path,
            source: None,
        }
    }

    /// Create a new output error with source.
    #[must_use]
    pub fn output_with_source(
        message: impl Into<String>,
        path: Option<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        Self::Output {
            message: message.into(),
            path,
            source: Some(source),
        }
    }
}
