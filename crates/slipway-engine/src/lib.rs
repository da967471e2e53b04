//! Stage composition engine for pipeline document generation.
//!
//! The engine turns an immutable capability snapshot of a repository plus a
//! generator configuration into GitHub Actions workflow documents. Stage
//! providers are the rule units: each one decides applicability, contributes
//! job identifiers, and renders its job body from an embedded template. The
//! provider registry is an explicit ordered list; `needs` edges always point
//! at earlier-registered providers, which keeps the job graph acyclic by
//! construction.

pub mod compose;
pub mod context;
pub mod emit;
pub mod provider;
pub mod providers;
pub mod template;
pub mod version;

pub use compose::CompositionEngine;
pub use context::{BranchDescriptor, GlobalVariables, PipelineContext};
pub use emit::{DocumentEmitter, RenderedDocument, WORKFLOW_FILE_SUFFIX, write_documents};
pub use provider::{ProviderRegistry, StageProvider};
pub use providers::default_registry;
pub use template::{EmbeddedTemplateStore, SharedTemplateStore, TemplateStore};
pub use version::{BranchKind, emitted_version};
