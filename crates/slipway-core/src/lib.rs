//! Core types for the slipway workflow generator.
//!
//! This crate provides:
//! - [`CapabilitySnapshot`] — the read-only fact base describing an inspected
//!   project
//! - [`GeneratorConfig`] — the configuration surface consumed by the engine
//! - [`Error`] / [`Result`] — shared error handling for the workspace

pub mod capabilities;
pub mod config;
pub mod error;

pub use capabilities::CapabilitySnapshot;
pub use config::GeneratorConfig;
pub use error::{Error, Result};
