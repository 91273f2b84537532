//! Embeddable core library for vcode.
//!
//! Provides a clap-free, I/O-abstracted entry point suitable for linking
//! into a build-pipeline plugin or other host process.
//!
//! # Port traits
//!
//! All host and output I/O is abstracted behind port traits in [`ports`]:
//! - [`VariantSource`](ports::VariantSource) — the project's variants and target kind
//! - [`WritePort`](ports::WritePort) — write artifact files and create directories
//!
//! The [`adapters`] module provides default filesystem-backed implementations.
//!
//! # Entry points
//!
//! - [`run_plan`](pipeline::run_plan) — gate, resolve the override and plan work units
//! - [`run_apply`](pipeline::run_apply) — patch every planned manifest

pub mod adapters;
pub mod pipeline;
pub mod ports;
pub mod settings;

// Re-export the host surface so embedders don't need vcode-domain directly.
pub use vcode_domain::{
    ManifestStep, PathRef, StepProperty, TargetKind, VariantOutput, VersionCodeSink,
};
