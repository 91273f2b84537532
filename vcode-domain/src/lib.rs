//! Domain logic: find the manifests a build produces and plan the patch work.
//!
//! This crate owns *which* files get patched and with *what* value. It does not
//! own how a manifest is edited; that's the `vcode-edit` crate.

pub mod memory;

mod locator;
mod planner;
mod ports;
mod resolve;

pub use locator::{
    OutputShape, OverrideMode, VariantLocation, locate, locate_variant, locate_variant_with,
};
pub use planner::{
    PlannedRun, plan_variants, plan_variants_with, plan_work_units, work_unit_name,
};
pub use ports::{ManifestStep, PathRef, StepProperty, TargetKind, VariantOutput, VersionCodeSink};
pub use resolve::{
    Activation, CURRENT_INPUT, InvalidOverrideValue, LEGACY_INPUT, OverrideInputs, activation,
    resolve,
};
