//! Variant output locator.
//!
//! Each manifest step is classified once into an [`OutputShape`]; the shapes
//! are mutually exclusive and checked in priority order:
//!
//! 1. `manifestOutputDirectory` -> `<dir>/AndroidManifest.xml`
//! 2. `manifestOutputFile` -> the file itself
//! 3. direct version-code override -> invoked right away, no candidate
//!
//! Split-manifest directories (bundle, metadata feature, instant app) are
//! probed afterwards whatever the primary shape was.

use crate::ports::{ManifestStep, PathRef, StepProperty, VariantOutput, VersionCodeSink};
use camino::Utf8PathBuf;
use vcode_types::MANIFEST_FILE_NAME;
use vcode_types::candidate::{CandidateSource, ManifestCandidate};
use vcode_types::diagnostics::Diagnostics;

/// Primary output shape of one manifest step.
pub enum OutputShape<'a> {
    Directory(&'a PathRef),
    File(&'a PathRef),
    Override(&'a dyn VersionCodeSink),
    Unrecognized,
}

impl<'a> OutputShape<'a> {
    pub fn classify(step: &'a dyn ManifestStep) -> Self {
        if let Some(dir) = step.property(StepProperty::ManifestOutputDirectory) {
            OutputShape::Directory(dir)
        } else if let Some(file) = step.property(StepProperty::ManifestOutputFile) {
            OutputShape::File(file)
        } else if let Some(sink) = step.version_code_sink() {
            OutputShape::Override(sink)
        } else {
            OutputShape::Unrecognized
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            OutputShape::Directory(_) => "directory",
            OutputShape::File(_) => "file",
            OutputShape::Override(_) => "override",
            OutputShape::Unrecognized => "unrecognized",
        }
    }
}

/// What the locator does with a step's direct version-code override.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OverrideMode {
    /// Call the capability with the value.
    #[default]
    Invoke,
    /// Only record that the variant would be overridden (dry runs).
    Record,
}

/// Everything the locator found for one variant.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariantLocation {
    pub candidates: Vec<ManifestCandidate>,
    /// The value was handed to a step's override capability.
    pub override_applied: bool,
}

/// Candidate manifest paths for `variant`, in emission order.
pub fn locate(
    variant: &dyn VariantOutput,
    value: u32,
    diag: &dyn Diagnostics,
) -> Vec<ManifestCandidate> {
    locate_variant(variant, value, diag).candidates
}

pub fn locate_variant(
    variant: &dyn VariantOutput,
    value: u32,
    diag: &dyn Diagnostics,
) -> VariantLocation {
    locate_variant_with(variant, value, OverrideMode::Invoke, diag)
}

/// Like [`locate_variant`], with control over the override capability.
pub fn locate_variant_with(
    variant: &dyn VariantOutput,
    value: u32,
    mode: OverrideMode,
    diag: &dyn Diagnostics,
) -> VariantLocation {
    let mut emitter = Emitter {
        variant: variant.name(),
        location: VariantLocation::default(),
    };

    let steps = variant.manifest_steps();
    if steps.is_empty() {
        diag.debug(&format!(
            "variant '{}' has no manifest step; nothing to override",
            variant.name()
        ));
    }

    for step in steps {
        probe_step(step, value, mode, &mut emitter, diag);
    }

    if emitter.location.candidates.is_empty() && !emitter.location.override_applied {
        diag.debug(&format!(
            "no recognizable manifest output for variant '{}'",
            variant.name()
        ));
    }
    emitter.location
}

fn probe_step(
    step: &dyn ManifestStep,
    value: u32,
    mode: OverrideMode,
    emitter: &mut Emitter<'_>,
    diag: &dyn Diagnostics,
) {
    match OutputShape::classify(step) {
        OutputShape::Directory(dir) => {
            emitter.emit_resolved(step, StepProperty::ManifestOutputDirectory, dir, diag);
        }
        OutputShape::File(file) => {
            emitter.emit_resolved(step, StepProperty::ManifestOutputFile, file, diag);
        }
        OutputShape::Override(sink) => {
            diag.warn(&format!(
                "step '{}' of variant '{}' exposes no manifest output; falling back to its direct version code override",
                step.name(),
                emitter.variant
            ));
            match mode {
                OverrideMode::Record => {
                    diag.info(&format!(
                        "dry run: step '{}' would receive version code override {}",
                        step.name(),
                        value
                    ));
                    emitter.location.override_applied = true;
                }
                OverrideMode::Invoke => match sink.set_version_code_override(value) {
                    Ok(()) => emitter.location.override_applied = true,
                    Err(err) => diag.warn(&format!(
                        "version code override on step '{}' failed: {:#}",
                        step.name(),
                        err
                    )),
                },
            }
        }
        OutputShape::Unrecognized => {
            diag.debug(&format!(
                "step '{}' of variant '{}' has no primary manifest output",
                step.name(),
                emitter.variant
            ));
        }
    }

    for property in StepProperty::AUXILIARY {
        if let Some(dir) = step.property(property) {
            emitter.emit_resolved(step, property, dir, diag);
        }
    }
}

struct Emitter<'v> {
    variant: &'v str,
    location: VariantLocation,
}

impl Emitter<'_> {
    fn emit_resolved(
        &mut self,
        step: &dyn ManifestStep,
        property: StepProperty,
        value: &PathRef,
        diag: &dyn Diagnostics,
    ) {
        let resolved = match value.resolve() {
            Ok(path) => path,
            Err(err) => {
                diag.warn(&format!(
                    "cannot resolve {} of step '{}': {:#}",
                    property.host_name(),
                    step.name(),
                    err
                ));
                return;
            }
        };

        let path = if property.is_directory() {
            resolved.join(MANIFEST_FILE_NAME)
        } else {
            resolved
        };
        self.emit(step, property.candidate_source(), path, diag);
    }

    fn emit(
        &mut self,
        step: &dyn ManifestStep,
        source: CandidateSource,
        path: Utf8PathBuf,
        diag: &dyn Diagnostics,
    ) {
        let sequence_index = self.location.candidates.len() as u32;
        diag.debug(&format!(
            "variant '{}' candidate #{} ({}): {}",
            self.variant,
            sequence_index,
            source.label(),
            path
        ));
        self.location.candidates.push(ManifestCandidate {
            path,
            variant_name: self.variant.to_string(),
            sequence_index,
            source,
            step: step.name().to_string(),
        });
    }
}
