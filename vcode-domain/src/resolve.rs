//! Override value resolution and the top-level activation gate.

use crate::ports::TargetKind;
use thiserror::Error;
use vcode_types::diagnostics::Diagnostics;
use vcode_types::plan::SkipReason;

/// Deprecated input name.
pub const LEGACY_INPUT: &str = "LEGACY_BUILD_VERSION";

/// Current input name; wins over [`LEGACY_INPUT`] on conflict.
pub const CURRENT_INPUT: &str = "CURRENT_BUILD_VERSION";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidOverrideValue {
    #[error("no override value supplied: set CURRENT_BUILD_VERSION (or the deprecated LEGACY_BUILD_VERSION)")]
    Missing,

    #[error("{input}='{value}' is not a non-negative base-10 integer")]
    NotAnInteger { input: &'static str, value: String },
}

/// Raw override inputs as supplied by the environment.
///
/// Blank values count as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverrideInputs {
    pub legacy: Option<String>,
    pub current: Option<String>,
}

impl OverrideInputs {
    pub fn new(legacy: Option<String>, current: Option<String>) -> Self {
        Self { legacy, current }
    }

    pub fn legacy(&self) -> Option<&str> {
        present(self.legacy.as_deref())
    }

    pub fn current(&self) -> Option<&str> {
        present(self.current.as_deref())
    }

    pub fn is_empty(&self) -> bool {
        self.legacy().is_none() && self.current().is_none()
    }

    pub fn resolve(&self, diag: &dyn Diagnostics) -> Result<u32, InvalidOverrideValue> {
        resolve(self.legacy(), self.current(), diag)
    }
}

fn present(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|s| !s.is_empty())
}

fn parse_value(input: &'static str, raw: &str) -> Result<u32, InvalidOverrideValue> {
    let not_an_integer = || InvalidOverrideValue::NotAnInteger {
        input,
        value: raw.to_string(),
    };
    // `u32::from_str` also takes a leading '+'.
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(not_an_integer());
    }
    raw.parse::<u32>().map_err(|_| not_an_integer())
}

/// Resolve the single version code for this run.
pub fn resolve(
    legacy: Option<&str>,
    current: Option<&str>,
    diag: &dyn Diagnostics,
) -> Result<u32, InvalidOverrideValue> {
    let legacy = present(legacy);
    let current = present(current);

    match (legacy, current) {
        (None, None) => Err(InvalidOverrideValue::Missing),
        (None, Some(current)) => parse_value(CURRENT_INPUT, current),
        (Some(legacy), None) => {
            diag.info(&format!(
                "{LEGACY_INPUT} is deprecated, set {CURRENT_INPUT} instead"
            ));
            parse_value(LEGACY_INPUT, legacy)
        }
        (Some(legacy), Some(current)) => {
            let agree = matches!(
                (parse_value(LEGACY_INPUT, legacy), parse_value(CURRENT_INPUT, current)),
                (Ok(l), Ok(c)) if l == c
            );
            if !agree {
                diag.warn(&format!(
                    "{LEGACY_INPUT}='{legacy}' and {CURRENT_INPUT}='{current}' differ; using {CURRENT_INPUT}"
                ));
            }
            parse_value(CURRENT_INPUT, current)
        }
    }
}

/// Outcome of the top-level activation gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Activation {
    Active,
    Skip(SkipReason),
}

/// Activate only for packaging targets that received at least one input.
pub fn activation(kind: &TargetKind, inputs: &OverrideInputs) -> Activation {
    if !kind.is_packaging_target() {
        return Activation::Skip(SkipReason::UnsupportedTarget {
            kind: kind.as_str().to_string(),
        });
    }
    if inputs.is_empty() {
        return Activation::Skip(SkipReason::NoOverrideValue);
    }
    Activation::Active
}
