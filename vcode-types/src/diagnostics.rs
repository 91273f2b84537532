//! Severity-leveled diagnostics sink.
//!
//! The locator, resolver and patcher never log through global state; callers
//! hand them a `&dyn Diagnostics`. `vcode-core` forwards to `tracing`, tests use
//! [`RecordingDiagnostics`].

use serde::{Deserialize, Serialize};
use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Debug,
    Info,
    Warn,
    Error,
}

pub trait Diagnostics {
    fn report(&self, severity: Severity, message: &str);

    fn debug(&self, message: &str) {
        self.report(Severity::Debug, message);
    }

    fn info(&self, message: &str) {
        self.report(Severity::Info, message);
    }

    fn warn(&self, message: &str) {
        self.report(Severity::Warn, message);
    }

    fn error(&self, message: &str) {
        self.report(Severity::Error, message);
    }
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullDiagnostics;

impl Diagnostics for NullDiagnostics {
    fn report(&self, _severity: Severity, _message: &str) {}
}

/// Keeps every message in memory, in order.
#[derive(Debug, Default)]
pub struct RecordingDiagnostics {
    entries: Mutex<Vec<(Severity, String)>>,
}

impl RecordingDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<(Severity, String)> {
        match self.entries.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn messages(&self, severity: Severity) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter(|(s, _)| *s == severity)
            .map(|(_, m)| m)
            .collect()
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.messages(severity).len()
    }
}

impl Diagnostics for RecordingDiagnostics {
    fn report(&self, severity: Severity, message: &str) {
        let entry = (severity, message.to_string());
        match self.entries.lock() {
            Ok(mut guard) => guard.push(entry),
            Err(poisoned) => poisoned.into_inner().push(entry),
        }
    }
}
