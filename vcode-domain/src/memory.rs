//! In-memory host implementations for embedding and testing.

use crate::ports::{ManifestStep, PathRef, StepProperty, VariantOutput, VersionCodeSink};
use std::collections::BTreeMap;
use std::sync::Mutex;

/// Records every value it is handed.
#[derive(Debug, Default)]
pub struct RecordingSink {
    values: Mutex<Vec<u32>>,
}

impl RecordingSink {
    pub fn values(&self) -> Vec<u32> {
        match self.values.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl VersionCodeSink for RecordingSink {
    fn set_version_code_override(&self, value: u32) -> anyhow::Result<()> {
        match self.values.lock() {
            Ok(mut guard) => guard.push(value),
            Err(poisoned) => poisoned.into_inner().push(value),
        }
        Ok(())
    }
}

#[derive(Debug)]
pub struct MemoryStep {
    name: String,
    properties: BTreeMap<StepProperty, PathRef>,
    sink: Option<RecordingSink>,
}

impl MemoryStep {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: BTreeMap::new(),
            sink: None,
        }
    }

    pub fn with(mut self, property: StepProperty, value: PathRef) -> Self {
        self.properties.insert(property, value);
        self
    }

    /// Expose the direct override capability.
    pub fn with_sink(mut self) -> Self {
        self.sink = Some(RecordingSink::default());
        self
    }

    pub fn sink(&self) -> Option<&RecordingSink> {
        self.sink.as_ref()
    }
}

impl ManifestStep for MemoryStep {
    fn name(&self) -> &str {
        &self.name
    }

    fn property(&self, property: StepProperty) -> Option<&PathRef> {
        self.properties.get(&property)
    }

    fn version_code_sink(&self) -> Option<&dyn VersionCodeSink> {
        self.sink.as_ref().map(|s| s as &dyn VersionCodeSink)
    }
}

#[derive(Debug)]
pub struct MemoryVariant {
    name: String,
    steps: Vec<MemoryStep>,
    consumers: Vec<String>,
}

impl MemoryVariant {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            steps: Vec::new(),
            consumers: Vec::new(),
        }
    }

    pub fn step(mut self, step: MemoryStep) -> Self {
        self.steps.push(step);
        self
    }

    pub fn consumer(mut self, name: impl Into<String>) -> Self {
        self.consumers.push(name.into());
        self
    }

    pub fn steps(&self) -> &[MemoryStep] {
        &self.steps
    }
}

impl VariantOutput for MemoryVariant {
    fn name(&self) -> &str {
        &self.name
    }

    fn manifest_steps(&self) -> Vec<&dyn ManifestStep> {
        self.steps.iter().map(|s| s as &dyn ManifestStep).collect()
    }

    fn manifest_consumers(&self) -> Vec<String> {
        self.consumers.clone()
    }
}
