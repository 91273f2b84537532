//! Default filesystem-backed port implementations.

use crate::ports::{VariantSource, WritePort};
use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use fs_err as fs;
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::{debug, error, info, warn};
use vcode_domain::memory::MemoryVariant;
use vcode_domain::{
    ManifestStep, PathRef, StepProperty, TargetKind, VariantOutput, VersionCodeSink,
};
use vcode_types::diagnostics::{Diagnostics, Severity};

/// Forwards diagnostics to `tracing` at the matching level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingDiagnostics;

impl Diagnostics for TracingDiagnostics {
    fn report(&self, severity: Severity, message: &str) {
        match severity {
            Severity::Debug => debug!("{message}"),
            Severity::Info => info!("{message}"),
            Severity::Warn => warn!("{message}"),
            Severity::Error => error!("{message}"),
        }
    }
}

// ── variant-outputs.json ──────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct OutputsFile {
    project: String,
    kind: String,
    #[serde(default)]
    build_dir: Option<Utf8PathBuf>,
    #[serde(default)]
    variants: Vec<VariantEntry>,
}

#[derive(Debug, Deserialize)]
struct VariantEntry {
    name: String,
    #[serde(default)]
    consumers: Vec<String>,
    #[serde(default)]
    manifest_steps: Vec<StepEntry>,
}

#[derive(Debug, Deserialize)]
struct StepEntry {
    name: String,
    #[serde(default)]
    properties: BTreeMap<String, PropertyValue>,
    #[serde(default)]
    version_code_override_file: Option<Utf8PathBuf>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PropertyValue {
    Path(Utf8PathBuf),
    BuildDir { build_dir: Utf8PathBuf },
}

/// Key spelling of each step property in `variant-outputs.json`.
pub fn property_key(property: StepProperty) -> &'static str {
    match property {
        StepProperty::ManifestOutputDirectory => "manifest_output_directory",
        StepProperty::ManifestOutputFile => "manifest_output_file",
        StepProperty::BundleManifestOutputDirectory => "bundle_manifest_output_directory",
        StepProperty::MetadataFeatureManifestOutputDirectory => {
            "metadata_feature_manifest_output_directory"
        }
        StepProperty::InstantAppManifestOutputDirectory => "instant_app_manifest_output_directory",
    }
}

fn property_from_key(key: &str) -> Option<StepProperty> {
    StepProperty::ALL
        .into_iter()
        .find(|p| property_key(*p) == key || p.host_name() == key)
}

/// Writes the override value to a file, for hosts that read it back.
#[derive(Debug, Clone)]
pub struct FileOverrideSink {
    pub path: Utf8PathBuf,
}

impl VersionCodeSink for FileOverrideSink {
    fn set_version_code_override(&self, value: u32) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create parent dir for {}", self.path))?;
        }
        fs::write(&self.path, format!("{value}\n"))
            .with_context(|| format!("write override {}", self.path))
    }
}

#[derive(Debug)]
pub struct FileStep {
    name: String,
    properties: BTreeMap<StepProperty, PathRef>,
    sink: Option<FileOverrideSink>,
}

impl ManifestStep for FileStep {
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
pub struct FileVariant {
    name: String,
    consumers: Vec<String>,
    steps: Vec<FileStep>,
}

impl VariantOutput for FileVariant {
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

/// Variants described by a `variant-outputs.json` file the host dumps.
///
/// Plain string paths are eager and resolve against the file's directory.
/// `{"build_dir": rel}` values are lazy and resolve against the declared
/// `build_dir` when the locator asks for them.
#[derive(Debug)]
pub struct FsVariantSource {
    pub path: Utf8PathBuf,
    project: String,
    kind: TargetKind,
    variants: Vec<FileVariant>,
}

impl FsVariantSource {
    pub fn load(path: &Utf8Path) -> anyhow::Result<Self> {
        let raw = fs::read_to_string(path).with_context(|| format!("read {}", path))?;
        let base = path
            .parent()
            .map(Utf8Path::to_path_buf)
            .unwrap_or_default();
        let mut source = Self::from_json(&raw, &base).with_context(|| format!("parse {}", path))?;
        source.path = path.to_path_buf();
        Ok(source)
    }

    /// Parse a description; relative paths resolve against `base`.
    pub fn from_json(raw: &str, base: &Utf8Path) -> anyhow::Result<Self> {
        let file: OutputsFile = serde_json::from_str(raw).context("parse variant outputs")?;
        let build_dir = file.build_dir.map(|d| join(base, &d));

        let mut variants = Vec::with_capacity(file.variants.len());
        for v in file.variants {
            let mut steps = Vec::with_capacity(v.manifest_steps.len());
            for s in v.manifest_steps {
                let mut properties = BTreeMap::new();
                for (key, value) in s.properties {
                    let Some(property) = property_from_key(&key) else {
                        warn!(
                            step = s.name.as_str(),
                            key = key.as_str(),
                            "ignoring unknown step property"
                        );
                        continue;
                    };
                    properties.insert(property, path_ref(base, build_dir.as_ref(), value));
                }
                steps.push(FileStep {
                    sink: s
                        .version_code_override_file
                        .map(|p| FileOverrideSink { path: join(base, &p) }),
                    name: s.name,
                    properties,
                });
            }
            variants.push(FileVariant {
                name: v.name,
                consumers: v.consumers,
                steps,
            });
        }

        debug!(
            project = file.project.as_str(),
            variants = variants.len(),
            "loaded variant outputs"
        );
        Ok(Self {
            path: Utf8PathBuf::new(),
            kind: TargetKind::parse(&file.kind),
            project: file.project,
            variants,
        })
    }
}

fn join(base: &Utf8Path, path: &Utf8Path) -> Utf8PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

fn path_ref(base: &Utf8Path, build_dir: Option<&Utf8PathBuf>, value: PropertyValue) -> PathRef {
    match value {
        PropertyValue::Path(p) => PathRef::eager(join(base, &p)),
        PropertyValue::BuildDir { build_dir: rel } => {
            let root = build_dir.cloned();
            PathRef::lazy(move || match &root {
                Some(root) => Ok(join(root, &rel)),
                None => anyhow::bail!("build_dir is not set; cannot resolve {}", rel),
            })
        }
    }
}

impl VariantSource for FsVariantSource {
    fn project(&self) -> &str {
        &self.project
    }

    fn target_kind(&self) -> TargetKind {
        self.kind.clone()
    }

    fn variants(&self) -> Vec<&dyn VariantOutput> {
        self.variants.iter().map(|v| v as &dyn VariantOutput).collect()
    }
}

/// In-memory variant source for embedding and testing.
#[derive(Debug)]
pub struct InMemoryVariantSource {
    project: String,
    kind: TargetKind,
    variants: Vec<MemoryVariant>,
}

impl InMemoryVariantSource {
    pub fn new(project: impl Into<String>, kind: TargetKind, variants: Vec<MemoryVariant>) -> Self {
        Self {
            project: project.into(),
            kind,
            variants,
        }
    }

    pub fn variant(&self, name: &str) -> Option<&MemoryVariant> {
        self.variants.iter().find(|v| v.name() == name)
    }
}

impl VariantSource for InMemoryVariantSource {
    fn project(&self) -> &str {
        &self.project
    }

    fn target_kind(&self) -> TargetKind {
        self.kind.clone()
    }

    fn variants(&self) -> Vec<&dyn VariantOutput> {
        self.variants.iter().map(|v| v as &dyn VariantOutput).collect()
    }
}

/// Filesystem write operations.
#[derive(Debug, Clone, Default)]
pub struct FsWritePort;

impl WritePort for FsWritePort {
    fn write_file(&self, path: &Utf8Path, contents: &[u8]) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create parent dir for {}", path))?;
        }
        fs::write(path, contents).with_context(|| format!("write {}", path))
    }

    fn create_dir_all(&self, path: &Utf8Path) -> anyhow::Result<()> {
        fs::create_dir_all(path).with_context(|| format!("create_dir_all {}", path))
    }
}
