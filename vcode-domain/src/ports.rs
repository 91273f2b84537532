//! Host capability surface consumed by the locator.
//!
//! The packaging pipeline owns variants and their manifest steps; vcode only
//! reads them through these traits. Which output conventions a step supports is
//! a query over the closed [`StepProperty`] set rather than ad-hoc presence
//! checks.

use camino::Utf8PathBuf;
use std::fmt;
use vcode_types::candidate::CandidateSource;

/// A filesystem location exposed by a manifest step.
///
/// Some pipeline versions hand out the path directly, others a provider that
/// is only meaningful once configuration has settled.
pub enum PathRef {
    Eager(Utf8PathBuf),
    Lazy(Box<dyn Fn() -> anyhow::Result<Utf8PathBuf> + Send + Sync>),
}

impl PathRef {
    pub fn eager(path: impl Into<Utf8PathBuf>) -> Self {
        PathRef::Eager(path.into())
    }

    pub fn lazy<F>(provider: F) -> Self
    where
        F: Fn() -> anyhow::Result<Utf8PathBuf> + Send + Sync + 'static,
    {
        PathRef::Lazy(Box::new(provider))
    }

    pub fn resolve(&self) -> anyhow::Result<Utf8PathBuf> {
        match self {
            PathRef::Eager(path) => Ok(path.clone()),
            PathRef::Lazy(provider) => provider(),
        }
    }
}

impl fmt::Debug for PathRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathRef::Eager(path) => f.debug_tuple("Eager").field(path).finish(),
            PathRef::Lazy(_) => f.write_str("Lazy(..)"),
        }
    }
}

/// Output properties a manifest step may expose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StepProperty {
    ManifestOutputDirectory,
    ManifestOutputFile,
    BundleManifestOutputDirectory,
    MetadataFeatureManifestOutputDirectory,
    InstantAppManifestOutputDirectory,
}

impl StepProperty {
    /// Split-manifest locations, probed in this order regardless of the primary shape.
    pub const AUXILIARY: [StepProperty; 3] = [
        StepProperty::BundleManifestOutputDirectory,
        StepProperty::MetadataFeatureManifestOutputDirectory,
        StepProperty::InstantAppManifestOutputDirectory,
    ];

    pub const ALL: [StepProperty; 5] = [
        StepProperty::ManifestOutputDirectory,
        StepProperty::ManifestOutputFile,
        StepProperty::BundleManifestOutputDirectory,
        StepProperty::MetadataFeatureManifestOutputDirectory,
        StepProperty::InstantAppManifestOutputDirectory,
    ];

    /// Property name as the host pipeline spells it.
    pub fn host_name(self) -> &'static str {
        match self {
            StepProperty::ManifestOutputDirectory => "manifestOutputDirectory",
            StepProperty::ManifestOutputFile => "manifestOutputFile",
            StepProperty::BundleManifestOutputDirectory => "bundleManifestOutputDirectory",
            StepProperty::MetadataFeatureManifestOutputDirectory => {
                "metadataFeatureManifestOutputDirectory"
            }
            StepProperty::InstantAppManifestOutputDirectory => {
                "instantAppManifestOutputDirectory"
            }
        }
    }

    /// Whether the property names a directory holding `AndroidManifest.xml`.
    pub fn is_directory(self) -> bool {
        !matches!(self, StepProperty::ManifestOutputFile)
    }

    pub fn candidate_source(self) -> CandidateSource {
        match self {
            StepProperty::ManifestOutputDirectory => CandidateSource::OutputDirectory,
            StepProperty::ManifestOutputFile => CandidateSource::OutputFile,
            StepProperty::BundleManifestOutputDirectory => CandidateSource::BundleManifest,
            StepProperty::MetadataFeatureManifestOutputDirectory => {
                CandidateSource::MetadataFeatureManifest
            }
            StepProperty::InstantAppManifestOutputDirectory => CandidateSource::InstantAppManifest,
        }
    }
}

/// Direct version-code override offered by some pipeline versions in place of
/// a manifest file.
pub trait VersionCodeSink {
    fn set_version_code_override(&self, value: u32) -> anyhow::Result<()>;
}

/// One manifest-processing step of a variant.
pub trait ManifestStep {
    fn name(&self) -> &str;

    fn property(&self, property: StepProperty) -> Option<&PathRef>;

    fn version_code_sink(&self) -> Option<&dyn VersionCodeSink> {
        None
    }
}

/// One packaging configuration's primary output.
pub trait VariantOutput {
    fn name(&self) -> &str;

    fn manifest_steps(&self) -> Vec<&dyn ManifestStep>;

    /// Steps that read the generated manifest (resource processing, bundling).
    fn manifest_consumers(&self) -> Vec<String> {
        Vec::new()
    }
}

/// Kind of project the variants belong to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TargetKind {
    Application,
    DynamicFeature,
    Library,
    Test,
    Other(String),
}

impl TargetKind {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "application" | "app" => TargetKind::Application,
            "dynamic-feature" | "dynamicfeature" => TargetKind::DynamicFeature,
            "library" | "lib" => TargetKind::Library,
            "test" => TargetKind::Test,
            _ => TargetKind::Other(raw.trim().to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            TargetKind::Application => "application",
            TargetKind::DynamicFeature => "dynamic-feature",
            TargetKind::Library => "library",
            TargetKind::Test => "test",
            TargetKind::Other(raw) => raw,
        }
    }

    /// Only targets that package an application carry a version code.
    pub fn is_packaging_target(&self) -> bool {
        matches!(self, TargetKind::Application | TargetKind::DynamicFeature)
    }
}
