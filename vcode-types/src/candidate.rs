use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

/// Which output convention produced a candidate path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateSource {
    /// `<manifestOutputDirectory>/AndroidManifest.xml`.
    OutputDirectory,
    /// `manifestOutputFile`, used as-is.
    OutputFile,
    BundleManifest,
    MetadataFeatureManifest,
    InstantAppManifest,
}

impl CandidateSource {
    pub fn label(self) -> &'static str {
        match self {
            CandidateSource::OutputDirectory => "output_directory",
            CandidateSource::OutputFile => "output_file",
            CandidateSource::BundleManifest => "bundle_manifest",
            CandidateSource::MetadataFeatureManifest => "metadata_feature_manifest",
            CandidateSource::InstantAppManifest => "instant_app_manifest",
        }
    }
}

/// One manifest path a variant may produce.
///
/// The file is not required to exist: several conventions are probed and
/// only the one the current pipeline actually uses ends up on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestCandidate {
    pub path: Utf8PathBuf,
    pub variant_name: String,

    /// Position in the variant's emission order, starting at 0.
    pub sequence_index: u32,

    pub source: CandidateSource,

    /// Name of the manifest step that produces the file.
    pub step: String,
}
