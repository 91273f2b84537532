//! Error types for vcode-edit.
//!
//! Every variant is scoped to a single manifest: callers record it against
//! that file and carry on with the rest of the run.

use camino::Utf8PathBuf;
use thiserror::Error;
use vcode_types::report::FailureKind;

/// Why a manifest could not be patched.
#[derive(Debug, Error)]
pub enum PatchError {
    #[error("malformed manifest {path}: {source}")]
    Malformed {
        path: Utf8PathBuf,
        #[source]
        source: MalformedManifest,
    },

    #[error("failed to read {path}: {source}")]
    Read {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PatchError {
    /// The report classification for this failure.
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            PatchError::Malformed { .. } => FailureKind::MalformedManifest,
            PatchError::Read { .. } => FailureKind::ReadFailure,
            PatchError::Write { .. } => FailureKind::WriteFailure,
        }
    }

    pub fn path(&self) -> &Utf8PathBuf {
        match self {
            PatchError::Malformed { path, .. }
            | PatchError::Read { path, .. }
            | PatchError::Write { path, .. } => path,
        }
    }
}

/// The document text is not a well-formed manifest. Nothing is written.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedManifest {
    #[error("file is not valid UTF-8")]
    NotUtf8,

    #[error("document has no root element")]
    NoRootElement,

    #[error("XML error at byte {position}: {message}")]
    Xml { position: u64, message: String },

    #[error("element <{name}> is never closed")]
    Unclosed { name: String },

    #[error("unexpected content after the root element at byte {position}")]
    TrailingContent { position: u64 },

    #[error("prefix 'android' is bound to '{uri}' instead of the Android namespace")]
    ForeignAndroidPrefix { uri: String },
}
