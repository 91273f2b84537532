//! Port traits abstracting all I/O away from the pipeline.

use camino::Utf8Path;
use vcode_domain::{TargetKind, VariantOutput};

/// The host project: its kind and the variants it builds.
pub trait VariantSource {
    fn project(&self) -> &str;
    fn target_kind(&self) -> TargetKind;
    fn variants(&self) -> Vec<&dyn VariantOutput>;
}

/// File-system write operations.
pub trait WritePort {
    fn write_file(&self, path: &Utf8Path, contents: &[u8]) -> anyhow::Result<()>;
    fn create_dir_all(&self, path: &Utf8Path) -> anyhow::Result<()>;
}
