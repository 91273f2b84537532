//! Shared DTOs (schemas-as-code) for the vcode workspace.
//!
//! # Design constraints
//! - Plan and report types are serialized to disk and read back by `vcode apply`.
//! - Be conservative with breaking changes.
//! - Prefer adding optional fields over changing semantics.

pub mod candidate;
pub mod diagnostics;
pub mod plan;
pub mod report;

/// Schema identifiers.
pub mod schema {
    pub const VCODE_PLAN_V1: &str = "vcode.plan.v1";
    pub const VCODE_REPORT_V1: &str = "vcode.report.v1";
}

/// XML namespace of Android platform attributes.
pub const ANDROID_NAMESPACE: &str = "http://schemas.android.com/apk/res/android";

/// Local name of the attribute rewritten on the manifest root element.
pub const VERSION_CODE_ATTRIBUTE: &str = "versionCode";

/// File name the directory output convention places inside its directory.
pub const MANIFEST_FILE_NAME: &str = "AndroidManifest.xml";
