//! BDD harness (cucumber-rs).
//!
//! This crate exists to keep scenario tests isolated from the production crates.

/// A merged manifest as the host build would leave it.
pub fn merged_manifest(package: &str, version_code: u32) -> String {
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<manifest xmlns:android="http://schemas.android.com/apk/res/android"
    package="{package}"
    android:versionCode="{version_code}"
    android:versionName="1.0">
    <application android:label="Example" />
</manifest>
"#
    )
}
