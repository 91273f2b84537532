//! File-level behaviour of `patch` / `patch_manifest`.

use camino::{Utf8Path, Utf8PathBuf};
use fs_err as fs;
use pretty_assertions::assert_eq;
use tempfile::TempDir;
use vcode_edit::{MalformedManifest, PatchError, PatchOptions, PatchOutcome, patch, patch_manifest};
use vcode_types::diagnostics::{RecordingDiagnostics, Severity};
use vcode_types::report::FailureKind;

const MANIFEST: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<manifest xmlns:android="http://schemas.android.com/apk/res/android"
    package="com.example"
    android:versionCode="1">
    <application />
</manifest>
"#;

fn sandbox() -> (TempDir, Utf8PathBuf) {
    let temp = TempDir::new().expect("temp dir");
    let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).expect("utf8 temp");
    (temp, root)
}

fn write(path: &Utf8Path, contents: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent");
    }
    fs::write(path, contents).expect("write fixture");
}

#[test]
fn missing_file_is_a_noop() {
    let (_temp, root) = sandbox();
    let path = root.join("merged/AndroidManifest.xml");
    let diag = RecordingDiagnostics::new();

    let outcome = patch(&path, 42, &diag).expect("missing is not an error");

    assert_eq!(outcome, PatchOutcome::Missing);
    assert!(!path.exists());
    assert!(!root.join("merged").exists());
    assert_eq!(diag.count(Severity::Debug), 1);
}

#[test]
fn patches_exact_value_and_preserves_rest() {
    let (_temp, root) = sandbox();
    let path = root.join("AndroidManifest.xml");
    write(&path, MANIFEST);

    let outcome = patch(&path, 42, &RecordingDiagnostics::new()).expect("patch");

    let after = fs::read_to_string(&path).expect("read back");
    assert_eq!(after, MANIFEST.replace("android:versionCode=\"1\"", "android:versionCode=\"42\""));
    match outcome {
        PatchOutcome::Updated {
            previous,
            diff,
            written,
        } => {
            assert_eq!(previous.as_deref(), Some("1"));
            assert!(written);
            assert!(diff.contains("+    android:versionCode=\"42\">"));
        }
        other => panic!("unexpected outcome {other:?}"),
    }
}

#[test]
fn second_pass_is_byte_identical() {
    let (_temp, root) = sandbox();
    let path = root.join("AndroidManifest.xml");
    write(&path, MANIFEST);

    patch(&path, 7, &RecordingDiagnostics::new()).expect("first pass");
    let first = fs::read(&path).expect("read first");
    let outcome = patch(&path, 7, &RecordingDiagnostics::new()).expect("second pass");
    let second = fs::read(&path).expect("read second");

    assert_eq!(outcome, PatchOutcome::Unchanged);
    assert_eq!(first, second);
}

#[test]
fn malformed_file_is_left_untouched() {
    let (_temp, root) = sandbox();
    let path = root.join("AndroidManifest.xml");
    let broken = "<manifest xmlns:android=\"http://schemas.android.com/apk/res/android\" android:versionCode=\"1\"><application>";
    write(&path, broken);
    let diag = RecordingDiagnostics::new();

    let err = patch(&path, 42, &diag).unwrap_err();

    assert_eq!(err.failure_kind(), FailureKind::MalformedManifest);
    assert!(matches!(
        err,
        PatchError::Malformed {
            source: MalformedManifest::Unclosed { .. },
            ..
        }
    ));
    assert_eq!(fs::read_to_string(&path).expect("read"), broken);
    assert_eq!(diag.count(Severity::Error), 1);
}

#[test]
fn empty_file_is_malformed() {
    let (_temp, root) = sandbox();
    let path = root.join("AndroidManifest.xml");
    write(&path, "");

    let err = patch(&path, 1, &RecordingDiagnostics::new()).unwrap_err();
    assert!(matches!(
        err,
        PatchError::Malformed {
            source: MalformedManifest::NoRootElement,
            ..
        }
    ));
}

#[test]
fn non_utf8_is_malformed() {
    let (_temp, root) = sandbox();
    let path = root.join("AndroidManifest.xml");
    fs::write(&path, [0x3c, 0xff, 0xfe, 0x3e]).expect("write bytes");

    let err = patch(&path, 1, &RecordingDiagnostics::new()).unwrap_err();
    assert!(matches!(
        err,
        PatchError::Malformed {
            source: MalformedManifest::NotUtf8,
            ..
        }
    ));
}

#[test]
fn malformed_sibling_does_not_affect_valid_one() {
    let (_temp, root) = sandbox();
    let good = root.join("merged/AndroidManifest.xml");
    let bad = root.join("bundle/AndroidManifest.xml");
    write(&good, MANIFEST);
    write(&bad, "<manifest");

    let diag = RecordingDiagnostics::new();
    let results: Vec<_> = [&bad, &good].iter().map(|p| patch(p, 5, &diag)).collect();

    assert!(results[0].is_err());
    assert!(matches!(results[1], Ok(PatchOutcome::Updated { .. })));
    assert!(fs::read_to_string(&good).expect("read").contains("android:versionCode=\"5\""));
    assert_eq!(fs::read_to_string(&bad).expect("read"), "<manifest");
}

#[test]
fn dry_run_reports_diff_without_writing() {
    let (_temp, root) = sandbox();
    let path = root.join("AndroidManifest.xml");
    write(&path, MANIFEST);
    let opts = PatchOptions {
        dry_run: true,
        ..PatchOptions::default()
    };

    let outcome = patch_manifest(&path, 99, &opts, &RecordingDiagnostics::new()).expect("dry run");

    assert!(matches!(outcome, PatchOutcome::Updated { written: false, .. }));
    assert_eq!(fs::read_to_string(&path).expect("read"), MANIFEST);
}

#[test]
fn backup_keeps_original() {
    let (_temp, root) = sandbox();
    let path = root.join("AndroidManifest.xml");
    write(&path, MANIFEST);
    let opts = PatchOptions {
        backup_enabled: true,
        backup_suffix: ".orig".to_string(),
        ..PatchOptions::default()
    };

    patch_manifest(&path, 3, &opts, &RecordingDiagnostics::new()).expect("patch");

    let backup = root.join("AndroidManifest.xml.orig");
    assert_eq!(fs::read_to_string(&backup).expect("read backup"), MANIFEST);
    assert!(fs::read_to_string(&path).expect("read").contains("android:versionCode=\"3\""));
}

#[test]
fn unchanged_file_gets_no_backup() {
    let (_temp, root) = sandbox();
    let path = root.join("AndroidManifest.xml");
    write(&path, MANIFEST);
    let opts = PatchOptions {
        backup_enabled: true,
        ..PatchOptions::default()
    };

    let outcome = patch_manifest(&path, 1, &opts, &RecordingDiagnostics::new()).expect("patch");

    assert_eq!(outcome, PatchOutcome::Unchanged);
    assert!(!root.join("AndroidManifest.xml.vcode.bak").exists());
}

#[test]
fn directory_at_path_is_a_read_failure() {
    let (_temp, root) = sandbox();
    let path = root.join("AndroidManifest.xml");
    fs::create_dir_all(&path).expect("mkdir");

    let err = patch(&path, 1, &RecordingDiagnostics::new()).unwrap_err();
    assert_eq!(err.failure_kind(), FailureKind::ReadFailure);
}
