use camino::Utf8PathBuf;
use cucumber::{given, then, when, World};
use fs_err as fs;
use tempfile::TempDir;
use vcode_bdd::merged_manifest;
use vcode_core::adapters::FsVariantSource;
use vcode_core::pipeline::{ApplyOutcome, ToolError, run_apply, run_plan};
use vcode_core::settings::{ApplySettings, PlanSettings};
use vcode_types::diagnostics::{RecordingDiagnostics, Severity};
use vcode_types::plan::ToolInfo;
use vcode_types::report::VerdictStatus;

const PACKAGE: &str = "com.example.app";

#[derive(Debug, Default, World)]
pub struct VcodeWorld {
    temp: Option<TempDir>,
    root: Option<Utf8PathBuf>,
    variants: Vec<String>,
    legacy: Option<String>,
    current: Option<String>,
    diag: RecordingDiagnostics,
    result: Option<Result<ApplyOutcome, ToolError>>,
}

fn root(world: &VcodeWorld) -> &Utf8PathBuf {
    world.root.as_ref().expect("project root set")
}

fn manifest_path(world: &VcodeWorld, variant: &str) -> Utf8PathBuf {
    root(world)
        .join("build/merged")
        .join(variant)
        .join("AndroidManifest.xml")
}

fn outcome(world: &VcodeWorld) -> &ApplyOutcome {
    match world.result.as_ref().expect("override ran") {
        Ok(outcome) => outcome,
        Err(err) => panic!("override failed: {err}"),
    }
}

fn create_project(world: &mut VcodeWorld, kind: &str, variants: &str) {
    let td = tempfile::tempdir().expect("tempdir");
    let root = Utf8PathBuf::from_path_buf(td.path().to_path_buf()).unwrap();
    let variants: Vec<String> = variants.split(',').map(|v| v.trim().to_string()).collect();

    let entries: Vec<serde_json::Value> = variants
        .iter()
        .map(|v| {
            let mut upper = v.clone();
            if let Some(first) = upper.get_mut(0..1) {
                first.make_ascii_uppercase();
            }
            serde_json::json!({
                "name": v,
                "consumers": [format!("process{upper}Resources")],
                "manifest_steps": [{
                    "name": format!("process{upper}Manifest"),
                    "properties": {
                        "manifest_output_directory": format!("build/merged/{v}")
                    }
                }]
            })
        })
        .collect();
    let outputs = serde_json::json!({
        "project": "app",
        "kind": kind,
        "variants": entries,
    });
    fs::write(
        root.join("variant-outputs.json"),
        serde_json::to_string_pretty(&outputs).unwrap(),
    )
    .unwrap();

    world.temp = Some(td);
    world.root = Some(root);
    world.variants = variants;
    for v in world.variants.clone() {
        let path = manifest_path(world, &v);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, merged_manifest(PACKAGE, 1)).unwrap();
    }
}

fn run_override(world: &mut VcodeWorld, dry_run: bool) {
    let source =
        FsVariantSource::load(&root(world).join("variant-outputs.json")).expect("load outputs");
    let tool = ToolInfo {
        name: "vcode".into(),
        version: None,
    };
    let plan_settings = PlanSettings {
        legacy_build_version: world.legacy.clone(),
        current_build_version: world.current.clone(),
        dry_run,
    };
    let apply_settings = ApplySettings {
        dry_run,
        ..ApplySettings::default()
    };

    let diag = RecordingDiagnostics::new();
    let result = run_plan(&plan_settings, &source, tool.clone(), &diag)
        .and_then(|plan| run_apply(&plan, &apply_settings, tool, &diag));
    world.diag = diag;
    world.result = Some(result);
}

// ============================================================================
// Given
// ============================================================================

#[given(expr = "an application project with variants {string}")]
async fn application_project(world: &mut VcodeWorld, variants: String) {
    create_project(world, "application", &variants);
}

#[given(expr = "a library project with variants {string}")]
async fn library_project(world: &mut VcodeWorld, variants: String) {
    create_project(world, "library", &variants);
}

#[given(expr = "LEGACY_BUILD_VERSION is {string}")]
async fn legacy_input(world: &mut VcodeWorld, value: String) {
    world.legacy = Some(value);
}

#[given(expr = "CURRENT_BUILD_VERSION is {string}")]
async fn current_input(world: &mut VcodeWorld, value: String) {
    world.current = Some(value);
}

#[given(expr = "the {string} manifest is malformed")]
async fn malformed_manifest(world: &mut VcodeWorld, variant: String) {
    fs::write(manifest_path(world, &variant), "<manifest><application>").unwrap();
}

// ============================================================================
// When
// ============================================================================

#[when("I run the override")]
async fn run(world: &mut VcodeWorld) {
    run_override(world, false);
}

#[when("I run the override as a dry run")]
async fn run_dry(world: &mut VcodeWorld) {
    run_override(world, true);
}

// ============================================================================
// Then
// ============================================================================

#[then("the run succeeds")]
async fn run_succeeds(world: &mut VcodeWorld) {
    assert_eq!(outcome(world).report.verdict.status, VerdictStatus::Pass);
}

#[then("the run is skipped")]
async fn run_skipped(world: &mut VcodeWorld) {
    let report = &outcome(world).report;
    assert_eq!(report.verdict.status, VerdictStatus::Skip);
    assert!(report.skipped.is_some());
    assert!(report.results.is_empty());
}

#[then("the run fails with an invalid override value")]
async fn run_invalid(world: &mut VcodeWorld) {
    match world.result.as_ref().expect("override ran") {
        Err(err @ ToolError::InvalidOverride(_)) => assert_eq!(err.exit_code(), 2),
        other => panic!("expected an invalid override value, got {other:?}"),
    }
}

#[then(expr = "every manifest has versionCode {string}")]
async fn every_manifest_has(world: &mut VcodeWorld, value: String) {
    let needle = format!("android:versionCode=\"{value}\"");
    for v in &world.variants {
        let text = fs::read_to_string(manifest_path(world, v)).unwrap();
        assert!(text.contains(&needle), "{v} manifest lacks {needle}:\n{text}");
    }
}

#[then(expr = "the {string} manifest has versionCode {string}")]
async fn manifest_has(world: &mut VcodeWorld, variant: String, value: String) {
    let text = fs::read_to_string(manifest_path(world, &variant)).unwrap();
    assert!(text.contains(&format!("android:versionCode=\"{value}\"")));
}

#[then("no manifest was modified")]
async fn none_modified(world: &mut VcodeWorld) {
    let original = merged_manifest(PACKAGE, 1);
    for v in &world.variants {
        assert_eq!(fs::read_to_string(manifest_path(world, v)).unwrap(), original);
    }
}

#[then(regex = r"^the report counts (\d+) (patched|unchanged|missing|failed) manifests?$")]
async fn report_counts(world: &mut VcodeWorld, count: u64, status: String) {
    let counts = &outcome(world).report.verdict.counts;
    let actual = match status.as_str() {
        "patched" => counts.patched,
        "unchanged" => counts.unchanged,
        "missing" => counts.missing,
        _ => counts.failed,
    };
    assert_eq!(actual, count, "{status} count");
}

#[then(regex = r"^(\d+) warnings? (?:was|were) reported$")]
async fn warnings_reported(world: &mut VcodeWorld, count: usize) {
    assert_eq!(world.diag.count(Severity::Warn), count);
}

#[then("no warning was reported")]
async fn no_warnings(world: &mut VcodeWorld) {
    assert_eq!(world.diag.count(Severity::Warn), 0);
}

#[then(expr = "the patch preview mentions versionCode {string}")]
async fn preview_mentions(world: &mut VcodeWorld, value: String) {
    let patch = &outcome(world).patch;
    assert!(patch.contains(&format!("+    android:versionCode=\"{value}\"")));
}

#[tokio::main]
async fn main() {
    let features_path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("features");
    VcodeWorld::cucumber().run(features_path).await;
}
