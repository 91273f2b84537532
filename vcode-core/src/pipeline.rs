//! Core plan and apply pipelines, extracted from the CLI.
//!
//! These entry points are I/O-agnostic: the host project is read through
//! [`VariantSource`] and artifacts are written through [`WritePort`]. Only the
//! manifests themselves are patched directly on disk.

use crate::ports::{VariantSource, WritePort};
use crate::settings::{ApplySettings, PlanSettings};
use anyhow::Context;
use camino::Utf8Path;
use fs_err as fs;
use tracing::debug;
use vcode_domain::{
    Activation, InvalidOverrideValue, OverrideInputs, OverrideMode, activation, plan_variants_with,
};
use vcode_edit::{PatchOptions, PatchOutcome, patch_manifest};
use vcode_render::{render_plan_md, render_report_md};
use vcode_types::diagnostics::Diagnostics;
use vcode_types::plan::{RunPlan, ToolInfo};
use vcode_types::report::{RunReport, UnitResult, UnitStatus};

/// Error type for pipeline results. Exit code 2 = invalid override value, 1 = tool error.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error(transparent)]
    InvalidOverride(#[from] InvalidOverrideValue),
    #[error("{0:#}")]
    Internal(#[from] anyhow::Error),
}

impl ToolError {
    pub fn exit_code(&self) -> u8 {
        match self {
            ToolError::InvalidOverride(_) => 2,
            ToolError::Internal(_) => 1,
        }
    }
}

/// Run the plan pipeline: gate, resolve the override value, locate manifests
/// and turn them into work units.
///
/// A gated run returns a plan whose `skipped` field holds the reason.
pub fn run_plan(
    settings: &PlanSettings,
    source: &dyn VariantSource,
    tool: ToolInfo,
    diag: &dyn Diagnostics,
) -> Result<RunPlan, ToolError> {
    let inputs = OverrideInputs::new(
        settings.legacy_build_version.clone(),
        settings.current_build_version.clone(),
    );
    let kind = source.target_kind();

    if let Activation::Skip(reason) = activation(&kind, &inputs) {
        diag.info(&format!(
            "{}: skipping version code override: {}",
            source.project(),
            reason
        ));
        return Ok(RunPlan::skipped(tool, source.project(), reason));
    }

    let value = inputs.resolve(diag)?;
    let variants = source.variants();
    debug!(
        project = source.project(),
        kind = kind.as_str(),
        variants = variants.len(),
        value,
        "planning version code override"
    );

    let mode = if settings.dry_run {
        OverrideMode::Record
    } else {
        OverrideMode::Invoke
    };
    let planned = plan_variants_with(&variants, value, mode, diag);
    if planned.units.is_empty() && planned.overrides_applied.is_empty() {
        diag.debug(&format!("{}: no manifests located", source.project()));
    }

    let mut plan = RunPlan::new(tool, source.project());
    plan.version_code = Some(value);
    plan.units = planned.units;
    plan.overrides_applied = planned.overrides_applied;
    plan.summary = planned.summary;
    Ok(plan)
}

/// Outcome of `run_apply`.
#[derive(Debug, Clone)]
pub struct ApplyOutcome {
    pub report: RunReport,
    /// Unified diff of every change, written or (in dry-run) proposed.
    pub patch: String,
}

/// Run the apply pipeline: patch every planned manifest in order.
///
/// Per-file failures are recorded in the report and never stop the rest of
/// the run.
pub fn run_apply(
    plan: &RunPlan,
    settings: &ApplySettings,
    tool: ToolInfo,
    diag: &dyn Diagnostics,
) -> Result<ApplyOutcome, ToolError> {
    let mut report = RunReport::new(tool, plan.project.clone());
    report.dry_run = settings.dry_run;
    report.version_code = plan.version_code;
    let mut patch = String::new();

    if let Some(reason) = &plan.skipped {
        report.skipped = Some(reason.clone());
        report.finalize();
        return Ok(ApplyOutcome { report, patch });
    }

    let value = plan
        .version_code
        .context("plan has no resolved version code")?;
    let opts = PatchOptions {
        dry_run: settings.dry_run,
        backup_enabled: settings.backup_enabled,
        backup_suffix: settings.backup_suffix.clone(),
    };

    for unit in &plan.units {
        let path = &unit.candidate.path;
        debug!(unit = unit.name.as_str(), path = path.as_str(), "patching manifest");

        let mut result = UnitResult {
            unit: unit.name.clone(),
            variant_name: unit.candidate.variant_name.clone(),
            path: path.clone(),
            status: UnitStatus::Missing,
            previous_value: None,
            failure: None,
            message: None,
        };

        match patch_manifest(path, value, &opts, diag) {
            Ok(PatchOutcome::Missing) => {}
            Ok(PatchOutcome::Unchanged) => {
                result.status = UnitStatus::Unchanged;
                result.previous_value = Some(value.to_string());
            }
            Ok(PatchOutcome::Updated { previous, diff, .. }) => {
                result.status = UnitStatus::Patched;
                result.previous_value = previous;
                patch.push_str(&diff);
            }
            Err(err) => {
                result.status = UnitStatus::Failed;
                result.failure = Some(err.failure_kind());
                result.message = Some(err.to_string());
            }
        }
        report.results.push(result);
    }

    report.finalize();
    Ok(ApplyOutcome { report, patch })
}

/// Read `plan.json` back from `out_dir`.
pub fn load_plan(out_dir: &Utf8Path) -> anyhow::Result<RunPlan> {
    let path = out_dir.join("plan.json");
    let raw = fs::read_to_string(&path).with_context(|| format!("read {}", path))?;
    let plan: RunPlan =
        serde_json::from_str(&raw).with_context(|| format!("parse {}", path))?;
    if plan.schema != vcode_types::schema::VCODE_PLAN_V1 {
        anyhow::bail!("{}: unsupported plan schema '{}'", path, plan.schema);
    }
    Ok(plan)
}

/// Write `plan.json` and `plan.md` to the output directory.
pub fn write_plan_artifacts(
    plan: &RunPlan,
    out_dir: &Utf8Path,
    writer: &dyn WritePort,
) -> anyhow::Result<()> {
    writer.create_dir_all(out_dir)?;

    let plan_json = serde_json::to_string_pretty(plan).context("serialize plan")?;
    writer.write_file(&out_dir.join("plan.json"), plan_json.as_bytes())?;

    let plan_md = render_plan_md(plan);
    writer.write_file(&out_dir.join("plan.md"), plan_md.as_bytes())?;

    Ok(())
}

/// Write `report.json`, `report.md` and `patch.diff` to the output directory.
pub fn write_report_artifacts(
    outcome: &ApplyOutcome,
    out_dir: &Utf8Path,
    writer: &dyn WritePort,
) -> anyhow::Result<()> {
    writer.create_dir_all(out_dir)?;

    let report_json = serde_json::to_string_pretty(&outcome.report).context("serialize report")?;
    writer.write_file(&out_dir.join("report.json"), report_json.as_bytes())?;

    let report_md = render_report_md(&outcome.report);
    writer.write_file(&out_dir.join("report.md"), report_md.as_bytes())?;

    writer.write_file(&out_dir.join("patch.diff"), outcome.patch.as_bytes())?;

    Ok(())
}
