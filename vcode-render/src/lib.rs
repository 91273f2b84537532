//! Rendering helpers (markdown) for human-readable artifacts.

use vcode_types::plan::RunPlan;
use vcode_types::report::{FailureKind, RunReport, UnitStatus, VerdictStatus};

pub fn render_plan_md(plan: &RunPlan) -> String {
    let mut out = String::new();
    out.push_str("# vcode plan\n\n");
    out.push_str(&format!("- Project: `{}`\n", plan.project));

    if let Some(reason) = &plan.skipped {
        out.push_str(&format!("- Skipped: {}\n", reason));
        return out;
    }

    if let Some(value) = plan.version_code {
        out.push_str(&format!("- Version code: `{}`\n", value));
    }
    out.push_str(&format!(
        "- Variants: {}\n- Work units: {}\n- Direct overrides: {}\n\n",
        plan.summary.variants, plan.summary.units, plan.summary.overrides_applied
    ));

    if !plan.overrides_applied.is_empty() {
        out.push_str("## Direct overrides\n\n");
        for variant in &plan.overrides_applied {
            out.push_str(&format!("- `{}`\n", variant));
        }
        out.push('\n');
    }

    out.push_str("## Work units\n\n");
    if plan.units.is_empty() {
        out.push_str("_No manifests located._\n");
        return out;
    }

    for (i, unit) in plan.units.iter().enumerate() {
        out.push_str(&format!("### {}. {}\n\n", i + 1, unit.name));
        out.push_str(&format!("- Variant: `{}`\n", unit.candidate.variant_name));
        out.push_str(&format!("- Path: `{}`\n", unit.candidate.path));
        out.push_str(&format!("- Source: `{}`\n", unit.candidate.source.label()));
        out.push_str(&format!("- After: `{}`\n", unit.after));
        if !unit.before.is_empty() {
            let before: Vec<String> = unit.before.iter().map(|b| format!("`{b}`")).collect();
            out.push_str(&format!("- Before: {}\n", before.join(", ")));
        }
        out.push('\n');
    }

    out
}

pub fn render_report_md(report: &RunReport) -> String {
    let mut out = String::new();
    out.push_str("# vcode report\n\n");
    out.push_str(&format!(
        "- Verdict: `{}`\n",
        verdict_label(report.verdict.status)
    ));
    if let Some(reason) = &report.skipped {
        out.push_str(&format!("- Skipped: {}\n", reason));
        return out;
    }
    if let Some(value) = report.version_code {
        out.push_str(&format!("- Version code: `{}`\n", value));
    }
    if report.dry_run {
        out.push_str("- Mode: dry run (no files written)\n");
    }

    let c = &report.verdict.counts;
    out.push_str(&format!(
        "- Patched: {}\n- Unchanged: {}\n- Missing: {}\n- Failed: {}\n\n",
        c.patched, c.unchanged, c.missing, c.failed
    ));

    out.push_str("## Results\n\n");
    if report.results.is_empty() {
        out.push_str("_No results._\n");
        return out;
    }

    out.push_str("| Unit | Variant | Status | Previous | Path |\n");
    out.push_str("|---|---|---|---|---|\n");
    for r in &report.results {
        out.push_str(&format!(
            "| {} | {} | {} | {} | `{}` |\n",
            r.unit,
            r.variant_name,
            status_label(r.status, r.failure),
            r.previous_value.as_deref().unwrap_or("-"),
            r.path
        ));
    }

    let failures: Vec<_> = report
        .results
        .iter()
        .filter(|r| r.status == UnitStatus::Failed)
        .collect();
    if !failures.is_empty() {
        out.push_str("\n## Failures\n\n");
        for r in failures {
            out.push_str(&format!(
                "- `{}`: {}\n",
                r.path,
                r.message.as_deref().unwrap_or("unknown error")
            ));
        }
    }

    out
}

fn verdict_label(s: VerdictStatus) -> &'static str {
    match s {
        VerdictStatus::Pass => "pass",
        VerdictStatus::Fail => "fail",
        VerdictStatus::Skip => "skip",
    }
}

fn status_label(s: UnitStatus, failure: Option<FailureKind>) -> &'static str {
    match (s, failure) {
        (UnitStatus::Patched, _) => "patched",
        (UnitStatus::Unchanged, _) => "unchanged",
        (UnitStatus::Missing, _) => "missing",
        (UnitStatus::Failed, Some(FailureKind::MalformedManifest)) => "failed (malformed)",
        (UnitStatus::Failed, Some(FailureKind::ReadFailure)) => "failed (read)",
        (UnitStatus::Failed, Some(FailureKind::WriteFailure)) => "failed (write)",
        (UnitStatus::Failed, None) => "failed",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use vcode_types::candidate::{CandidateSource, ManifestCandidate};
    use vcode_types::plan::{PlanSummary, SkipReason, ToolInfo, WorkUnit};
    use vcode_types::report::UnitResult;

    fn tool() -> ToolInfo {
        ToolInfo {
            name: "vcode".into(),
            version: Some("0.1.0".into()),
        }
    }

    fn unit() -> WorkUnit {
        WorkUnit {
            name: "overrideReleaseVersionCode0".into(),
            candidate: ManifestCandidate {
                path: "build/merged/release/AndroidManifest.xml".into(),
                variant_name: "release".into(),
                sequence_index: 0,
                source: CandidateSource::OutputDirectory,
                step: "processReleaseManifest".into(),
            },
            after: "processReleaseManifest".into(),
            before: vec!["processReleaseResources".into()],
        }
    }

    #[test]
    fn plan_lists_units() {
        let mut plan = RunPlan::new(tool(), "app");
        plan.version_code = Some(42);
        plan.units = vec![unit()];
        plan.summary = PlanSummary {
            variants: 1,
            units: 1,
            overrides_applied: 0,
        };

        let md = render_plan_md(&plan);
        assert!(md.contains("- Version code: `42`"));
        assert!(md.contains("### 1. overrideReleaseVersionCode0"));
        assert!(md.contains("- Source: `output_directory`"));
        assert!(md.contains("- Before: `processReleaseResources`"));
    }

    #[test]
    fn skipped_plan_is_short() {
        let plan = RunPlan::skipped(tool(), "lib", SkipReason::NoOverrideValue);
        assert_eq!(
            render_plan_md(&plan),
            "# vcode plan\n\n- Project: `lib`\n- Skipped: no override value supplied\n"
        );
    }

    #[test]
    fn empty_plan_says_so() {
        let plan = RunPlan::new(tool(), "app");
        assert!(render_plan_md(&plan).contains("_No manifests located._"));
    }

    #[test]
    fn report_table_and_failures() {
        let mut report = RunReport::new(tool(), "app");
        report.version_code = Some(7);
        report.results = vec![
            UnitResult {
                unit: "overrideReleaseVersionCode0".into(),
                variant_name: "release".into(),
                path: "a/AndroidManifest.xml".into(),
                status: UnitStatus::Patched,
                previous_value: Some("1".into()),
                failure: None,
                message: None,
            },
            UnitResult {
                unit: "overrideReleaseVersionCode1".into(),
                variant_name: "release".into(),
                path: "b/AndroidManifest.xml".into(),
                status: UnitStatus::Failed,
                previous_value: None,
                failure: Some(FailureKind::MalformedManifest),
                message: Some("document has no root element".into()),
            },
        ];
        report.finalize();

        let md = render_report_md(&report);
        assert!(md.contains("- Verdict: `fail`"));
        assert!(md.contains("- Patched: 1\n"));
        assert!(md.contains(
            "| overrideReleaseVersionCode0 | release | patched | 1 | `a/AndroidManifest.xml` |"
        ));
        assert!(md.contains("failed (malformed)"));
        assert!(md.contains("- `b/AndroidManifest.xml`: document has no root element"));
    }
}
