use crate::plan::{SkipReason, ToolInfo};
use camino::Utf8PathBuf;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub schema: String,
    pub tool: ToolInfo,
    pub project: String,
    pub run: RunInfo,
    pub verdict: Verdict,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skipped: Option<SkipReason>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_code: Option<u32>,

    pub dry_run: bool,

    #[serde(default)]
    pub results: Vec<UnitResult>,
}

impl RunReport {
    pub fn new(tool: ToolInfo, project: impl Into<String>) -> Self {
        Self {
            schema: crate::schema::VCODE_REPORT_V1.to_string(),
            tool,
            project: project.into(),
            run: RunInfo {
                started_at: Utc::now(),
                ended_at: None,
            },
            verdict: Verdict::default(),
            skipped: None,
            version_code: None,
            dry_run: false,
            results: vec![],
        }
    }

    /// Recompute counts and status from `results` / `skipped`.
    pub fn finalize(&mut self) {
        let mut counts = UnitCounts::default();
        for r in &self.results {
            match r.status {
                UnitStatus::Patched => counts.patched += 1,
                UnitStatus::Unchanged => counts.unchanged += 1,
                UnitStatus::Missing => counts.missing += 1,
                UnitStatus::Failed => counts.failed += 1,
            }
        }

        self.verdict.status = if self.skipped.is_some() {
            VerdictStatus::Skip
        } else if counts.failed > 0 {
            VerdictStatus::Fail
        } else {
            VerdictStatus::Pass
        };
        self.verdict.counts = counts;
        self.run.ended_at = Some(Utc::now());
    }

    pub fn has_failures(&self) -> bool {
        self.results.iter().any(|r| r.status == UnitStatus::Failed)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunInfo {
    pub started_at: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerdictStatus {
    #[default]
    Pass,
    Fail,
    Skip,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Verdict {
    pub status: VerdictStatus,
    pub counts: UnitCounts,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitCounts {
    pub patched: u64,
    pub unchanged: u64,
    pub missing: u64,
    pub failed: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitStatus {
    /// The attribute was rewritten (or would be, in dry-run).
    Patched,
    /// The attribute already held the target value.
    Unchanged,
    /// Nothing exists at the candidate path.
    Missing,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    MalformedManifest,
    ReadFailure,
    WriteFailure,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitResult {
    pub unit: String,
    pub variant_name: String,
    pub path: Utf8PathBuf,
    pub status: UnitStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_value: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<FailureKind>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
