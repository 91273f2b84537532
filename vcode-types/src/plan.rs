use crate::candidate::ManifestCandidate;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolInfo {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// Why a run did nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
    /// The project is not an application or dynamic-feature target.
    UnsupportedTarget { kind: String },
    /// Neither override input was supplied.
    NoOverrideValue,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::UnsupportedTarget { kind } => {
                write!(f, "target kind '{}' is not an application or dynamic feature", kind)
            }
            SkipReason::NoOverrideValue => write!(f, "no override value supplied"),
        }
    }
}

/// One deferred patch invocation for the host scheduler.
///
/// `after` must complete before the unit runs; every step in `before` must
/// wait for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkUnit {
    pub name: String,
    pub candidate: ManifestCandidate,
    pub after: String,

    #[serde(default)]
    pub before: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanSummary {
    pub variants: u64,
    pub units: u64,
    pub overrides_applied: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunPlan {
    pub schema: String,
    pub tool: ToolInfo,
    pub project: String,
    pub created_at: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skipped: Option<SkipReason>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_code: Option<u32>,

    #[serde(default)]
    pub units: Vec<WorkUnit>,

    /// Variants whose manifest step accepted the value directly.
    #[serde(default)]
    pub overrides_applied: Vec<String>,

    pub summary: PlanSummary,
}

impl RunPlan {
    pub fn new(tool: ToolInfo, project: impl Into<String>) -> Self {
        Self {
            schema: crate::schema::VCODE_PLAN_V1.to_string(),
            tool,
            project: project.into(),
            created_at: Utc::now(),
            skipped: None,
            version_code: None,
            units: vec![],
            overrides_applied: vec![],
            summary: PlanSummary::default(),
        }
    }

    pub fn skipped(tool: ToolInfo, project: impl Into<String>, reason: SkipReason) -> Self {
        let mut plan = Self::new(tool, project);
        plan.skipped = Some(reason);
        plan
    }

    pub fn is_skipped(&self) -> bool {
        self.skipped.is_some()
    }
}
