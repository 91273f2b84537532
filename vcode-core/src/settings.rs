//! Clap-free settings for plan and apply pipelines.

/// Settings for the plan pipeline.
#[derive(Debug, Clone, Default)]
pub struct PlanSettings {
    // Override inputs, raw as received from the environment.
    pub legacy_build_version: Option<String>,
    pub current_build_version: Option<String>,

    /// Record direct version-code overrides instead of invoking them.
    pub dry_run: bool,
}

/// Settings for the apply pipeline.
#[derive(Debug, Clone)]
pub struct ApplySettings {
    // Apply behaviour
    pub dry_run: bool,

    // Backups
    pub backup_enabled: bool,
    pub backup_suffix: String,
}

impl Default for ApplySettings {
    fn default() -> Self {
        Self {
            dry_run: false,
            backup_enabled: false,
            backup_suffix: ".vcode.bak".to_string(),
        }
    }
}
