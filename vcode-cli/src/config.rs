//! Configuration file loading for vcode.
//!
//! Discovers and loads `vcode.toml` from the project root.
//! Merges config file settings with CLI arguments (CLI takes precedence).

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use fs_err as fs;
use serde::Deserialize;
use tracing::debug;

/// The config file name to search for.
pub const CONFIG_FILE_NAME: &str = "vcode.toml";

/// Default variant outputs description, relative to the project root.
pub const DEFAULT_OUTPUTS: &str = "variant-outputs.json";

/// Default artifacts directory, relative to the project root.
pub const DEFAULT_OUT_DIR: &str = "artifacts/vcode";

/// Top-level configuration from vcode.toml.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct VcodeConfig {
    pub run: RunConfig,

    /// Backup settings.
    pub backups: BackupsConfig,
}

/// Run section of the config. Relative paths resolve against the project root.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub outputs: Option<Utf8PathBuf>,

    pub out_dir: Option<Utf8PathBuf>,

    /// Exit non-zero when any manifest fails to patch.
    pub fail_on_error: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            outputs: None,
            out_dir: None,
            fail_on_error: true,
        }
    }
}

/// Backups section of the config.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BackupsConfig {
    /// Whether to copy each manifest aside before rewriting it.
    pub enabled: bool,

    /// Suffix for backup files.
    pub suffix: String,
}

impl Default for BackupsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            suffix: ".vcode.bak".to_string(),
        }
    }
}

/// Discover the vcode.toml config file.
///
/// Returns `None` if no config file is found.
pub fn discover_config(project_root: &Utf8Path) -> Option<Utf8PathBuf> {
    let config_path = project_root.join(CONFIG_FILE_NAME);
    if config_path.exists() {
        debug!("found config file at {}", config_path);
        Some(config_path)
    } else {
        debug!("no config file found at {}", config_path);
        None
    }
}

/// Load and parse a vcode.toml config file.
pub fn load_config(path: &Utf8Path) -> anyhow::Result<VcodeConfig> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("read config file {}", path))?;
    parse_config(&contents).with_context(|| format!("parse config file {}", path))
}

/// Parse a config file from a string.
pub fn parse_config(contents: &str) -> anyhow::Result<VcodeConfig> {
    let config: VcodeConfig = toml::from_str(contents).context("invalid TOML")?;
    Ok(config)
}

/// Load config from the project root, or return default if not found.
pub fn load_or_default(project_root: &Utf8Path) -> anyhow::Result<VcodeConfig> {
    match discover_config(project_root) {
        Some(path) => load_config(&path),
        None => Ok(VcodeConfig::default()),
    }
}

/// Merged configuration combining config file and CLI arguments.
#[derive(Debug, Clone)]
pub struct MergedConfig {
    pub outputs: Utf8PathBuf,
    pub out_dir: Utf8PathBuf,
    pub fail_on_error: bool,
    pub backups: BackupsConfig,
}

/// CLI values that can override the config file.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub outputs: Option<Utf8PathBuf>,
    pub out_dir: Option<Utf8PathBuf>,
    pub backup: bool,
    pub no_backup: bool,
    pub no_fail_on_error: bool,
}

/// Builder for merging config file with CLI arguments.
pub struct ConfigMerger {
    config: VcodeConfig,
}

impl ConfigMerger {
    /// Create a new merger from a loaded config.
    pub fn new(config: VcodeConfig) -> Self {
        Self { config }
    }

    /// CLI paths are used as given; config paths are joined to `project_root`.
    pub fn merge(self, project_root: &Utf8Path, cli: &CliOverrides) -> MergedConfig {
        let from_root = |p: Utf8PathBuf| {
            if p.is_absolute() {
                p
            } else {
                project_root.join(p)
            }
        };

        let outputs = match &cli.outputs {
            Some(p) => p.clone(),
            None => from_root(
                self.config
                    .run
                    .outputs
                    .clone()
                    .unwrap_or_else(|| DEFAULT_OUTPUTS.into()),
            ),
        };
        let out_dir = match &cli.out_dir {
            Some(p) => p.clone(),
            None => from_root(
                self.config
                    .run
                    .out_dir
                    .clone()
                    .unwrap_or_else(|| DEFAULT_OUT_DIR.into()),
            ),
        };

        let mut backups = self.config.backups;
        if cli.backup {
            backups.enabled = true;
        }
        if cli.no_backup {
            backups.enabled = false;
        }

        MergedConfig {
            outputs,
            out_dir,
            fail_on_error: self.config.run.fail_on_error && !cli.no_fail_on_error,
            backups,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_parse_full_config() {
        let contents = r#"
[run]
outputs = "build/variant-outputs.json"
out_dir = "/tmp/vcode"
fail_on_error = false

[backups]
enabled = true
suffix = ".orig"
"#;

        let config = parse_config(contents).unwrap();
        assert_eq!(
            config.run.outputs.as_deref(),
            Some(Utf8Path::new("build/variant-outputs.json"))
        );
        assert!(!config.run.fail_on_error);
        assert!(config.backups.enabled);
        assert_eq!(config.backups.suffix, ".orig");
    }

    #[test]
    fn test_parse_empty_config() {
        let config = parse_config("").unwrap();
        assert!(config.run.outputs.is_none());
        assert!(config.run.fail_on_error);
        assert!(!config.backups.enabled);
        assert_eq!(config.backups.suffix, ".vcode.bak");
    }

    #[test]
    fn test_parse_rejects_bad_types() {
        assert!(parse_config("[run]\nfail_on_error = \"yes\"\n").is_err());
    }

    #[test]
    fn test_merge_defaults_under_project_root() {
        let merged = ConfigMerger::new(VcodeConfig::default())
            .merge(Utf8Path::new("app"), &CliOverrides::default());
        assert_eq!(merged.outputs, Utf8PathBuf::from("app/variant-outputs.json"));
        assert_eq!(merged.out_dir, Utf8PathBuf::from("app/artifacts/vcode"));
        assert!(merged.fail_on_error);
        assert!(!merged.backups.enabled);
    }

    #[test]
    fn test_merge_config_paths_and_absolute_out_dir() {
        let config =
            parse_config("[run]\noutputs = \"b/o.json\"\nout_dir = \"/abs/out\"\n").unwrap();
        let merged =
            ConfigMerger::new(config).merge(Utf8Path::new("root"), &CliOverrides::default());
        assert_eq!(merged.outputs, Utf8PathBuf::from("root/b/o.json"));
        assert_eq!(merged.out_dir, Utf8PathBuf::from("/abs/out"));
    }

    #[test]
    fn test_merge_cli_takes_precedence() {
        let config =
            parse_config("[run]\noutputs = \"cfg.json\"\n[backups]\nenabled = true\n").unwrap();
        let cli = CliOverrides {
            outputs: Some("cli.json".into()),
            out_dir: Some("cli-out".into()),
            no_backup: true,
            no_fail_on_error: true,
            ..CliOverrides::default()
        };
        let merged = ConfigMerger::new(config).merge(Utf8Path::new("root"), &cli);
        assert_eq!(merged.outputs, Utf8PathBuf::from("cli.json"));
        assert_eq!(merged.out_dir, Utf8PathBuf::from("cli-out"));
        assert!(!merged.backups.enabled);
        assert!(!merged.fail_on_error);
    }

    #[test]
    fn test_merge_cli_enables_backups() {
        let cli = CliOverrides {
            backup: true,
            ..CliOverrides::default()
        };
        let merged = ConfigMerger::new(VcodeConfig::default()).merge(Utf8Path::new("."), &cli);
        assert!(merged.backups.enabled);
        assert_eq!(merged.backups.suffix, ".vcode.bak");
    }

    #[test]
    fn test_discover_config_some_and_none() {
        let temp = TempDir::new().expect("temp dir");
        let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).expect("utf8");
        assert!(discover_config(&root).is_none());

        std::fs::write(root.join(CONFIG_FILE_NAME), "").expect("write config");
        assert!(discover_config(&root).is_some());
    }

    #[test]
    fn test_load_or_default_returns_default_when_missing() {
        let temp = TempDir::new().expect("temp dir");
        let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).expect("utf8");
        let cfg = load_or_default(&root).expect("load default");
        assert!(cfg.run.fail_on_error);
        assert!(!cfg.backups.enabled);
    }

    #[test]
    fn test_load_config_names_file_on_error() {
        let temp = TempDir::new().expect("temp dir");
        let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).expect("utf8");
        std::fs::write(root.join(CONFIG_FILE_NAME), "[run\n").expect("write config");

        let err = load_or_default(&root).unwrap_err();
        assert!(format!("{err:#}").contains(CONFIG_FILE_NAME));
    }
}
