mod config;

use anyhow::Context;
use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};
use config::{CliOverrides, ConfigMerger, MergedConfig};
use std::process::ExitCode;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;
use vcode_core::adapters::{FsVariantSource, FsWritePort, TracingDiagnostics};
use vcode_core::pipeline::{
    ApplyOutcome, ToolError, load_plan, run_apply, run_plan, write_plan_artifacts,
    write_report_artifacts,
};
use vcode_core::settings::{ApplySettings, PlanSettings};
use vcode_domain::OverrideInputs;
use vcode_edit::{PatchOptions, PatchOutcome, patch_manifest};
use vcode_types::plan::{RunPlan, ToolInfo};

#[derive(Debug, Parser)]
#[command(
    name = "vcode",
    version,
    about = "Override android:versionCode in generated Android manifests."
)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Resolve and print the override value from the environment.
    Resolve(OverrideArgs),
    /// Locate manifests and write a work-unit plan.
    Plan(PlanArgs),
    /// Patch every manifest of an existing plan.
    Apply(ApplyArgs),
    /// Plan and apply in one step.
    Run(RunArgs),
    /// Patch a single manifest file.
    Patch(PatchArgs),
}

#[derive(Debug, Clone, Args)]
struct OverrideArgs {
    /// Deprecated override input; use --current-build-version instead.
    #[arg(long, env = "LEGACY_BUILD_VERSION")]
    legacy_build_version: Option<String>,

    /// Version code to write into every manifest.
    #[arg(long, env = "CURRENT_BUILD_VERSION")]
    current_build_version: Option<String>,
}

#[derive(Debug, Clone, Args)]
struct ProjectArgs {
    /// Project root holding vcode.toml (default: current directory).
    #[arg(long, default_value = ".")]
    project_root: Utf8PathBuf,

    /// Output directory for vcode artifacts (default: <project_root>/artifacts/vcode).
    #[arg(long)]
    out_dir: Option<Utf8PathBuf>,
}

#[derive(Debug, Clone, Args)]
struct ApplyFlags {
    /// Compute the changes and write artifacts without touching any manifest
    /// or override file.
    #[arg(long, default_value_t = false)]
    dry_run: bool,

    /// Copy each manifest aside before rewriting it.
    #[arg(long, default_value_t = false, conflicts_with = "no_backup")]
    backup: bool,

    /// Never write backups, even if vcode.toml enables them.
    #[arg(long, default_value_t = false)]
    no_backup: bool,

    /// Exit 0 even when some manifests could not be patched.
    #[arg(long, default_value_t = false)]
    no_fail_on_error: bool,
}

#[derive(Debug, Parser)]
struct PlanArgs {
    #[command(flatten)]
    project: ProjectArgs,

    /// Variant outputs description (default: <project_root>/variant-outputs.json).
    #[arg(long)]
    outputs: Option<Utf8PathBuf>,

    #[command(flatten)]
    inputs: OverrideArgs,
}

#[derive(Debug, Parser)]
struct ApplyArgs {
    #[command(flatten)]
    project: ProjectArgs,

    #[command(flatten)]
    flags: ApplyFlags,
}

#[derive(Debug, Parser)]
struct RunArgs {
    #[command(flatten)]
    project: ProjectArgs,

    /// Variant outputs description (default: <project_root>/variant-outputs.json).
    #[arg(long)]
    outputs: Option<Utf8PathBuf>,

    #[command(flatten)]
    inputs: OverrideArgs,

    #[command(flatten)]
    flags: ApplyFlags,
}

#[derive(Debug, Parser)]
struct PatchArgs {
    /// Manifest to patch.
    path: Utf8PathBuf,

    /// Version code to write.
    #[arg(long)]
    value: u32,

    /// Print the diff instead of writing the file.
    #[arg(long, default_value_t = false)]
    dry_run: bool,

    /// Copy the manifest aside before rewriting it.
    #[arg(long, default_value_t = false)]
    backup: bool,

    /// Suffix for the backup copy.
    #[arg(long, default_value = ".vcode.bak")]
    backup_suffix: String,
}

fn main() -> ExitCode {
    // Without RUST_LOG, still surface conflict warnings and skip notices.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.cmd {
        Command::Resolve(args) => cmd_resolve(args),
        Command::Plan(args) => cmd_plan(args),
        Command::Apply(args) => cmd_apply(args),
        Command::Run(args) => cmd_run(args),
        Command::Patch(args) => cmd_patch(args),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            error!("{}", e);
            ExitCode::from(e.exit_code())
        }
    }
}

fn cmd_resolve(args: OverrideArgs) -> Result<u8, ToolError> {
    let inputs = OverrideInputs::new(args.legacy_build_version, args.current_build_version);
    let value = inputs.resolve(&TracingDiagnostics)?;
    println!("{}", value);
    Ok(0)
}

fn merged_config(
    project: &ProjectArgs,
    outputs: Option<Utf8PathBuf>,
    flags: Option<&ApplyFlags>,
) -> anyhow::Result<MergedConfig> {
    let file_config =
        config::load_or_default(&project.project_root).context("load vcode.toml config")?;
    let cli = CliOverrides {
        outputs,
        out_dir: project.out_dir.clone(),
        backup: flags.is_some_and(|f| f.backup),
        no_backup: flags.is_some_and(|f| f.no_backup),
        no_fail_on_error: flags.is_some_and(|f| f.no_fail_on_error),
    };
    let merged = ConfigMerger::new(file_config).merge(&project.project_root, &cli);
    debug!(
        "merged config: outputs={}, out_dir={}, fail_on_error={}, backups={}",
        merged.outputs, merged.out_dir, merged.fail_on_error, merged.backups.enabled
    );
    Ok(merged)
}

fn plan_step(
    merged: &MergedConfig,
    inputs: OverrideArgs,
    dry_run: bool,
) -> Result<RunPlan, ToolError> {
    let settings = PlanSettings {
        legacy_build_version: inputs.legacy_build_version,
        current_build_version: inputs.current_build_version,
        dry_run,
    };
    let source = FsVariantSource::load(&merged.outputs)?;
    let plan = run_plan(&settings, &source, tool_info(), &TracingDiagnostics)?;
    write_plan_artifacts(&plan, &merged.out_dir, &FsWritePort)?;
    Ok(plan)
}

fn apply_step(
    plan: &RunPlan,
    merged: &MergedConfig,
    flags: &ApplyFlags,
) -> Result<u8, ToolError> {
    let settings = ApplySettings {
        dry_run: flags.dry_run,
        backup_enabled: merged.backups.enabled,
        backup_suffix: merged.backups.suffix.clone(),
    };
    let outcome = run_apply(plan, &settings, tool_info(), &TracingDiagnostics)?;
    write_report_artifacts(&outcome, &merged.out_dir, &FsWritePort)?;
    Ok(exit_code_for(&outcome, merged.fail_on_error))
}

fn exit_code_for(outcome: &ApplyOutcome, fail_on_error: bool) -> u8 {
    let c = &outcome.report.verdict.counts;
    info!(
        "patched {}, unchanged {}, missing {}, failed {}",
        c.patched, c.unchanged, c.missing, c.failed
    );
    if fail_on_error && outcome.report.has_failures() {
        1
    } else {
        0
    }
}

fn cmd_plan(args: PlanArgs) -> Result<u8, ToolError> {
    let merged = merged_config(&args.project, args.outputs, None)?;
    let plan = plan_step(&merged, args.inputs, false)?;
    if plan.is_skipped() {
        info!("wrote skipped plan to {}", merged.out_dir);
    } else {
        info!("wrote plan ({} units) to {}", plan.units.len(), merged.out_dir);
    }
    Ok(0)
}

fn cmd_apply(args: ApplyArgs) -> Result<u8, ToolError> {
    let merged = merged_config(&args.project, None, Some(&args.flags))?;
    let plan = load_plan(&merged.out_dir)?;
    let code = apply_step(&plan, &merged, &args.flags)?;
    info!("wrote report to {}", merged.out_dir);
    Ok(code)
}

fn cmd_run(args: RunArgs) -> Result<u8, ToolError> {
    let merged = merged_config(&args.project, args.outputs, Some(&args.flags))?;
    let plan = plan_step(&merged, args.inputs, args.flags.dry_run)?;
    let code = apply_step(&plan, &merged, &args.flags)?;
    info!("wrote plan and report to {}", merged.out_dir);
    Ok(code)
}

fn cmd_patch(args: PatchArgs) -> Result<u8, ToolError> {
    let opts = PatchOptions {
        dry_run: args.dry_run,
        backup_enabled: args.backup,
        backup_suffix: args.backup_suffix,
    };
    match patch_manifest(&args.path, args.value, &opts, &TracingDiagnostics) {
        Ok(PatchOutcome::Missing) => println!("missing: {}", args.path),
        Ok(PatchOutcome::Unchanged) => println!("unchanged: {}", args.path),
        Ok(PatchOutcome::Updated { diff, written, .. }) => {
            if written {
                println!("patched: {}", args.path);
            } else {
                print!("{}", diff);
            }
        }
        Err(e) => {
            error!("{}", e);
            return Ok(1);
        }
    }
    Ok(0)
}

fn tool_info() -> ToolInfo {
    ToolInfo {
        name: "vcode".to_string(),
        version: Some(env!("CARGO_PKG_VERSION").to_string()),
    }
}
