use anyhow::Context;
use clap::{Parser, Subcommand};
use fs_err as fs;
use std::process::Command as ProcessCommand;

#[derive(Debug, Parser)]
#[command(name = "xtask", about = "Workspace helper tasks")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print schema identifiers used by vcode artifacts.
    PrintSchemas,
    /// Create an empty artifacts layout for local runs.
    InitArtifacts {
        #[arg(long, default_value = "artifacts")]
        dir: String,
    },
    /// Bless golden fixtures (overwrite expected manifests).
    BlessFixtures,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::PrintSchemas => {
            println!("{}", vcode_types::schema::VCODE_PLAN_V1);
            println!("{}", vcode_types::schema::VCODE_REPORT_V1);
        }
        Command::InitArtifacts { dir } => {
            let out = format!("{dir}/vcode");
            fs::create_dir_all(&out).with_context(|| format!("create {out}"))?;
            println!("initialized {out}");
        }
        Command::BlessFixtures => {
            let status = ProcessCommand::new("cargo")
                .args(["test", "-p", "vcode-edit", "--test", "golden_fixtures"])
                .env("VCODE_BLESS", "1")
                .status()
                .context("run golden fixture blessing")?;
            if !status.success() {
                anyhow::bail!("bless-fixtures failed");
            }
        }
    }
    Ok(())
}
