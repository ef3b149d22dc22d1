use anyhow::{
    Context,
    Result,
    ensure,
};
use clap::{
    Parser,
    Subcommand,
};
use std::{
    path::{
        Path,
        PathBuf,
    },
    process::Command,
};

#[derive(Parser)]
#[command(
    name = "xtask",
    about = "Slot machine helper tasks (clippy, tests)",
    arg_required_else_help = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run clippy for the entire workspace with warnings-as-errors
    Clippy,
    /// Run unit and integration tests for the whole workspace
    Test {
        /// Only run the slot-core integration suite
        #[arg(long)]
        integration_only: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let root = repo_root()?;

    match cli.command {
        Commands::Clippy => run_clippy(&root)?,
        Commands::Test { integration_only } => {
            if integration_only {
                run_integration_tests(&root)?;
            } else {
                run_workspace_tests(&root)?;
            }
        }
    }

    Ok(())
}

fn repo_root() -> Result<PathBuf> {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .map(Path::to_path_buf)
        .context("xtask has no parent directory")
}

fn run_clippy(root: &Path) -> Result<()> {
    let mut cmd = Command::new("cargo");
    cmd.arg("clippy")
        .arg("--workspace")
        .arg("--all-targets")
        .arg("--all-features")
        .arg("--")
        .arg("-D")
        .arg("warnings")
        .current_dir(root);
    run_command(cmd, "cargo clippy")?;
    Ok(())
}

fn run_workspace_tests(root: &Path) -> Result<()> {
    let mut cmd = Command::new("cargo");
    cmd.arg("test")
        .arg("--workspace")
        .arg("--all-features")
        .current_dir(root);
    run_command(cmd, "cargo test --workspace")?;
    Ok(())
}

fn run_integration_tests(root: &Path) -> Result<()> {
    let mut cmd = Command::new("cargo");
    cmd.arg("test")
        .arg("-p")
        .arg("slot-core")
        .arg("--features")
        .arg("test-helpers")
        .arg("--test")
        .arg("integration_tests")
        .current_dir(root);
    run_command(cmd, "cargo test -p slot-core --test integration_tests")?;
    Ok(())
}

fn run_command(mut cmd: Command, label: &str) -> Result<()> {
    println!("Running: {}", label);
    let status = cmd
        .status()
        .with_context(|| format!("failed to run {label}"))?;
    ensure!(status.success(), "{label} failed with status {status}");
    Ok(())
}
