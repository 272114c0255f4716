//! band-suite - CI harness for the dd coherence tool
//!
//! Runs the fixed build/test/smoke pipeline against a repository root
//! and exits with 0 on full success, or with the exit code of the first
//! failing step.

use anyhow::{Context, Result};
use band_suite::{telemetry, BandSuite, SuiteConfig};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "band-suite")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Fail-fast CI pipeline for the dd coherence tool", long_about = None)]
struct Cli {
    /// Repository root containing dd_coherence_tool
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// Directory for logs and artifacts (default: <root>/_ci_out)
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Interpreter used for every child process
    #[arg(long, default_value = "python")]
    interpreter: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long)]
    json: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    telemetry::init_tracing(cli.json, cli.verbose);

    let root = cli
        .root
        .canonicalize()
        .with_context(|| format!("Failed to resolve suite root {:?}", cli.root))?;

    let mut config = SuiteConfig::new(root);
    if let Some(out_dir) = cli.out_dir {
        config.out_dir = out_dir;
    }
    config.interpreter = cli.interpreter;

    let suite = BandSuite::new(config);
    let rc = suite.run().await.context("Suite execution failed")?;
    if rc != 0 {
        std::process::exit(rc);
    }
    Ok(())
}
