//! Pipeline orchestration: the fixed, fail-fast step sequence.
//!
//! One run walks a linear state machine (sanity report, unit tests,
//! fixture generation, smoke run, batch run), executing each step to
//! completion before the next. The first gated step that exits non-zero
//! aborts the run: its label, log path and a log tail are printed and
//! the step's exit code becomes the suite's exit code. Missing optional
//! prerequisites skip their step instead of failing it.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::Result;
use crate::meta::RunMetadata;
use crate::runner::StepRunner;
use crate::step::{Gate, Step};
use crate::tail::{tail_text, FAILURE_TAIL_LINES};
use crate::TOOL_DIR;

/// Smoke-test entry point, relative to the tool directory.
const RUN_SCRIPT: &str = "scripts/run_dd.py";

/// Batch entry point, relative to the tool directory.
const BATCH_SCRIPT: &str = "scripts/run_dd_batch.py";

/// Batch configuration file, relative to the suite root.
const BATCH_CONFIG: &str = "dd_params.small.json";

/// Name suffixes excluded from batch candidate discovery.
const BATCH_EXCLUDE_SUFFIXES: [&str; 2] = ["_uuid.csv", "_orig.csv"];

/// Configuration for a suite run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SuiteConfig {
    /// Repository root containing the tool under test.
    pub root: PathBuf,

    /// Directory receiving logs, markers and artifacts.
    pub out_dir: PathBuf,

    /// Interpreter running every child process.
    pub interpreter: String,

    /// Package manager probed for the metadata snapshot.
    pub package_manager: String,
}

impl SuiteConfig {
    /// Configuration rooted at `root`, with artifacts under
    /// `<root>/_ci_out` and the stock interpreter toolchain.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let out_dir = root.join("_ci_out");
        Self {
            root,
            out_dir,
            interpreter: "python".to_string(),
            package_manager: "pip".to_string(),
        }
    }
}

/// The suite orchestrator.
pub struct BandSuite {
    config: SuiteConfig,
}

impl BandSuite {
    /// Create an orchestrator for one run.
    pub fn new(config: SuiteConfig) -> Self {
        Self { config }
    }

    /// Execute the pipeline and return the suite's exit code: 0 on full
    /// success, otherwise the exact exit code of the first failing step.
    ///
    /// Run metadata is snapshotted to `meta.json` before any step. Every
    /// step is awaited to completion before the next begins; nothing
    /// runs after an abort.
    pub async fn run(&self) -> Result<i32> {
        let root = &self.config.root;
        let out_dir = &self.config.out_dir;
        std::fs::create_dir_all(out_dir)?;

        let meta = RunMetadata::capture(
            root,
            &self.config.interpreter,
            &self.config.package_manager,
        )?;
        meta.write(&out_dir.join("meta.json"))?;

        self.write_sanity_report()?;

        // Unit tests, when the tool ships a test directory.
        let tests_dir = self.tool_dir().join("tests");
        let gate = Gate::Optional {
            prerequisites: vec![tests_dir.clone()],
        };
        if gate.is_met() {
            let step = Step::new(
                "pytest",
                vec![
                    self.config.interpreter.clone(),
                    "-m".to_string(),
                    "pytest".to_string(),
                    "-q".to_string(),
                    path_arg(&tests_dir),
                ],
                root,
                out_dir.join("pytest_dd.log"),
            );
            if let Some(rc) = self.run_gated(step).await? {
                return Ok(rc);
            }
        } else {
            info!(step = "pytest", "Skipping: no test directory");
        }

        // Deterministic fixture dataset for the smoke run.
        let sample_csv = out_dir.join("sample.csv");
        let step = Step::new(
            "make_sample",
            vec![
                self.config.interpreter.clone(),
                "-c".to_string(),
                fixture_program(&sample_csv),
            ],
            root,
            out_dir.join("make_sample.log"),
        );
        if let Some(rc) = self.run_gated(step).await? {
            return Ok(rc);
        }

        // Smoke run of the primary tool. Absence is noted, not fatal.
        let run_dd = self.tool_dir().join(RUN_SCRIPT);
        let gate = Gate::Optional {
            prerequisites: vec![run_dd.clone()],
        };
        if gate.is_met() {
            let out_dd = out_dir.join("out_dd");
            std::fs::create_dir_all(&out_dd)?;
            let step = Step::new(
                "run_dd_smoke",
                vec![
                    self.config.interpreter.clone(),
                    path_arg(&run_dd),
                    "--input".to_string(),
                    path_arg(&sample_csv),
                    "--outdir".to_string(),
                    path_arg(&out_dd),
                    "--cols".to_string(),
                    "x,y".to_string(),
                ],
                root,
                out_dir.join("run_dd_smoke.log"),
            );
            if let Some(rc) = self.run_gated(step).await? {
                return Ok(rc);
            }
        } else {
            std::fs::write(
                out_dir.join("run_dd_missing.txt"),
                format!("{TOOL_DIR}/{RUN_SCRIPT} not found\n"),
            )?;
            info!(step = "run_dd_smoke", "Skipping: smoke script missing, marker written");
        }

        // Batch run over committed CSVs, when both prerequisites exist.
        let batch_script = self.tool_dir().join(BATCH_SCRIPT);
        let batch_config = root.join(BATCH_CONFIG);
        let gate = Gate::Optional {
            prerequisites: vec![batch_script.clone(), batch_config.clone()],
        };
        if gate.is_met() {
            let candidates = discover_batch_inputs(&self.tool_dir())?;
            if candidates.is_empty() {
                info!(step = "run_dd_batch", "Skipping: no batch candidates");
            } else {
                let mut command = vec![
                    self.config.interpreter.clone(),
                    path_arg(&batch_script),
                    "--outdir".to_string(),
                    path_arg(&out_dir.join("dd_runs")),
                    "--config".to_string(),
                    path_arg(&batch_config),
                ];
                command.extend(candidates.iter().map(|p| path_arg(p)));
                let step = Step::new("run_dd_batch", command, root, out_dir.join("run_dd_batch.log"));
                if let Some(rc) = self.run_gated(step).await? {
                    return Ok(rc);
                }
            }
        } else {
            info!(step = "run_dd_batch", "Skipping: batch script or config missing");
        }

        println!("[band_suite] OK");
        Ok(0)
    }

    /// Execute one gated step, emitting abort diagnostics on a non-zero
    /// exit. Returns the exit code the pipeline must terminate with, if
    /// any. Spawn failures still surface as errors.
    async fn run_gated(&self, step: Step) -> Result<Option<i32>> {
        info!(step = %step.label, "Executing step");
        let result = StepRunner::execute(&step).await?;
        if result.passed() {
            return Ok(None);
        }

        println!(
            "[band_suite] {} failed (rc={}). Log: {}",
            step.label,
            result.exit_code,
            result.log_path.display()
        );
        println!("[band_suite] last lines of {}:", result.log_path.display());
        println!("{}", tail_text(&result.log_path, FAILURE_TAIL_LINES));
        Ok(Some(result.exit_code))
    }

    /// Write `sanity.txt` enumerating the expected artifacts. The report
    /// records presence; it never aborts the run on what it finds.
    fn write_sanity_report(&self) -> Result<()> {
        let root = &self.config.root;
        let lines = [
            format!("root={}", root.display()),
            format!("has_dd_tool={}", self.tool_dir().exists()),
            format!("has_run_dd={}", self.tool_dir().join(RUN_SCRIPT).exists()),
            format!("has_tests={}", self.tool_dir().join("tests").exists()),
        ];
        std::fs::write(
            self.config.out_dir.join("sanity.txt"),
            lines.join("\n") + "\n",
        )?;
        Ok(())
    }

    fn tool_dir(&self) -> PathBuf {
        self.config.root.join(TOOL_DIR)
    }
}

/// CSV files directly under `dir` eligible for the batch run, sorted by
/// path. Names ending in one of the fixed exclusion suffixes are
/// dropped. A missing directory yields no candidates.
pub fn discover_batch_inputs(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e),
    };

    let mut inputs = Vec::new();
    for entry in entries {
        let path = entry?.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if !name.ends_with(".csv") {
            continue;
        }
        if BATCH_EXCLUDE_SUFFIXES.iter().any(|s| name.ends_with(s)) {
            continue;
        }
        inputs.push(path);
    }
    inputs.sort();
    Ok(inputs)
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// Inline program handed to the numeric subroutine: two 200-row mixture
/// columns under a fixed seed, serialized as CSV at `target`.
fn fixture_program(target: &Path) -> String {
    format!(
        "import numpy as np, pandas as pd; \
         np.random.seed(0); \
         x=np.r_[np.random.normal(0,1,200),np.random.normal(3,1.5,200)]; \
         y=np.r_[np.random.normal(0,1,200),np.random.normal(0,1,200)]; \
         pd.DataFrame({{'x':x,'y':y}}).to_csv(r'{}', index=False)",
        target.display()
    )
}
