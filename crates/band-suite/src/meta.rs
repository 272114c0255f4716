//! Run metadata snapshot, written once before any step executes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::env::IMPORT_PATH_VAR;
use crate::error::{Result, SuiteError};

/// Context captured at the start of a run and persisted as `meta.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunMetadata {
    /// UTC timestamp of the snapshot.
    pub utc: DateTime<Utc>,

    /// Suite root the run operates on.
    pub pwd: PathBuf,

    /// Interpreter version string.
    pub python: String,

    /// Package manager version string.
    pub pip: String,

    /// Ambient import search path at snapshot time (may be empty).
    pub py_path: String,
}

impl RunMetadata {
    /// Capture the run context for `root`.
    ///
    /// Version probes are fatal when the program cannot be spawned.
    pub fn capture(root: &Path, interpreter: &str, package_manager: &str) -> Result<Self> {
        Ok(Self {
            utc: Utc::now(),
            pwd: root.to_path_buf(),
            python: probe_version(interpreter, &["-V"])?,
            pip: probe_version(package_manager, &["-V"])?,
            py_path: std::env::var(IMPORT_PATH_VAR).unwrap_or_default(),
        })
    }

    /// Persist the snapshot as pretty-printed JSON.
    pub fn write(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

/// Run `<program> <args>` and return its trimmed version output.
///
/// Some tools print their version banner to stderr, so stderr is used
/// whenever stdout comes back empty.
pub fn probe_version(program: &str, args: &[&str]) -> Result<String> {
    let output = std::process::Command::new(program)
        .args(args)
        .output()
        .map_err(|source| SuiteError::VersionProbe {
            program: program.to_string(),
            source,
        })?;

    let bytes = if output.stdout.is_empty() {
        &output.stderr
    } else {
        &output.stdout
    };
    Ok(String::from_utf8_lossy(bytes).trim().to_string())
}
