//! Step definitions and prerequisite gating.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One discrete pipeline unit with its own log file.
///
/// Built immediately before execution and never reused.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Step {
    /// Human-readable step label, used in diagnostics.
    pub label: String,

    /// Command to execute (first element is the program).
    pub command: Vec<String>,

    /// Working directory for the child process.
    pub cwd: PathBuf,

    /// File receiving the child's combined stdout and stderr.
    pub log_path: PathBuf,
}

impl Step {
    /// Create a new step.
    pub fn new(
        label: impl Into<String>,
        command: Vec<String>,
        cwd: impl Into<PathBuf>,
        log_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            label: label.into(),
            command,
            cwd: cwd.into(),
            log_path: log_path.into(),
        }
    }
}

/// Whether a step runs unconditionally or behind a prerequisite check.
///
/// Gates are evaluated once per run, right before the step they guard.
#[derive(Debug, Clone)]
pub enum Gate {
    /// The step always runs.
    Required,

    /// The step runs only when every prerequisite path exists.
    Optional { prerequisites: Vec<PathBuf> },
}

impl Gate {
    /// Evaluate the gate against the filesystem.
    pub fn is_met(&self) -> bool {
        match self {
            Gate::Required => true,
            Gate::Optional { prerequisites } => prerequisites.iter().all(|p| p.exists()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_new() {
        let step = Step::new(
            "pytest",
            vec!["python".to_string(), "-m".to_string(), "pytest".to_string()],
            "/repo",
            "/repo/_ci_out/pytest_dd.log",
        );
        assert_eq!(step.label, "pytest");
        assert_eq!(step.command[0], "python");
        assert_eq!(step.cwd, PathBuf::from("/repo"));
    }

    #[test]
    fn test_required_gate_always_met() {
        assert!(Gate::Required.is_met());
    }

    #[test]
    fn test_optional_gate_met_when_all_prerequisites_exist() {
        let dir = tempfile::tempdir().expect("tempdir");
        let present = dir.path().join("present.txt");
        std::fs::write(&present, "x").expect("write");

        let gate = Gate::Optional {
            prerequisites: vec![dir.path().to_path_buf(), present],
        };
        assert!(gate.is_met());
    }

    #[test]
    fn test_optional_gate_unmet_when_any_prerequisite_missing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let gate = Gate::Optional {
            prerequisites: vec![dir.path().to_path_buf(), dir.path().join("missing.txt")],
        };
        assert!(!gate.is_met());
    }
}
