//! Error types for suite execution

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SuiteError {
    #[error("Step '{label}' has an empty command")]
    EmptyCommand { label: String },

    #[error("Failed to spawn step '{label}': {source}")]
    Spawn {
        label: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to probe version of '{program}': {source}")]
    VersionProbe {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid import path entry under {base}: {source}")]
    ImportPath {
        base: PathBuf,
        #[source]
        source: std::env::JoinPathsError,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for suite operations
pub type Result<T> = std::result::Result<T, SuiteError>;
