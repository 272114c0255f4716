//! band-suite - CI harness for the dd coherence tool
//!
//! Provides a fixed, linear pipeline orchestrator that:
//! - Runs the tool's unit tests, fixture generation, smoke and batch steps
//! - Captures each step's combined output into its own log file
//! - Aborts on the first failing step, printing a tail of its log
//! - Snapshots run metadata before any step executes

pub mod env;
pub mod error;
pub mod meta;
pub mod pipeline;
pub mod runner;
pub mod step;
pub mod tail;
pub mod telemetry;

/// Directory holding the tool under test, relative to the suite root.
pub const TOOL_DIR: &str = "dd_coherence_tool";

// Re-export key types
pub use error::{Result, SuiteError};
pub use meta::RunMetadata;
pub use pipeline::{BandSuite, SuiteConfig};
pub use runner::{ExecutionResult, StepRunner};
pub use step::{Gate, Step};
