//! Subprocess environment derivation.
//!
//! Every child process runs with an environment derived from an ambient
//! snapshot: the import search path gains the suite root and the tool
//! directory ahead of any pre-existing entries, and unbuffered output is
//! forced so log files fill as the child runs. The ambient mapping is
//! never mutated; derivation is a pure function of its inputs.

use std::collections::HashMap;
use std::path::Path;

use crate::error::{Result, SuiteError};
use crate::TOOL_DIR;

/// Import search path variable consumed by the tool under test.
pub const IMPORT_PATH_VAR: &str = "PYTHONPATH";

/// Variable forcing unbuffered child output.
pub const UNBUFFERED_VAR: &str = "PYTHONUNBUFFERED";

/// Snapshot the ambient process environment.
pub fn ambient_env() -> HashMap<String, String> {
    std::env::vars().collect()
}

/// Derive a child environment from `ambient` for a step rooted at `base`.
///
/// The import search path becomes `[base, base/dd_coherence_tool]`
/// followed by the entries of any pre-existing value, joined with the
/// platform path-list separator. Identical inputs always produce the
/// same mapping.
pub fn derive(ambient: &HashMap<String, String>, base: &Path) -> Result<HashMap<String, String>> {
    let mut env = ambient.clone();

    let mut parts = vec![base.to_path_buf(), base.join(TOOL_DIR)];
    if let Some(existing) = ambient.get(IMPORT_PATH_VAR).filter(|v| !v.is_empty()) {
        parts.extend(std::env::split_paths(existing));
    }
    let joined = std::env::join_paths(parts).map_err(|source| SuiteError::ImportPath {
        base: base.to_path_buf(),
        source,
    })?;

    env.insert(
        IMPORT_PATH_VAR.to_string(),
        joined.to_string_lossy().into_owned(),
    );
    env.insert(UNBUFFERED_VAR.to_string(), "1".to_string());

    Ok(env)
}
