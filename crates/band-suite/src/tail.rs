//! Log tailing for failure diagnostics.

use std::path::Path;

/// Tail length for routine inspection.
pub const ROUTINE_TAIL_LINES: usize = 120;

/// Tail length printed when a step fails.
pub const FAILURE_TAIL_LINES: usize = 160;

/// Last `n_lines` of the text file at `path`, newline-joined, original
/// order preserved. Files at or under the limit come back verbatim.
///
/// Undecodable bytes are replaced rather than rejected. A file that
/// cannot be read yields a descriptive placeholder instead of an error.
pub fn tail_text(path: &Path, n_lines: usize) -> String {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => return format!("(unable to read {}: {})", path.display(), e),
    };
    let text = String::from_utf8_lossy(&bytes);
    let lines: Vec<&str> = text.lines().collect();
    if lines.len() <= n_lines {
        return lines.join("\n");
    }
    lines[lines.len() - n_lines..].join("\n")
}
