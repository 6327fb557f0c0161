// TimeTrail - platform/fs.rs
//
// Filesystem access for the analyser output and the state-label files.
// Everything the core consumes is handed over as in-memory strings.

use crate::util::constants;
use crate::util::error::{Result, TimeTrailError};
use std::path::Path;

/// Parse the content of a state-label file.
///
/// One label per line. Empty lines and lines starting with `#` are
/// ignored; all other lines are kept verbatim (minus a trailing `\r`).
pub fn parse_state_labels(content: &str) -> Vec<String> {
    content
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

/// Read an origin or forgery state-label file.
pub fn read_state_labels(path: &Path) -> Result<Vec<String>> {
    let content = read_bounded(
        path,
        constants::MAX_STATES_FILE_SIZE,
        "read state labels",
    )?;
    let labels = parse_state_labels(&content);
    tracing::debug!(path = %path.display(), labels = labels.len(), "State labels loaded");
    Ok(labels)
}

/// Read the analyser output as lines, without line terminators.
///
/// Invalid UTF-8 is replaced rather than rejected; analyser dumps of
/// damaged volumes can contain raw bytes in file names.
pub fn read_input_lines(path: &Path) -> Result<Vec<String>> {
    let content = read_bounded(path, constants::MAX_INPUT_FILE_SIZE, "read input")?;
    Ok(content.lines().map(str::to_string).collect())
}

/// Read a whole file with lossy UTF-8 conversion, refusing files above `max_size`.
fn read_bounded(path: &Path, max_size: u64, operation: &'static str) -> Result<String> {
    let io_err = |source| TimeTrailError::Io {
        path: path.to_path_buf(),
        operation,
        source,
    };

    let size = std::fs::metadata(path).map_err(io_err)?.len();
    if size > max_size {
        return Err(TimeTrailError::FileTooLarge {
            path: path.to_path_buf(),
            size,
            max_size,
        });
    }

    let bytes = std::fs::read(path).map_err(io_err)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
