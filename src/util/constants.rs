// TimeTrail - util/constants.rs
//
// Single source of truth for all named constants, limits, and defaults.
// Grammar fragments that appear both in parsing and in classification
// live here so the two can never drift apart.

// =============================================================================
// Application metadata
// =============================================================================

/// Application display name.
pub const APP_NAME: &str = "TimeTrail";

/// Application identifier used for config/data directories.
pub const APP_ID: &str = "TimeTrail";

/// Current application version (updated by release script).
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// Operation grammar
// =============================================================================

/// Separator between operations in the analyser output, and between
/// operations in a lineage path.
pub const LINEAGE_SEPARATOR: &str = " <- ";

/// Qualifier text trailing an operation that may have happened on another volume.
pub const POSSIBLY_OTHER_VOLUME: &str = " possibly on other volume";

/// Qualifier text trailing an operation that happened on another volume.
pub const OTHER_VOLUME: &str = " on other volume";

/// Suffix appended to every action of a `possibly on other volume` operation.
pub const POSSIBLY_OTHER_VOLUME_SUFFIX: &str = ", possibly on other volume";

/// Suffix appended to every action of an `on other volume` operation.
pub const OTHER_VOLUME_SUFFIX: &str = ", on other volume";

/// Separator between actions inside one operation.
pub const ACTION_SEPARATOR: char = '|';

/// Relative path markers that start the file path on a line.
/// Windows analyser output uses `.\`; `./` is accepted for POSIX dumps.
pub const PATH_MARKERS: [&str; 2] = [".\\", "./"];

// =============================================================================
// Tree construction
// =============================================================================

/// Operation text of the synthetic root node.
pub const ROOT_OPERATION: &str = "ROOT";

/// Timestamp label of the synthetic root node (the present state of the file).
pub const ROOT_TIMESTAMP: &str = "NOW";

/// Lineage path of the synthetic root node. No parsed record can produce
/// this path because every record path ends with an operation.
pub const ROOT_LINEAGE: &str = " <- ";

// =============================================================================
// Input limits
// =============================================================================

/// Maximum size of an analyser output file accepted for parsing.
pub const MAX_INPUT_FILE_SIZE: u64 = 512 * 1024 * 1024; // 512 MB

/// Maximum size of an origin/forgery state-label file.
pub const MAX_STATES_FILE_SIZE: u64 = 1024 * 1024; // 1 MB

// =============================================================================
// Defaults
// =============================================================================

/// Default origin-state label file, relative to the working directory.
pub const DEFAULT_ORIGIN_STATES_FILE: &str = "origin-states.txt";

/// Default forgery-state label file, relative to the working directory.
pub const DEFAULT_FORGERY_STATES_FILE: &str = "forgery-states.txt";

/// Default output path (extension is added from the export format).
pub const DEFAULT_OUTPUT_PATH: &str = "./output";

/// Default log level when neither RUST_LOG, --debug, nor config is set.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Name of the optional configuration file.
pub const CONFIG_FILE_NAME: &str = "config.toml";
