// TimeTrail - util/error.rs
//
// Typed error hierarchy with context-preserving error chains.
// No string-based error propagation; every error keeps its causal chain
// for diagnostic logging.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Top-level error type for all TimeTrail operations.
/// Errors are categorised by the subsystem that produced them.
#[derive(Debug)]
pub enum TimeTrailError {
    /// An analyser line could not be parsed.
    Parse(ParseError),

    /// Tree construction hit an invariant violation.
    Tree(TreeError),

    /// Export of the tree forest failed.
    Export(ExportError),

    /// A file exceeds the size limit for its kind.
    FileTooLarge {
        path: PathBuf,
        size: u64,
        max_size: u64,
    },

    /// I/O error with path context.
    Io {
        path: PathBuf,
        operation: &'static str,
        source: io::Error,
    },
}

impl fmt::Display for TimeTrailError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(e) => write!(f, "Parse error: {e}"),
            Self::Tree(e) => write!(f, "Tree error: {e}"),
            Self::Export(e) => write!(f, "Export error: {e}"),
            Self::FileTooLarge {
                path,
                size,
                max_size,
            } => write!(
                f,
                "'{}' is {size} bytes, exceeds maximum of {max_size} bytes",
                path.display()
            ),
            Self::Io {
                path,
                operation,
                source,
            } => write!(
                f,
                "I/O error during {operation} on '{}': {source}",
                path.display()
            ),
        }
    }
}

impl std::error::Error for TimeTrailError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Parse(e) => Some(e),
            Self::Tree(e) => Some(e),
            Self::Export(e) => Some(e),
            Self::FileTooLarge { .. } => None,
            Self::Io { source, .. } => Some(source),
        }
    }
}

// ---------------------------------------------------------------------------
// Parse errors
// ---------------------------------------------------------------------------

/// Errors related to analyser line parsing.
#[derive(Debug)]
pub enum ParseError {
    /// An embedded calendar timestamp could not be parsed.
    ///
    /// `line_number` is `None` when the timestamp was normalised outside of
    /// a line context (e.g. a bare operation string).
    MalformedTimestamp {
        line_number: Option<u64>,
        raw_timestamp: String,
        reason: String,
    },
}

impl ParseError {
    /// Attach the 1-based input line number to this error.
    pub fn at_line(self, line: u64) -> Self {
        match self {
            Self::MalformedTimestamp {
                raw_timestamp,
                reason,
                ..
            } => Self::MalformedTimestamp {
                line_number: Some(line),
                raw_timestamp,
                reason,
            },
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedTimestamp {
                line_number: Some(line),
                raw_timestamp,
                reason,
            } => write!(
                f,
                "line {line}: malformed timestamp '{raw_timestamp}': {reason}"
            ),
            Self::MalformedTimestamp {
                line_number: None,
                raw_timestamp,
                reason,
            } => write!(f, "malformed timestamp '{raw_timestamp}': {reason}"),
        }
    }
}

impl std::error::Error for ParseError {}

impl From<ParseError> for TimeTrailError {
    fn from(e: ParseError) -> Self {
        Self::Parse(e)
    }
}

// ---------------------------------------------------------------------------
// Tree errors
// ---------------------------------------------------------------------------

/// Errors raised while folding parsed records into trees.
#[derive(Debug)]
pub enum TreeError {
    /// The attachment cursor refers to a record that has no node yet.
    /// Only a construction-order bug can produce this.
    MissingParent {
        file_path: String,
        lineage_path: String,
        classification: &'static str,
    },
}

impl fmt::Display for TreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingParent {
                file_path,
                lineage_path,
                classification,
            } => write!(
                f,
                "'{file_path}': parent node not found for {classification} record at '{lineage_path}'"
            ),
        }
    }
}

impl std::error::Error for TreeError {}

impl From<TreeError> for TimeTrailError {
    fn from(e: TreeError) -> Self {
        Self::Tree(e)
    }
}

// ---------------------------------------------------------------------------
// Export errors
// ---------------------------------------------------------------------------

/// The forest could not be written out.
#[derive(Debug)]
pub enum ExportError {
    /// The output file could not be written or flushed.
    Write { path: PathBuf, source: io::Error },

    /// A CSV row could not be encoded.
    Csv { path: PathBuf, source: csv::Error },

    /// The JSON document could not be encoded.
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl ExportError {
    /// Destination file the failed export was targeting.
    pub fn path(&self) -> &PathBuf {
        match self {
            Self::Write { path, .. } | Self::Csv { path, .. } | Self::Json { path, .. } => path,
        }
    }
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = self.path().display();
        match self {
            Self::Write { source, .. } => write!(f, "cannot write trees to '{path}': {source}"),
            Self::Csv { source, .. } => write!(f, "cannot encode CSV row for '{path}': {source}"),
            Self::Json { source, .. } => write!(f, "cannot encode JSON for '{path}': {source}"),
        }
    }
}

impl std::error::Error for ExportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Write { source, .. } => Some(source),
            Self::Csv { source, .. } => Some(source),
            Self::Json { source, .. } => Some(source),
        }
    }
}

impl From<ExportError> for TimeTrailError {
    fn from(e: ExportError) -> Self {
        Self::Export(e)
    }
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

/// Problems found while loading config.toml. All of them are reported as
/// warnings; the run falls back to defaults for the affected values.
#[derive(Debug)]
pub enum ConfigError {
    /// The file is not valid TOML.
    TomlParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// A key holds a value the application cannot use.
    InvalidValue {
        field: &'static str,
        value: String,
        expected: &'static str,
    },

    /// The file exists but could not be read.
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TomlParse { path, source } => {
                write!(f, "'{}' is not valid TOML: {source}", path.display())
            }
            Self::InvalidValue {
                field,
                value,
                expected,
            } => write!(f, "{field} = '{value}' ignored, expected {expected}"),
            Self::Io { path, source } => {
                write!(f, "cannot read '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::TomlParse { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
            Self::InvalidValue { .. } => None,
        }
    }
}

/// Convenience type alias for TimeTrail results.
pub type Result<T> = std::result::Result<T, TimeTrailError>;
