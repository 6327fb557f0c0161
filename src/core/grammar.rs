// TimeTrail - core/grammar.rs
//
// Operation grammar matcher and file-path extraction.
// Core layer: pure functions over a line, no I/O.
//
// Grammar of one operation:
//
//   "(" KIND " " TS (SEP TS)? ": " ACTIONS ")" QUALIFIER?
//
//   KIND      = At | From | Between | After
//   TS        = YYYY-MONTHNAME-D H:M:S.fraction ZONE
//   SEP       = ":" | " and " | " to "
//   ACTIONS   = free text, actions joined by " | "
//   QUALIFIER = " possibly on other volume" | " on other volume"

use crate::core::model::OperationKind;
use crate::util::constants::PATH_MARKERS;
use regex::{Captures, Regex};
use std::sync::OnceLock;

/// One raw embedded timestamp token, e.g. `2020-OCTOBER-5 12:1:30.2715742 UTC`.
pub(crate) const TIMESTAMP_PATTERN: &str =
    r"[0-9]{4}-[A-Z]+-[0-9]{1,2} [0-9]{1,2}:[0-9]{1,2}:[0-9]{1,2}\.[0-9]+ [A-Z]+";

fn operation_regex() -> &'static Regex {
    static OPERATION_RE: OnceLock<Regex> = OnceLock::new();
    OPERATION_RE.get_or_init(|| {
        let pattern = format!(
            r"\((?P<kind>At|From|Between|After) (?P<first>{ts})(?:(?::| and | to )(?P<second>{ts}))?: (?P<actions>[^()]+)\)(?P<qualifier> possibly on other volume| on other volume)?",
            ts = TIMESTAMP_PATTERN
        );
        // Constant pattern; covered by every test in this module.
        Regex::new(&pattern).expect("operation grammar: invalid regex")
    })
}

/// A single grammar match within a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationMatch<'a> {
    /// Verbatim matched text, including any trailing volume qualifier.
    pub text: &'a str,
    /// Byte offset of the opening parenthesis in the source line.
    pub start: usize,
    pub kind: OperationKind,
    /// First (or only) raw timestamp token.
    pub first_timestamp: &'a str,
    /// Second raw timestamp token for ranged operations.
    pub second_timestamp: Option<&'a str>,
}

impl<'a> OperationMatch<'a> {
    fn from_captures(caps: &Captures<'a>) -> Option<Self> {
        let whole = caps.get(0)?;
        let kind = OperationKind::from_keyword(caps.name("kind")?.as_str())?;
        Some(Self {
            text: whole.as_str(),
            start: whole.start(),
            kind,
            first_timestamp: caps.name("first")?.as_str(),
            second_timestamp: caps.name("second").map(|m| m.as_str()),
        })
    }
}

/// All non-overlapping operations in `line`, left to right.
///
/// Lines without any operation yield an empty vector; that is not an error.
pub fn match_operations(line: &str) -> Vec<OperationMatch<'_>> {
    operation_regex()
        .captures_iter(line)
        .filter_map(|caps| OperationMatch::from_captures(&caps))
        .collect()
}

/// Just the operation substrings of `line`, in chain order.
pub fn operation_strings(line: &str) -> Vec<&str> {
    operation_regex()
        .find_iter(line)
        .map(|m| m.as_str())
        .collect()
}

/// Match a single operation string (as produced by [`operation_strings`]).
///
/// Returns `None` if `operation` does not start with a grammar match.
pub fn parse_operation(operation: &str) -> Option<OperationMatch<'_>> {
    operation_regex()
        .captures(operation)
        .and_then(|caps| OperationMatch::from_captures(&caps))
        .filter(|m| m.start == 0)
}

/// Extract the relative file path from an analyser line.
///
/// The path starts at the first `.\` (or `./`) marker and ends just before
/// the single space that precedes the first operation. Without a marker the
/// path is empty. A line with a marker but no operation keeps everything
/// after the marker, trimmed of trailing whitespace.
pub fn extract_file_path(line: &str) -> &str {
    let Some(start) = PATH_MARKERS.iter().filter_map(|m| line.find(m)).min() else {
        return "";
    };

    let Some(first_op) = operation_regex().find(line) else {
        return line[start..].trim_end();
    };

    if first_op.start() <= start {
        return "";
    }

    // Drop exactly one character: the separator before the operation.
    let span = &line[start..first_op.start()];
    match span.char_indices().next_back() {
        Some((idx, _)) => &span[..idx],
        None => span,
    }
}
