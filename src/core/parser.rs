// TimeTrail - core/parser.rs
//
// Line parser: turns one analyser line into its file path and the ordered
// list of classified operation records.
// Core layer: accepts &str, never touches the filesystem directly.
//
// Only normal records extend the lineage chain. An operation whose actions
// are all origin states becomes a dead end; the next operation on the line
// attaches to the previous normal anchor instead.

use crate::core::actions::{classify_actions, split_actions};
use crate::core::grammar::{extract_file_path, match_operations};
use crate::core::model::{Classification, OperationRecord, ParsedLine, StateSet};
use crate::core::timestamp::format_operation_timestamp;
use crate::util::constants::LINEAGE_SEPARATOR;
use crate::util::error::ParseError;

/// Parse an entire analyser line.
///
/// `line_number` is 1-based and only used for error context and the
/// returned [`ParsedLine`].
pub fn parse_line(
    line: &str,
    line_number: u64,
    origin_states: &StateSet,
) -> Result<ParsedLine, ParseError> {
    let file_path = extract_file_path(line).to_string();
    let mut records = Vec::new();
    let mut chain_anchor = String::new();

    for op in match_operations(line) {
        let timestamp = format_operation_timestamp(&op).map_err(|e| e.at_line(line_number))?;
        let buckets = classify_actions(split_actions(op.text), origin_states);
        let lineage_path = format!("{chain_anchor}{LINEAGE_SEPARATOR}{}", op.text);

        if !buckets.origin.is_empty() {
            records.push(OperationRecord {
                operation_text: op.text.to_string(),
                lineage_path: lineage_path.clone(),
                timestamp: timestamp.clone(),
                actions: buckets.origin,
                classification: Classification::Origin,
            });
        }

        if !buckets.normal.is_empty() {
            records.push(OperationRecord {
                operation_text: op.text.to_string(),
                lineage_path: lineage_path.clone(),
                timestamp,
                actions: buckets.normal,
                classification: Classification::Normal,
            });
            chain_anchor = lineage_path;
        }
    }

    tracing::trace!(
        line = line_number,
        file = %file_path,
        records = records.len(),
        "Line parsed"
    );

    Ok(ParsedLine {
        line_number,
        file_path,
        records,
    })
}

/// Whether `line` passes the substring filter. An empty filter accepts all.
pub fn line_matches_filter(line: &str, filter: &str) -> bool {
    line.contains(filter)
}

/// Parse every line that contains `filter`, in input order.
///
/// Filtered-out lines produce nothing and are not errors. The first
/// malformed timestamp aborts the batch.
pub fn parse_lines<S: AsRef<str>>(
    lines: &[S],
    origin_states: &StateSet,
    filter: &str,
) -> Result<Vec<ParsedLine>, ParseError> {
    let mut parsed = Vec::new();
    for (idx, line) in lines.iter().enumerate() {
        let line = line.as_ref();
        if !line_matches_filter(line, filter) {
            continue;
        }
        parsed.push(parse_line(line, (idx as u64) + 1, origin_states)?);
    }

    tracing::debug!(
        lines = lines.len(),
        accepted = parsed.len(),
        "Batch parse complete"
    );

    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MFT_LINE: &str = r"0 .\$MFT (At 2020-OCTOBER-5 12:1:30.2715742 UTC: Create)";
    const COPY_LINE: &str = r"40 .\Folder\test2.odt (From 2020-OCTOBER-5 12:2:44.2437766 UTC to 2020-OCTOBER-5 12:2:44.6067758 UTC: Copy with file tunneling) <- (At 2020-OCTOBER-5 12:2:37.4497311 UTC: Create | Create with file tunneling | Update | Update with last access update enabled) possibly on other volume";
    const COPY_OP: &str = "(From 2020-OCTOBER-5 12:2:44.2437766 UTC to 2020-OCTOBER-5 12:2:44.6067758 UTC: Copy with file tunneling)";
    const CREATE_OP: &str = "(At 2020-OCTOBER-5 12:2:37.4497311 UTC: Create | Create with file tunneling | Update | Update with last access update enabled) possibly on other volume";

    fn origin_states() -> StateSet {
        ["Create", "Create with file tunneling"].into_iter().collect()
    }

    #[test]
    fn test_parse_mft_line() {
        let parsed = parse_line(MFT_LINE, 1, &["Create"].into_iter().collect()).unwrap();
        assert_eq!(parsed.file_path, r".\$MFT");
        assert_eq!(parsed.records.len(), 1);

        let record = &parsed.records[0];
        assert_eq!(
            record.operation_text,
            "(At 2020-OCTOBER-5 12:1:30.2715742 UTC: Create)"
        );
        assert_eq!(
            record.lineage_path,
            " <- (At 2020-OCTOBER-5 12:1:30.2715742 UTC: Create)"
        );
        assert_eq!(
            record.timestamp,
            "<TIMESTAMP 2020-10-05T12:01:30.2715742 +0000 (At)>"
        );
        assert_eq!(record.actions, vec!["Create"]);
        assert_eq!(record.classification, Classification::Origin);
    }

    #[test]
    fn test_parse_branching_line() {
        let parsed = parse_line(COPY_LINE, 2, &origin_states()).unwrap();
        assert_eq!(parsed.file_path, r".\Folder\test2.odt");
        assert_eq!(parsed.records.len(), 3);

        let copy = &parsed.records[0];
        assert_eq!(copy.operation_text, COPY_OP);
        assert_eq!(copy.lineage_path, format!(" <- {COPY_OP}"));
        assert_eq!(
            copy.timestamp,
            "<TIMESTAMP 2020-10-05T12:02:44.2437766 +0000 - 2020-10-05T12:02:44.6067758 +0000 (From)>"
        );
        assert_eq!(copy.actions, vec!["Copy with file tunneling"]);
        assert_eq!(copy.classification, Classification::Normal);

        let expected_path = format!(" <- {COPY_OP} <- {CREATE_OP}");
        let origin = &parsed.records[1];
        assert_eq!(origin.classification, Classification::Origin);
        assert_eq!(origin.lineage_path, expected_path);
        assert_eq!(
            origin.actions,
            vec![
                "Create, possibly on other volume",
                "Create with file tunneling, possibly on other volume"
            ]
        );

        let normal = &parsed.records[2];
        assert_eq!(normal.classification, Classification::Normal);
        assert_eq!(normal.lineage_path, expected_path);
        assert_eq!(normal.operation_text, origin.operation_text);
        assert_eq!(normal.timestamp, origin.timestamp);
        assert_eq!(
            normal.actions,
            vec![
                "Update, possibly on other volume",
                "Update with last access update enabled, possibly on other volume"
            ]
        );
    }

    #[test]
    fn test_origin_only_operation_does_not_advance_anchor() {
        let line = r".\f (At 2020-OCTOBER-5 12:3:0.1000000 UTC: Update) <- (At 2020-OCTOBER-5 12:2:0.1000000 UTC: Create) <- (At 2020-OCTOBER-5 12:1:0.1000000 UTC: Rename)";
        let parsed = parse_line(line, 1, &["Create"].into_iter().collect()).unwrap();
        assert_eq!(parsed.records.len(), 3);

        let update_path = " <- (At 2020-OCTOBER-5 12:3:0.1000000 UTC: Update)";
        assert_eq!(parsed.records[0].lineage_path, update_path);
        assert_eq!(parsed.records[1].classification, Classification::Origin);
        assert_eq!(
            parsed.records[1].lineage_path,
            format!("{update_path} <- (At 2020-OCTOBER-5 12:2:0.1000000 UTC: Create)")
        );
        // Rename attaches to Update, skipping the origin-only Create.
        assert_eq!(
            parsed.records[2].lineage_path,
            format!("{update_path} <- (At 2020-OCTOBER-5 12:1:0.1000000 UTC: Rename)")
        );
    }

    #[test]
    fn test_line_without_operations_yields_no_records() {
        let parsed = parse_line(r"7 .\empty.txt", 7, &StateSet::new()).unwrap();
        assert!(parsed.records.is_empty());
        assert_eq!(parsed.file_path, r".\empty.txt");
    }

    #[test]
    fn test_malformed_timestamp_carries_line_number() {
        let line = r".\f (At 2020-NOVEMBRE-5 12:3:0.1000000 UTC: Update)";
        let err = parse_line(line, 12, &StateSet::new()).unwrap_err();
        assert!(matches!(
            err,
            ParseError::MalformedTimestamp {
                line_number: Some(12),
                ..
            }
        ));
    }

    #[test]
    fn test_parse_lines_in_order() {
        let parsed = parse_lines(&[MFT_LINE, COPY_LINE], &origin_states(), "").unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].file_path, r".\$MFT");
        assert_eq!(parsed[0].line_number, 1);
        assert_eq!(parsed[1].file_path, r".\Folder\test2.odt");
        assert_eq!(parsed[1].line_number, 2);
        assert_eq!(parsed[1].records.len(), 3);
    }

    #[test]
    fn test_parse_lines_filter() {
        let parsed = parse_lines(
            &[MFT_LINE, COPY_LINE],
            &origin_states(),
            r".\Folder\test2.odt",
        )
        .unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].line_number, 2);
        assert_eq!(parsed[0].records.len(), 3);
    }
}
