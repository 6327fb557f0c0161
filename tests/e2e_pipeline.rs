// TimeTrail - tests/e2e_pipeline.rs
//
// End-to-end tests for the parse -> tree -> export pipeline.
//
// These tests read the fixture timeline and state files from disk, run the
// real parser (regex grammar, chrono timestamps, rayon batch), build the
// trees, and check the exported JSON/CSV. No mocks.

use std::fs;
use std::path::{Path, PathBuf};
use timetrail::app::pipeline::{self, RunOptions};
use timetrail::core::export::ExportFormat;
use timetrail::core::model::{Classification, StateSet};
use timetrail::core::parser::parse_lines;
use timetrail::core::tree::{generate_trees, NodeId};
use timetrail::platform::fs as platform_fs;
use timetrail::util::error::TimeTrailError;

// =============================================================================
// Helpers
// =============================================================================

/// Absolute path to the on-disk fixture files.
fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn options(output_dir: &Path, format: ExportFormat) -> RunOptions {
    RunOptions {
        input_path: fixture("sample_timeline.txt"),
        output_path: output_dir.join("trees"),
        filter: String::new(),
        origin_states_file: fixture("origin-states.txt"),
        forgery_states_file: fixture("forgery-states.txt"),
        export_format: format,
        pretty: true,
    }
}

fn fixture_origin_states() -> StateSet {
    platform_fs::read_state_labels(&fixture("origin-states.txt"))
        .unwrap()
        .into_iter()
        .collect()
}

// =============================================================================
// Library-level E2E
// =============================================================================

/// The fixture state file yields its three labels, comments and blanks dropped.
#[test]
fn e2e_reads_origin_state_fixture() {
    let states = fixture_origin_states();
    assert_eq!(
        states.iter().collect::<Vec<_>>(),
        vec!["Create", "Create with file tunneling", "Copy"]
    );
}

/// Repeated lines for the same file collapse; a different chain branches
/// from the same root.
#[test]
fn e2e_fixture_trees_have_expected_shape() {
    let lines = platform_fs::read_input_lines(&fixture("sample_timeline.txt")).unwrap();
    let parsed = parse_lines(&lines, &fixture_origin_states(), "").unwrap();
    assert_eq!(parsed.len(), 7);

    let forest = generate_trees(&parsed).unwrap();
    assert_eq!(forest.len(), 5);
    assert_eq!(forest.total_nodes(), 19);

    let odt = forest.get(r".\Folder\test2.odt").unwrap();
    assert_eq!(odt.len(), 7);
    assert_eq!(odt.root().actions, vec![r".\Folder\test2.odt"]);
    assert_eq!(odt.root().children.len(), 2);

    // Line 40's Copy record has the origin and normal halves of Create below it.
    let copy = &parsed[2].records[0];
    assert_eq!(copy.classification, Classification::Normal);
    let copy_node = odt.node_for(copy).unwrap();
    assert_eq!(copy_node.children.len(), 2);
    assert!(odt.get(&copy_node.children[0]).unwrap().origin_state);
    assert!(!odt.get(&copy_node.children[1]).unwrap().origin_state);

    // The dot line has no path marker and is grouped under "".
    let dot = forest.get("").unwrap();
    assert_eq!(dot.len(), 4);
}

/// The origin half of an operation hangs off the previous normal node, not
/// off its own normal half.
#[test]
fn e2e_origin_and_normal_share_parent() {
    let lines = platform_fs::read_input_lines(&fixture("sample_timeline.txt")).unwrap();
    let parsed = parse_lines(&lines, &fixture_origin_states(), "").unwrap();
    let forest = generate_trees(&parsed).unwrap();
    let notes = forest.get(r".\Folder\notes.txt").unwrap();

    let records = &parsed[5].records;
    assert_eq!(records.len(), 3);
    assert_eq!(records[1].actions, vec!["Copy, on other volume"]);
    assert_eq!(records[2].actions, vec!["Copy with quirk, on other volume"]);

    let move_id = NodeId::of(&records[0]);
    assert_eq!(notes.parent_of(&NodeId::of(&records[1])).unwrap().id, move_id);
    assert_eq!(notes.parent_of(&NodeId::of(&records[2])).unwrap().id, move_id);
}

// =============================================================================
// Pipeline E2E
// =============================================================================

#[test]
fn e2e_pipeline_writes_json() {
    let dir = tempfile::tempdir().unwrap();
    let summary = pipeline::run(&options(dir.path(), ExportFormat::Json)).unwrap();

    assert_eq!(summary.lines_read, 7);
    assert_eq!(summary.lines_accepted, 7);
    assert_eq!(summary.records, 17);
    assert_eq!(summary.files, 5);
    assert_eq!(summary.nodes, 19);
    assert_eq!(summary.output_file, dir.path().join("trees.json"));

    let content = fs::read_to_string(&summary.output_file).unwrap();
    let doc: serde_json::Value = serde_json::from_str(&content).unwrap();
    assert_eq!(doc["origin_states"].as_array().unwrap().len(), 3);

    let files = doc["files"].as_array().unwrap();
    assert_eq!(files[0]["file_path"], r".\$MFT");

    let mft_nodes = files[0]["nodes"].as_array().unwrap();
    assert_eq!(mft_nodes.len(), 2);
    assert_eq!(
        mft_nodes[1]["timestamp"],
        "<TIMESTAMP 2020-10-05T12:01:30.2715742 +0000 (At)>"
    );
    assert_eq!(mft_nodes[1]["origin_state"], true);

    let odt = files
        .iter()
        .find(|f| f["file_path"] == r".\Folder\test2.odt")
        .unwrap();
    let forged: Vec<_> = odt["nodes"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|n| n["forgery"] == true)
        .collect();
    assert_eq!(forged.len(), 1);
    assert_eq!(forged[0]["actions"][0], "Overwriting move from another volume");
    assert_eq!(forged[0]["forged_actions"], serde_json::json!([true]));
}

#[test]
fn e2e_pipeline_filter_keeps_matching_lines_only() {
    let dir = tempfile::tempdir().unwrap();
    let mut opts = options(dir.path(), ExportFormat::Json);
    opts.filter = r".\Folder\test2.odt".to_string();

    let summary = pipeline::run(&opts).unwrap();
    assert_eq!(summary.lines_accepted, 3);
    assert_eq!(summary.files, 1);
    assert_eq!(summary.nodes, 7);
}

#[test]
fn e2e_pipeline_writes_csv() {
    let dir = tempfile::tempdir().unwrap();
    let summary = pipeline::run(&options(dir.path(), ExportFormat::Csv)).unwrap();
    assert_eq!(summary.output_file, dir.path().join("trees.csv"));

    let mut reader = csv::Reader::from_path(&summary.output_file).unwrap();
    let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 19);
    assert!(rows
        .iter()
        .any(|r| &r[3] == "<TIMESTAMP 2020-10-05T12:04:00.5000000 +0000 (After)>"));
}

#[test]
fn e2e_pipeline_missing_states_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let mut opts = options(dir.path(), ExportFormat::Json);
    opts.origin_states_file = dir.path().join("missing-origin.txt");

    let result = pipeline::run(&opts);
    assert!(
        matches!(result, Err(TimeTrailError::Io { .. })),
        "expected Io error, got {result:?}"
    );
}

#[test]
fn e2e_pipeline_malformed_timestamp_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("bad.txt");
    fs::write(
        &input,
        "1 .\\ok.txt (At 2020-OCTOBER-5 12:1:30.2715742 UTC: Create)\n\
         2 .\\bad.txt (At 2020-OCTOBRE-5 12:1:30.2715742 UTC: Create)\n",
    )
    .unwrap();
    let mut opts = options(dir.path(), ExportFormat::Json);
    opts.input_path = input;

    let err = pipeline::run(&opts).unwrap_err();
    assert!(err.to_string().contains("line 2"), "unexpected error: {err}");
    assert!(!dir.path().join("trees.json").exists());
}

#[test]
fn e2e_pipeline_unknown_zone_label_is_not_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("cet.txt");
    fs::write(
        &input,
        "1 .\\ok.txt (At 2020-OCTOBER-5 12:1:30.2715742 UTC: Create)\n\
         2 .\\cet.txt (At 2020-OCTOBER-5 12:1:30.2715742 CET: Create)\n",
    )
    .unwrap();
    let mut opts = options(dir.path(), ExportFormat::Json);
    opts.input_path = input;

    let summary = pipeline::run(&opts).unwrap();
    assert_eq!(summary.files, 2);

    let content = fs::read_to_string(&summary.output_file).unwrap();
    let doc: serde_json::Value = serde_json::from_str(&content).unwrap();
    assert_eq!(
        doc["files"][1]["nodes"][1]["timestamp"],
        "<TIMESTAMP 2020-10-05T12:01:30.2715742  (At)>"
    );
}
