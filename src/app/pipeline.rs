// TimeTrail - app/pipeline.rs
//
// End-to-end run: state labels -> input lines -> parse -> trees -> export.
//
// Line parsing is pure and runs in parallel with rayon; the collect keeps
// input order. Tree construction is sequential because record order within
// a line and line order within a file decide node identity and parentage.

use crate::core::export::{export_csv, export_json, ExportFormat};
use crate::core::model::{ParsedLine, StateSet};
use crate::core::parser::{line_matches_filter, parse_line};
use crate::core::tree::generate_trees;
use crate::platform::config::AppConfig;
use crate::platform::fs;
use crate::util::error::{ExportError, ParseError, Result, TimeTrailError};
use rayon::prelude::*;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Everything a run needs, resolved from CLI flags and config.toml.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub input_path: PathBuf,
    /// Output path; its extension is replaced by the export format's.
    pub output_path: PathBuf,
    pub filter: String,
    pub origin_states_file: PathBuf,
    pub forgery_states_file: PathBuf,
    pub export_format: ExportFormat,
    pub pretty: bool,
}

impl RunOptions {
    /// Options for `input_path` with everything else taken from `config`.
    pub fn from_config(input_path: PathBuf, config: &AppConfig) -> Self {
        Self {
            input_path,
            output_path: config.output_path.clone(),
            filter: config.filter.clone(),
            origin_states_file: config.origin_states_file.clone(),
            forgery_states_file: config.forgery_states_file.clone(),
            export_format: config.export_format,
            pretty: config.pretty,
        }
    }

    /// The file the export is written to.
    pub fn output_file(&self) -> PathBuf {
        self.output_path
            .with_extension(self.export_format.extension())
    }
}

/// Counters reported at the end of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub lines_read: usize,
    pub lines_accepted: usize,
    pub records: usize,
    pub files: usize,
    pub nodes: usize,
    pub output_file: PathBuf,
}

impl std::fmt::Display for RunSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} of {} lines parsed, {} records -> {} files, {} nodes written to '{}'",
            self.lines_accepted,
            self.lines_read,
            self.records,
            self.files,
            self.nodes,
            self.output_file.display()
        )
    }
}

/// Parse every line containing `filter`, in parallel, preserving input order.
///
/// Every accepted line is parsed before errors are inspected, so the error
/// returned is always the one from the earliest malformed line.
pub fn parse_accepted_lines(
    lines: &[String],
    origin_states: &StateSet,
    filter: &str,
) -> std::result::Result<Vec<ParsedLine>, ParseError> {
    let results: Vec<std::result::Result<ParsedLine, ParseError>> = lines
        .par_iter()
        .enumerate()
        .filter(|(_, line)| line_matches_filter(line, filter))
        .map(|(idx, line)| parse_line(line, (idx as u64) + 1, origin_states))
        .collect();
    results.into_iter().collect()
}

/// Load one state-label file into a set.
pub fn load_states(path: &Path) -> Result<StateSet> {
    Ok(fs::read_state_labels(path)?.into_iter().collect())
}

/// Execute a full run and write the export.
pub fn run(options: &RunOptions) -> Result<RunSummary> {
    let started = Instant::now();

    let origin_states = load_states(&options.origin_states_file)?;
    let forgery_states = load_states(&options.forgery_states_file)?;
    tracing::info!(
        origin = origin_states.len(),
        forgery = forgery_states.len(),
        "State labels loaded"
    );

    let lines = fs::read_input_lines(&options.input_path)?;
    tracing::info!(
        path = %options.input_path.display(),
        lines = lines.len(),
        "Input read"
    );

    let parsed = parse_accepted_lines(&lines, &origin_states, &options.filter)?;
    let records: usize = parsed.iter().map(|l| l.records.len()).sum();
    if parsed.is_empty() && !options.filter.is_empty() {
        tracing::warn!(filter = %options.filter, "No input line matched the filter");
    }

    let forest = generate_trees(&parsed)?;
    tracing::info!(
        files = forest.len(),
        nodes = forest.total_nodes(),
        "Trees generated"
    );

    let output_file = options.output_file();
    if let Some(parent) = output_file.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| TimeTrailError::Io {
            path: parent.to_path_buf(),
            operation: "create output directory",
            source: e,
        })?;
    }
    let file = std::fs::File::create(&output_file).map_err(|e| TimeTrailError::Io {
        path: output_file.clone(),
        operation: "create output file",
        source: e,
    })?;
    let mut writer = BufWriter::new(file);

    let nodes = match options.export_format {
        ExportFormat::Json => export_json(
            &forest,
            &origin_states,
            &forgery_states,
            &mut writer,
            options.pretty,
            &output_file,
        )?,
        ExportFormat::Csv => export_csv(&forest, &forgery_states, &mut writer, &output_file)?,
    };
    writer.flush().map_err(|e| ExportError::Write {
        path: output_file.clone(),
        source: e,
    })?;

    tracing::info!(
        path = %output_file.display(),
        nodes,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Export complete"
    );

    Ok(RunSummary {
        lines_read: lines.len(),
        lines_accepted: parsed.len(),
        records,
        files: forest.len(),
        nodes,
        output_file,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const LINES: [&str; 3] = [
        r"0 .\$MFT (At 2020-OCTOBER-5 12:1:30.2715742 UTC: Create)",
        r"1 .\a.txt (At 2020-OCTOBER-5 12:1:31.0000001 UTC: Update) <- (At 2020-OCTOBER-5 12:1:30.0000001 UTC: Create)",
        r"2 .\a.txt (At 2020-OCTOBER-5 12:1:32.0000001 UTC: Access) <- (At 2020-OCTOBER-5 12:1:31.0000001 UTC: Update)",
    ];

    fn owned(lines: &[&str]) -> Vec<String> {
        lines.iter().map(|l| l.to_string()).collect()
    }

    #[test]
    fn test_parallel_parse_preserves_order() {
        let parsed = parse_accepted_lines(&owned(&LINES), &StateSet::new(), "").unwrap();
        let numbers: Vec<_> = parsed.iter().map(|l| l.line_number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
    }

    #[test]
    fn test_parallel_parse_applies_filter() {
        let parsed = parse_accepted_lines(&owned(&LINES), &StateSet::new(), r".\a.txt").unwrap();
        assert_eq!(parsed.len(), 2);
        assert!(parsed.iter().all(|l| l.file_path == r".\a.txt"));
    }

    #[test]
    fn test_parallel_parse_propagates_malformed_timestamp() {
        let lines = owned(&[r".\x (At 2020-OCTOBER-99 1:1:1.1 UTC: Create)"]);
        let result = parse_accepted_lines(&lines, &StateSet::new(), "");
        assert!(matches!(
            result,
            Err(ParseError::MalformedTimestamp {
                line_number: Some(1),
                ..
            })
        ));
    }

    #[test]
    fn test_parallel_parse_reports_earliest_malformed_line() {
        let good = r".\a.txt (At 2020-OCTOBER-5 12:1:31.0000001 UTC: Update)";
        let bad = r".\a.txt (At 2020-OCTOBER-45 12:1:31.0000001 UTC: Update)";
        let mut lines = vec![good.to_string(); 2_000];
        for idx in [7, 500, 1_999] {
            lines[idx] = bad.to_string();
        }

        for _ in 0..20 {
            let result = parse_accepted_lines(&lines, &StateSet::new(), "");
            assert!(matches!(
                result,
                Err(ParseError::MalformedTimestamp {
                    line_number: Some(8),
                    ..
                })
            ));
        }
    }

    #[test]
    fn test_output_file_takes_format_extension() {
        let mut options = RunOptions::from_config(PathBuf::from("in.txt"), &AppConfig::default());
        options.output_path = PathBuf::from("out/graph.png");
        assert_eq!(options.output_file(), PathBuf::from("out/graph.json"));
        options.export_format = ExportFormat::Csv;
        assert_eq!(options.output_file(), PathBuf::from("out/graph.csv"));
    }
}
