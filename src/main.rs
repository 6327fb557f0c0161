// TimeTrail - main.rs
//
// Application entry point. Handles:
// 1. CLI argument parsing
// 2. config.toml loading (CLI flags override config values)
// 3. Logging initialisation (debug mode support)
// 4. Running the parse -> tree -> export pipeline

use clap::Parser;
use std::path::PathBuf;
use timetrail::app::pipeline::{self, RunOptions};
use timetrail::core::export::ExportFormat;
use timetrail::platform::config;
use timetrail::util;

/// TimeTrail - provenance trees from filesystem timestamp-analyser output.
///
/// Reads one line per filesystem object, each a chain of dated operations
/// separated by `<-`, and writes a per-file tree of deduplicated operation
/// nodes for a diagram renderer.
#[derive(Parser, Debug)]
#[command(name = "TimeTrail", version, about)]
struct Cli {
    /// Analyser output file to parse.
    input: PathBuf,

    /// Output path (extension is set from --format).
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// Only parse lines containing this exact substring (e.g. a file path).
    #[arg(short = 'f', long = "filter")]
    filter: Option<String>,

    /// File listing origin states, one per line.
    #[arg(short = 'O', long = "origin-states")]
    origin_states: Option<PathBuf>,

    /// File listing forgery states, one per line.
    #[arg(short = 'F', long = "forgery-states")]
    forgery_states: Option<PathBuf>,

    /// Export format.
    #[arg(long = "format", value_parser = ["json", "csv"])]
    format: Option<String>,

    /// Pretty-print JSON output.
    #[arg(long = "pretty")]
    pretty: bool,

    /// Directory containing config.toml (defaults to the platform config dir).
    #[arg(long = "config-dir")]
    config_dir: Option<PathBuf>,

    /// Enable debug logging (equivalent to RUST_LOG=debug).
    #[arg(short = 'd', long = "debug")]
    debug: bool,
}

impl Cli {
    /// Merge CLI overrides onto config-derived options.
    fn into_options(self, app_config: &config::AppConfig) -> RunOptions {
        let mut options = RunOptions::from_config(self.input, app_config);
        if let Some(output) = self.output {
            options.output_path = output;
        }
        if let Some(filter) = self.filter {
            options.filter = filter;
        }
        if let Some(path) = self.origin_states {
            options.origin_states_file = path;
        }
        if let Some(path) = self.forgery_states {
            options.forgery_states_file = path;
        }
        if let Some(format) = self.format.as_deref().and_then(ExportFormat::from_name) {
            options.export_format = format;
        }
        options.pretty |= self.pretty;
        options
    }
}

fn main() {
    let cli = Cli::parse();

    // Config is loaded before logging so its level can take part in the
    // filter; its warnings are replayed once the subscriber exists.
    let config_dir = cli
        .config_dir
        .clone()
        .unwrap_or_else(config::default_config_dir);
    let (app_config, config_warnings) = config::load_config(&config_dir);

    util::logging::init(
        cli.debug,
        app_config.log_level.as_deref(),
        app_config.log_file.as_deref(),
    );

    tracing::info!(
        version = util::constants::APP_VERSION,
        debug = cli.debug,
        "TimeTrail starting"
    );

    for warning in &config_warnings {
        tracing::warn!(error = %warning, "Config warning");
    }

    let options = cli.into_options(&app_config);

    match pipeline::run(&options) {
        Ok(summary) => println!("{summary}"),
        Err(e) => {
            tracing::error!(error = %e, "Run failed");
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}
