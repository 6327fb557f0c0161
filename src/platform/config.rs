// TimeTrail - platform/config.rs
//
// Platform-specific configuration directory resolution and config.toml
// loading with startup validation.
//
// Uses the `directories` crate for XDG (Linux), AppData (Windows),
// Library (macOS) compliance.

use crate::core::export::ExportFormat;
use crate::util::constants;
use crate::util::error::ConfigError;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Resolve the platform configuration directory.
///
/// Falls back to the current directory if platform dirs cannot be determined.
pub fn default_config_dir() -> PathBuf {
    match ProjectDirs::from("", "", constants::APP_ID) {
        Some(proj_dirs) => {
            let config_dir = proj_dirs.config_dir().to_path_buf();
            tracing::debug!(config = %config_dir.display(), "Platform config directory resolved");
            config_dir
        }
        None => {
            tracing::warn!("Could not determine platform directories, using current directory");
            PathBuf::from(".")
        }
    }
}

// =============================================================================
// config.toml loading and validation
// =============================================================================

/// Raw deserialisable shape of config.toml.
///
/// Unknown keys are silently ignored for forward compatibility.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct RawConfig {
    /// `[input]` section.
    pub input: InputSection,
    /// `[states]` section.
    pub states: StatesSection,
    /// `[output]` section.
    pub output: OutputSection,
    /// `[logging]` section.
    pub logging: LoggingSection,
}

/// `[input]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct InputSection {
    /// Only lines containing this substring are parsed.
    pub filter: Option<String>,
}

/// `[states]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct StatesSection {
    pub origin_states_file: Option<String>,
    pub forgery_states_file: Option<String>,
}

/// `[output]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct OutputSection {
    /// Output path; the extension is taken from `format`.
    pub path: Option<String>,
    /// "json" or "csv".
    pub format: Option<String>,
    /// Pretty-print JSON output.
    pub pretty: Option<bool>,
}

/// `[logging]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub level: Option<String>,
    /// Log file path (empty = stderr only).
    pub file: Option<String>,
}

/// Validated application configuration derived from `config.toml`.
///
/// Invalid values produce warnings and fall back to defaults.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub filter: String,
    pub origin_states_file: PathBuf,
    pub forgery_states_file: PathBuf,
    pub output_path: PathBuf,
    pub export_format: ExportFormat,
    pub pretty: bool,
    /// Logging level string (for init before tracing is available).
    pub log_level: Option<String>,
    pub log_file: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            filter: String::new(),
            origin_states_file: PathBuf::from(constants::DEFAULT_ORIGIN_STATES_FILE),
            forgery_states_file: PathBuf::from(constants::DEFAULT_FORGERY_STATES_FILE),
            output_path: PathBuf::from(constants::DEFAULT_OUTPUT_PATH),
            export_format: ExportFormat::default(),
            pretty: false,
            log_level: None,
            log_file: None,
        }
    }
}

/// Load and validate `config.toml` from the given config directory.
///
/// Returns `AppConfig` with validated values and a list of non-fatal warnings.
/// If the file does not exist, returns defaults with no warnings (first run).
/// If the file is unparseable, returns defaults with a single warning; the
/// run still proceeds.
pub fn load_config(config_dir: &Path) -> (AppConfig, Vec<ConfigError>) {
    let config_path = config_dir.join(constants::CONFIG_FILE_NAME);
    let mut warnings: Vec<ConfigError> = Vec::new();

    if !config_path.exists() {
        tracing::debug!(path = %config_path.display(), "No config.toml found; using defaults");
        return (AppConfig::default(), warnings);
    }

    let content = match std::fs::read_to_string(&config_path) {
        Ok(c) => c,
        Err(e) => {
            warnings.push(ConfigError::Io {
                path: config_path,
                source: e,
            });
            return (AppConfig::default(), warnings);
        }
    };

    let raw: RawConfig = match toml::from_str(&content) {
        Ok(r) => r,
        Err(e) => {
            warnings.push(ConfigError::TomlParse {
                path: config_path,
                source: e,
            });
            return (AppConfig::default(), warnings);
        }
    };

    tracing::info!(path = %config_path.display(), "Loaded config.toml");

    let (config, mut validation) = validate(raw);
    warnings.append(&mut validation);

    if !warnings.is_empty() {
        tracing::warn!(
            count = warnings.len(),
            "Config validation produced warnings"
        );
    }

    (config, warnings)
}

/// Validate a raw config, accumulating every problem instead of stopping
/// at the first one.
pub fn validate(raw: RawConfig) -> (AppConfig, Vec<ConfigError>) {
    let mut config = AppConfig::default();
    let mut warnings = Vec::new();

    if let Some(filter) = raw.input.filter {
        config.filter = filter;
    }

    // -- States: file paths --
    if let Some(path) = raw.states.origin_states_file {
        if path.is_empty() {
            warnings.push(ConfigError::InvalidValue {
                field: "states.origin_states_file",
                value: path,
                expected: "a non-empty path",
            });
        } else {
            config.origin_states_file = PathBuf::from(path);
        }
    }
    if let Some(path) = raw.states.forgery_states_file {
        if path.is_empty() {
            warnings.push(ConfigError::InvalidValue {
                field: "states.forgery_states_file",
                value: path,
                expected: "a non-empty path",
            });
        } else {
            config.forgery_states_file = PathBuf::from(path);
        }
    }

    // -- Output --
    if let Some(path) = raw.output.path {
        if !path.is_empty() {
            config.output_path = PathBuf::from(path);
        }
    }
    if let Some(format) = raw.output.format {
        match ExportFormat::from_name(&format) {
            Some(f) => config.export_format = f,
            None => warnings.push(ConfigError::InvalidValue {
                field: "output.format",
                value: format,
                expected: "\"json\" or \"csv\"",
            }),
        }
    }
    if let Some(pretty) = raw.output.pretty {
        config.pretty = pretty;
    }

    // -- Logging: level --
    if let Some(level) = raw.logging.level {
        let valid = ["error", "warn", "info", "debug", "trace"];
        if valid.contains(&level.to_lowercase().as_str()) {
            config.log_level = Some(level);
        } else {
            warnings.push(ConfigError::InvalidValue {
                field: "logging.level",
                value: level,
                expected: "error, warn, info, debug, or trace",
            });
        }
    }

    // -- Logging: file --
    if let Some(file) = raw.logging.file {
        if !file.is_empty() {
            config.log_file = Some(file);
        }
    }

    (config, warnings)
}
