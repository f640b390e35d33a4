//! Logging System
//!
//! Structured logging via `tracing`. Level, format, and destination are resolved
//! with precedence command-line flags, then `TETHER_LOG*` environment variables,
//! then defaults (warnings only, on stderr). Diagnostics never go to stdout unless
//! asked for, so `--json` output stays machine-readable.

use crate::config::EnvSnapshot;
use crate::error::{Result, TetherError};
use serde::{Deserialize, Serialize};
use std::io::IsTerminal;
use std::path::PathBuf;
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::fmt::writer::{BoxMakeWriter, MakeWriterExt};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

pub const ENV_LOG: &str = "TETHER_LOG";
pub const ENV_LOG_FORMAT: &str = "TETHER_LOG_FORMAT";
pub const ENV_LOG_OUTPUT: &str = "TETHER_LOG_OUTPUT";
pub const ENV_LOG_FILE: &str = "TETHER_LOG_FILE";

/// Resolve the log file path: explicit value, then `TETHER_LOG_FILE`, then the platform state dir.
pub fn resolve_log_file_path(explicit: Option<PathBuf>, env: &EnvSnapshot) -> Result<PathBuf> {
    if let Some(p) = explicit.filter(|p| !p.as_os_str().is_empty()) {
        return Ok(p);
    }
    if let Some(p) = env.get(ENV_LOG_FILE) {
        return Ok(PathBuf::from(p));
    }
    default_log_file_path()
}

fn default_log_file_path() -> Result<PathBuf> {
    let project_dirs = directories::ProjectDirs::from("name", "tether", "tether").ok_or_else(|| {
        TetherError::Config("Could not determine platform state directory for log file".to_string())
    })?;
    // macOS and Windows have no state dir; fall back to the data dir there.
    let dir = project_dirs
        .state_dir()
        .unwrap_or_else(|| project_dirs.data_local_dir());
    Ok(dir.join("tether.log"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Text,
    Json,
}

impl LogFormat {
    fn parse(raw: &str) -> Result<Self> {
        match raw {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            _ => Err(TetherError::Config(format!(
                "Invalid log format: {} (must be 'json' or 'text')",
                raw
            ))),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive: a level or `target=level` list
    pub level: String,

    pub format: LogFormat,

    /// Output destination: stdout, stderr, file, file+stderr, both
    pub output: String,

    /// Log file path when output includes file; None means use the runtime default
    pub file: Option<PathBuf>,

    /// ANSI colors (text format on a terminal only)
    pub color: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: LogFormat::Text,
            output: "stderr".to_string(),
            file: None,
            color: std::io::stderr().is_terminal(),
        }
    }
}

impl LoggingConfig {
    /// Defaults, overlaid with `TETHER_LOG*` values, overlaid with `--verbose`.
    pub fn resolve(verbose: bool, env: &EnvSnapshot) -> Result<Self> {
        let mut config = Self::default();
        if let Some(level) = env.get(ENV_LOG) {
            config.level = level.to_string();
        }
        if let Some(format) = env.get(ENV_LOG_FORMAT) {
            config.format = LogFormat::parse(format)?;
        }
        if let Some(output) = env.get(ENV_LOG_OUTPUT) {
            parse_output_destinations(output)?;
            config.output = output.to_string();
        }
        if let Some(file) = env.get(ENV_LOG_FILE) {
            config.file = Some(PathBuf::from(file));
        }
        if verbose {
            config.level = "debug".to_string();
            config.output = "stderr".to_string();
        }
        Ok(config)
    }
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init_logging(config: &LoggingConfig, env: &EnvSnapshot) -> Result<()> {
    let filter = build_env_filter(config)?;
    let output = parse_output_destinations(&config.output)?;

    let get_file_writer = || -> Result<std::fs::File> {
        let log_file = resolve_log_file_path(config.file.clone(), env)?;
        if let Some(parent) = log_file.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                TetherError::Config(format!("Failed to create log directory: {}", e))
            })?;
        }
        std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .map_err(|e| {
                TetherError::Config(format!("Failed to open log file {:?}: {}", log_file, e))
            })
    };

    let writer = if output.file && output.stderr {
        BoxMakeWriter::new(get_file_writer()?.and(std::io::stderr))
    } else if output.file {
        BoxMakeWriter::new(get_file_writer()?)
    } else if output.stdout && output.stderr {
        BoxMakeWriter::new(std::io::stdout.and(std::io::stderr))
    } else if output.stderr {
        BoxMakeWriter::new(std::io::stderr)
    } else {
        BoxMakeWriter::new(std::io::stdout)
    };

    let layer = fmt::layer()
        .with_target(true)
        .with_timer(ChronoUtc::rfc_3339())
        .with_writer(writer);
    let base_subscriber = Registry::default().with(filter);

    let installed = match config.format {
        LogFormat::Json => base_subscriber.with(layer.json()).try_init(),
        LogFormat::Text => base_subscriber
            .with(layer.with_ansi(config.color && !output.file))
            .try_init(),
    };
    installed.map_err(|e| TetherError::Config(format!("Failed to install logger: {}", e)))
}

fn build_env_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    EnvFilter::try_new(&config.level)
        .map_err(|e| TetherError::Config(format!("Invalid log directive: {}", e)))
}

/// Output destinations
#[derive(Debug)]
struct OutputDestinations {
    stdout: bool,
    stderr: bool,
    file: bool,
}

fn parse_output_destinations(output: &str) -> Result<OutputDestinations> {
    let (stdout, stderr, file) = match output {
        "stdout" => (true, false, false),
        "stderr" => (false, true, false),
        "file" => (false, false, true),
        "file+stderr" => (false, true, true),
        "both" => (true, true, false),
        _ => {
            return Err(TetherError::Config(format!(
                "Invalid log output: {} (must be 'stdout', 'stderr', 'file', 'file+stderr', or 'both')",
                output
            )))
        }
    };
    Ok(OutputDestinations {
        stdout,
        stderr,
        file,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_logging_config() {
        let config = LoggingConfig::default();
        assert_eq!(config.level, "warn");
        assert_eq!(config.format, LogFormat::Text);
        assert_eq!(config.output, "stderr");
        assert_eq!(config.file, None);
    }

    #[test]
    fn test_parse_output_destinations() {
        let out = parse_output_destinations("stdout").unwrap();
        assert!(out.stdout);
        assert!(!out.stderr);
        assert!(!out.file);

        let out = parse_output_destinations("both").unwrap();
        assert!(out.stdout);
        assert!(out.stderr);
        assert!(!out.file);

        let out = parse_output_destinations("file+stderr").unwrap();
        assert!(!out.stdout);
        assert!(out.stderr);
        assert!(out.file);

        assert!(parse_output_destinations("syslog").is_err());
    }

    #[test]
    fn test_env_overrides_defaults() {
        let env = EnvSnapshot::from_pairs([
            (ENV_LOG, "tether=trace"),
            (ENV_LOG_FORMAT, "json"),
            (ENV_LOG_OUTPUT, "file"),
            (ENV_LOG_FILE, "/tmp/t.log"),
        ]);
        let config = LoggingConfig::resolve(false, &env).unwrap();
        assert_eq!(config.level, "tether=trace");
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.output, "file");
        assert_eq!(config.file, Some(PathBuf::from("/tmp/t.log")));
    }

    #[test]
    fn test_verbose_wins_over_env() {
        let env = EnvSnapshot::from_pairs([(ENV_LOG, "error"), (ENV_LOG_OUTPUT, "stdout")]);
        let config = LoggingConfig::resolve(true, &env).unwrap();
        assert_eq!(config.level, "debug");
        assert_eq!(config.output, "stderr");
    }

    #[test]
    fn test_invalid_env_values_are_rejected() {
        let env = EnvSnapshot::from_pairs([(ENV_LOG_FORMAT, "xml")]);
        assert!(LoggingConfig::resolve(false, &env).is_err());
        let env = EnvSnapshot::from_pairs([(ENV_LOG_OUTPUT, "nowhere")]);
        assert!(LoggingConfig::resolve(false, &env).is_err());
    }

    #[test]
    fn test_resolve_log_file_path_explicit_wins() {
        let env = EnvSnapshot::from_pairs([(ENV_LOG_FILE, "/env/tether.log")]);
        let path = resolve_log_file_path(Some(PathBuf::from("/tmp/cli.log")), &env).unwrap();
        assert_eq!(path, PathBuf::from("/tmp/cli.log"));
    }

    #[test]
    fn test_resolve_log_file_path_env_when_explicit_none() {
        let env = EnvSnapshot::from_pairs([(ENV_LOG_FILE, "/env/tether.log")]);
        let path = resolve_log_file_path(None, &env).unwrap();
        assert_eq!(path, PathBuf::from("/env/tether.log"));
    }

    #[test]
    fn test_resolve_log_file_path_default_fallback() {
        let path = resolve_log_file_path(None, &EnvSnapshot::default()).unwrap();
        assert!(path.ends_with("tether.log"));
        assert!(path.components().count() >= 2);
    }
}
