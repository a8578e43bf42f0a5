//! Runtime configuration loading from environment variables.
//!
//! All configuration values are loaded from `SENTRA_*` environment
//! variables with sensible defaults. Invalid values fall back to defaults
//! without crashing.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |---|---|---|
//! | `SENTRA_AUDIT_LOG` | `<exe>.log` | Restricted-mode audit log path |
//! | `SENTRA_LOG_LEVEL` | `info` | Tracing filter directive |
//! | `SENTRA_LOG_FORMAT` | `json` | `json` or `pretty` |
//! | `SENTRA_MAX_RENDER_LEN` | 200 | Max rendered payload chars (floor 16) |

use std::path::PathBuf;

use serde::Serialize;

use crate::telemetry::{LogConfig, LogFormat};

/// Effective configuration summary (serializable, for `config show`).
#[derive(Debug, Clone, Serialize)]
pub struct EffectiveConfig {
    pub audit_log: String,
    pub log_level: String,
    pub log_format: String,
    pub max_render_len: usize,
}

/// All runtime configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct EnvConfig {
    /// Restricted-mode audit log destination.
    pub audit_log: PathBuf,
    pub log: LogConfig,
    /// Truncation cap for rendered event payloads in the audit log.
    pub max_render_len: usize,
}

/// Parse a `usize` env var, returning `default` on missing or invalid.
fn parse_usize(key: &str, default: usize) -> usize {
    match std::env::var(key) {
        Ok(val) => val.parse::<usize>().unwrap_or(default),
        Err(_) => default,
    }
}

/// Default audit log path: next to the executable, `.log` appended.
fn default_audit_log() -> PathBuf {
    let exe = std::env::current_exe().unwrap_or_else(|_| PathBuf::from("sentra"));
    let mut name = exe.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".log");
    exe.with_file_name(name)
}

/// Load all configuration from environment variables.
///
/// Missing or invalid values fall back to safe defaults without panicking.
pub fn load() -> EnvConfig {
    let audit_log = std::env::var("SENTRA_AUDIT_LOG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| default_audit_log());

    let level = std::env::var("SENTRA_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    let format = match std::env::var("SENTRA_LOG_FORMAT").as_deref() {
        Ok("pretty") => LogFormat::Pretty,
        _ => LogFormat::Json,
    };

    let max_render_len = parse_usize("SENTRA_MAX_RENDER_LEN", 200).max(16);

    EnvConfig {
        audit_log,
        log: LogConfig {
            format,
            level,
            output_path: None,
        },
        max_render_len,
    }
}

impl EnvConfig {
    /// Return a serializable summary of all effective values.
    pub fn effective_config(&self) -> EffectiveConfig {
        EffectiveConfig {
            audit_log: self.audit_log.display().to_string(),
            log_level: self.log.level.clone(),
            log_format: match self.log.format {
                LogFormat::Json => "json".to_string(),
                LogFormat::Pretty => "pretty".to_string(),
            },
            max_render_len: self.max_render_len,
        }
    }
}
