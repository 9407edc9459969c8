//! Application configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Global application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Preview scheduling defaults.
    pub preview: PreviewDefaults,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Default preview scheduling parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreviewDefaults {
    /// Delay between the last settings edit and preview generation (ms).
    pub debounce_ms: u64,

    /// Length of the transcoded preview segment in video mode (seconds).
    pub segment_secs: f64,

    /// Delay after a segment is produced before handing it to the player,
    /// so the backend can release its filesystem lock (ms).
    pub settle_ms: u64,

    /// Consecutive playback decode failures before a segment is abandoned.
    pub playback_failure_threshold: u32,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "peekframe=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path.
    pub file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            preview: PreviewDefaults::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for PreviewDefaults {
    fn default() -> Self {
        Self {
            debounce_ms: 5000,
            segment_secs: 3.0,
            settle_ms: 150,
            playback_failure_threshold: 3,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        let config_path = config_file_path();
        if config_path.exists() {
            match std::fs::read_to_string(&config_path) {
                Ok(content) => match serde_json::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => {
                        tracing::warn!("Failed to parse config at {:?}: {}", config_path, e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::default()
    }
}

/// Standard config file location.
fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("peekframe").join("config.json")
}
