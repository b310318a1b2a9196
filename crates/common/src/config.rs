//! Application configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable that overrides [`BackendConfig::api_base`].
pub const API_BASE_ENV: &str = "SHOTLIST_API_BASE";

/// Global application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Rendering/persistence backend connection settings.
    #[serde(default)]
    pub backend: BackendConfig,

    /// Editor behavior defaults.
    #[serde(default)]
    pub editor: EditorDefaults,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Where the backend lives and how long to wait for it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// API base URL including the `/api` prefix.
    pub api_base: String,

    /// Per-request timeout in seconds. Renders can take minutes.
    pub request_timeout_secs: u64,
}

/// Default editor parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorDefaults {
    /// Quiet period before a silent autosave fires (milliseconds).
    pub autosave_debounce_ms: u64,

    /// Maximum number of deleted segments kept for restore.
    pub undo_capacity: usize,

    /// Number of leading segments rendered by a preview.
    pub preview_count: usize,

    /// Timeline zoom in pixels per second.
    pub pixels_per_second: f64,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "shotlist=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path. Logs go to stderr when unset.
    pub file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend: BackendConfig::default(),
            editor: EditorDefaults::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            api_base: "http://localhost:8080/api".to_string(),
            request_timeout_secs: 600,
        }
    }
}

impl Default for EditorDefaults {
    fn default() -> Self {
        Self {
            autosave_debounce_ms: 3000,
            undo_capacity: 50,
            preview_count: 3,
            pixels_per_second: 60.0,
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
    ///
    /// `SHOTLIST_API_BASE` wins over whatever the file says.
    pub fn load() -> Self {
        let mut config = Self::load_from(&config_file_path());
        if let Ok(base) = std::env::var(API_BASE_ENV) {
            if !base.trim().is_empty() {
                config.backend.api_base = base;
            }
        }
        config
    }

    /// Load config from an explicit path, falling back to defaults.
    pub fn load_from(config_path: &Path) -> Self {
        if config_path.exists() {
            match std::fs::read_to_string(config_path) {
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

    /// Save config to the standard location.
    pub fn save(&self) -> Result<(), std::io::Error> {
        let config_path = config_file_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(config_path, json)
    }

    /// Autosave quiet period as a `Duration`.
    pub fn autosave_debounce(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.editor.autosave_debounce_ms)
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
    base.join("shotlist").join("config.json")
}
