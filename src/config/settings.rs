//! Configuration settings for Stafett.

use crate::agent::RunnerConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub completion: CompletionSettings,
    pub audio: AudioSettings,
    pub runner: RunnerSettings,
    pub server: ServerSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Completion API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionSettings {
    /// Base URL of the OpenAI-compatible endpoint.
    pub base_url: String,
    /// Default chat model.
    pub model: String,
    /// Environment variable holding the API key.
    pub api_key_env: String,
    /// Per-request HTTP timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for CompletionSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            request_timeout_secs: 300,
        }
    }
}

/// Speech synthesis settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    /// Speech model to use.
    pub model: String,
    /// Voice used when the model does not pick one.
    pub default_voice: String,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            model: "tts-1".to_string(),
            default_voice: "alloy".to_string(),
        }
    }
}

/// Agent runner limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerSettings {
    /// Maximum completion rounds per run.
    pub max_iterations: usize,
    /// Wall-clock budget per run in milliseconds.
    pub timeout_ms: u64,
}

impl Default for RunnerSettings {
    fn default() -> Self {
        Self {
            max_iterations: 10,
            timeout_ms: 30_000,
        }
    }
}

impl RunnerSettings {
    /// Convert into the runner's config type.
    pub fn to_config(&self) -> RunnerConfig {
        RunnerConfig {
            max_iterations: self.max_iterations,
            timeout: Duration::from_millis(self.timeout_ms),
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Host to bind to.
    pub host: String,
    /// Port to bind to.
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to the default configuration file.
    pub fn save(&self) -> crate::error::Result<()> {
        self.save_to(&Self::default_config_path())
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::StafettError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("stafett")
            .join("config.toml")
    }

    /// Set one scalar setting by dotted key (e.g. `completion.model`).
    pub fn set_value(&mut self, key: &str, value: &str) -> crate::error::Result<()> {
        use crate::error::StafettError;

        fn parse<T: std::str::FromStr>(key: &str, value: &str) -> crate::error::Result<T> {
            value
                .parse()
                .map_err(|_| StafettError::Config(format!("Invalid value for {key}: {value}")))
        }

        match key {
            "general.log_level" => self.general.log_level = value.to_string(),
            "completion.base_url" => self.completion.base_url = value.to_string(),
            "completion.model" => self.completion.model = value.to_string(),
            "completion.api_key_env" => self.completion.api_key_env = value.to_string(),
            "completion.request_timeout_secs" => {
                self.completion.request_timeout_secs = parse(key, value)?
            }
            "audio.model" => self.audio.model = value.to_string(),
            "audio.default_voice" => self.audio.default_voice = value.to_string(),
            "runner.max_iterations" => self.runner.max_iterations = parse(key, value)?,
            "runner.timeout_ms" => self.runner.timeout_ms = parse(key, value)?,
            "server.host" => self.server.host = value.to_string(),
            "server.port" => self.server.port = parse(key, value)?,
            _ => return Err(StafettError::Config(format!("Unknown setting: {key}"))),
        }
        Ok(())
    }
}
