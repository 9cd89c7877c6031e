// Required external crates for configuration management and serialization
use serde::Deserialize;
use std::path::{Path, PathBuf};
use config::{Config, ConfigError, Environment, File};

use crate::api::{DEFAULT_GENERATE_TIMEOUT_SECS, DEFAULT_TIMEOUT_SECS};

/// Sender name used when the person leaves it blank.
pub const DEFAULT_SENDER: &str = "A Nurtured Heart Friend";

/// Configuration for reaching the compliment backend
#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    /// Backend endpoint; the built-in default is used when absent
    #[serde(default)]
    pub base_url: Option<String>,
    /// Timeout in seconds for health, models and email requests
    pub timeout_secs: u64,
    /// Timeout in seconds for compliment generation
    pub generate_timeout_secs: u64,
}

/// Defaults for the email workflow
#[derive(Debug, Deserialize, Clone)]
pub struct EmailConfig {
    /// Sender name prefilled in the email form
    pub default_sender: String,
}

/// Configuration for backend capability checks
#[derive(Debug, Deserialize, Clone)]
pub struct HealthConfig {
    /// Whether the shell checks backend health when it starts
    pub check_on_start: bool,
    /// Seconds between refreshes in watch mode
    pub watch_interval_secs: u64,
}

/// Configuration for application logging
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Log level (debug, info, warn, error)
    pub level: String,
    /// Directory that receives the rolling log files
    pub directory: PathBuf,
}

/// Main settings struct that contains all configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub api: ApiConfig,
    pub email: EmailConfig,
    pub health: HealthConfig,
    pub logging: LoggingConfig,
}

impl Settings {
    /// Loads settings from `./config`. See [`Settings::from_dir`].
    pub fn new() -> Result<Self, ConfigError> {
        let config_dir = std::env::current_dir()
            .map_err(|e| ConfigError::Message(
                format!("Failed to get current directory: {}", e)
            ))?
            .join("config");
        Self::from_dir(&config_dir)
    }

    /// Creates a new Settings instance by layering, lowest to highest precedence:
    /// 1. Built-in defaults
    /// 2. `default.toml` in `config_dir`, if present
    /// 3. `local.toml` in `config_dir`, if present
    /// 4. Environment variables prefixed with NURTURE_ (`NURTURE_API__BASE_URL`)
    pub fn from_dir(config_dir: &Path) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .set_default("api.timeout_secs", DEFAULT_TIMEOUT_SECS)?
            .set_default("api.generate_timeout_secs", DEFAULT_GENERATE_TIMEOUT_SECS)?
            .set_default("email.default_sender", DEFAULT_SENDER)?
            .set_default("health.check_on_start", true)?
            .set_default("health.watch_interval_secs", 30u64)?
            .set_default("logging.level", "info")?
            .set_default("logging.directory", "logs")?
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            .add_source(File::from(config_dir.join("local.toml")).required(false))
            .add_source(
                Environment::with_prefix("NURTURE")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize::<Settings>()?;

        settings.validate()?;

        Ok(settings)
    }

    /// Overrides the configured endpoint (command line wins over files and env).
    pub fn with_api_url(mut self, url: Option<String>) -> Result<Self, ConfigError> {
        if let Some(url) = url {
            self.api.base_url = Some(url);
            self.validate()?;
        }
        Ok(self)
    }

    /// Validate configuration values
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(url) = self.api.base_url.as_deref().map(str::trim).filter(|u| !u.is_empty()) {
            let parsed = reqwest::Url::parse(url).map_err(|e| ConfigError::Message(
                format!("Invalid api.base_url '{}': {}", url, e)
            ))?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(ConfigError::Message(
                    format!("api.base_url must be http or https, got: {}", parsed.scheme())
                ));
            }
        }

        if self.api.timeout_secs == 0 || self.api.generate_timeout_secs == 0 {
            return Err(ConfigError::Message(
                "api timeouts must be greater than 0".to_string()
            ));
        }

        if self.health.watch_interval_secs == 0 {
            return Err(ConfigError::Message(
                "health.watch_interval_secs must be greater than 0".to_string()
            ));
        }

        if self.email.default_sender.trim().is_empty() {
            return Err(ConfigError::Message(
                "email.default_sender must not be blank".to_string()
            ));
        }

        // Validate logging level
        match self.logging.level.to_lowercase().as_str() {
            "error" | "warn" | "info" | "debug" | "trace" => Ok(()),
            _ => Err(ConfigError::Message(
                format!("Invalid logging level: {}. Must be one of: error, warn, info, debug, trace",
                    self.logging.level)
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("nurture-config-{}-{}", name, std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn defaults_apply_without_files() {
        let settings = Settings::from_dir(&scratch_dir("empty")).unwrap();
        assert_eq!(settings.api.base_url, None);
        assert_eq!(settings.api.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert_eq!(settings.api.generate_timeout_secs, DEFAULT_GENERATE_TIMEOUT_SECS);
        assert_eq!(settings.email.default_sender, DEFAULT_SENDER);
        assert_eq!(settings.logging.level, "info");
    }

    #[test]
    fn local_file_overrides_default_file() {
        let dir = scratch_dir("layered");
        fs::write(
            dir.join("default.toml"),
            "[api]\nbase_url = \"http://backend:8000\"\ntimeout_secs = 5\n",
        )
        .unwrap();
        fs::write(dir.join("local.toml"), "[api]\ntimeout_secs = 9\n").unwrap();

        let settings = Settings::from_dir(&dir).unwrap();
        assert_eq!(settings.api.base_url.as_deref(), Some("http://backend:8000"));
        assert_eq!(settings.api.timeout_secs, 9);
    }

    #[test]
    fn rejects_bad_values() {
        let dir = scratch_dir("invalid-level");
        fs::write(dir.join("default.toml"), "[logging]\nlevel = \"loud\"\n").unwrap();
        assert!(Settings::from_dir(&dir).is_err());

        let dir = scratch_dir("invalid-url");
        fs::write(dir.join("default.toml"), "[api]\nbase_url = \"not a url\"\n").unwrap();
        assert!(Settings::from_dir(&dir).is_err());

        let dir = scratch_dir("zero-timeout");
        fs::write(dir.join("default.toml"), "[api]\ngenerate_timeout_secs = 0\n").unwrap();
        assert!(Settings::from_dir(&dir).is_err());
    }

    #[test]
    fn command_line_url_wins() {
        let settings = Settings::from_dir(&scratch_dir("override"))
            .unwrap()
            .with_api_url(Some("https://compliments.example.com".into()))
            .unwrap();
        assert_eq!(settings.api.base_url.as_deref(), Some("https://compliments.example.com"));

        let err = Settings::from_dir(&scratch_dir("override-bad"))
            .unwrap()
            .with_api_url(Some("ftp://example.com".into()));
        assert!(err.is_err());
    }
}
