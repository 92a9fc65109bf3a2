use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use url::Url;

/// Default observation feed of the Estonian Environment Agency.
pub const DEFAULT_FEED_URL: &str = "https://www.ilmateenistus.ee/ilma_andmed/xml/observations.php";

/// Default ingestion cadence: 15 minutes past every hour.
///
/// Uses the seconds-leading cron format of the `cron` crate:
/// `sec min hour day-of-month month day-of-week`.
pub const DEFAULT_CADENCE: &str = "0 15 * * * *";

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Add an error
    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Add a warning
    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Get a user-friendly message summarizing all errors
    pub fn error_summary(&self) -> String {
        if self.errors.is_empty() {
            return String::new();
        }
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Weather ingestion settings
    #[serde(default)]
    pub ingest: IngestConfig,

    /// Observation storage settings
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    /// URL of the observation XML feed
    pub feed_url: String,

    /// Cron-style cadence for fetch cycles (seconds-leading format)
    pub cadence: String,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            feed_url: DEFAULT_FEED_URL.to_string(),
            cadence: DEFAULT_CADENCE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Path to the SQLite observation database
    pub database_path: String,
}

fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("kuller")
        .join("observations.db")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path().to_string_lossy().into_owned(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ingest: IngestConfig::default(),
            storage: StorageConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from file, creating default if it doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            let config = Self::default();
            config.save()?;
            return Ok(config);
        }

        let contents =
            std::fs::read_to_string(&config_path).context("Failed to read config file")?;

        let config: Config = toml::from_str(&contents).context("Failed to parse config file")?;

        Ok(config)
    }

    /// Load configuration and validate it
    ///
    /// Returns the config along with any validation warnings.
    /// Returns an error if validation fails with critical errors.
    pub fn load_validated() -> Result<(Self, ValidationResult)> {
        let config = Self::load()?;
        let validation = config.validate();

        if !validation.is_valid() {
            anyhow::bail!(
                "Configuration validation failed: {}",
                validation.error_summary()
            );
        }

        if !validation.warnings.is_empty() {
            for warning in &validation.warnings {
                tracing::warn!("Config warning: {}", warning);
            }
        }

        Ok((config, validation))
    }

    /// Validate the configuration
    ///
    /// Returns a ValidationResult containing any errors or warnings.
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        self.validate_feed_url(&mut result);
        self.validate_cadence(&mut result);

        if self.storage.database_path.trim().is_empty() {
            result.add_error("storage.database_path", "Database path cannot be empty");
        } else {
            let path = PathBuf::from(&self.storage.database_path);
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() && !parent.exists() {
                    result.add_warning(
                        "storage.database_path",
                        format!(
                            "Parent directory does not exist and will be created: {}",
                            parent.display()
                        ),
                    );
                }
            }
        }

        result
    }

    fn validate_feed_url(&self, result: &mut ValidationResult) {
        match Url::parse(&self.ingest.feed_url) {
            Ok(url) => {
                if url.scheme() != "http" && url.scheme() != "https" {
                    result.add_error(
                        "ingest.feed_url",
                        format!("URL must use http or https scheme, got: {}", url.scheme()),
                    );
                }

                if url.host().is_none() {
                    result.add_error("ingest.feed_url", "URL must have a host");
                }
            }
            Err(e) => {
                result.add_error("ingest.feed_url", format!("Invalid URL: {}", e));
            }
        }
    }

    fn validate_cadence(&self, result: &mut ValidationResult) {
        match cron::Schedule::from_str(&self.ingest.cadence) {
            Ok(schedule) => {
                // A cadence that never fires is almost certainly a mistake
                if schedule.upcoming(chrono::Utc).next().is_none() {
                    result.add_warning(
                        "ingest.cadence",
                        "Cadence expression has no upcoming occurrences",
                    );
                }
            }
            Err(e) => {
                result.add_error(
                    "ingest.cadence",
                    format!("Invalid cron expression: {}", e),
                );
            }
        }
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        // Ensure config directory exists
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(&config_path, contents).context("Failed to write config file")?;

        Ok(())
    }

    /// Get the path to the configuration file
    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("kuller");

        Ok(config_dir.join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_default_config() {
        let config = Config::default();
        let result = config.validate();
        assert!(
            result.is_valid(),
            "Default config should be valid: {:?}",
            result.errors
        );
    }

    #[test]
    fn test_default_feed_url_and_cadence() {
        let config = Config::default();
        assert_eq!(config.ingest.feed_url, DEFAULT_FEED_URL);
        assert_eq!(config.ingest.cadence, DEFAULT_CADENCE);
    }

    #[test]
    fn test_invalid_feed_url() {
        let mut config = Config::default();
        config.ingest.feed_url = "not-a-url".to_string();
        let result = config.validate();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.field == "ingest.feed_url"));
    }

    #[test]
    fn test_invalid_feed_url_scheme() {
        let mut config = Config::default();
        config.ingest.feed_url = "ftp://example.com/observations".to_string();
        let result = config.validate();
        assert!(!result.is_valid());
        assert!(result
            .errors
            .iter()
            .any(|e| e.message.contains("http or https")));
    }

    #[test]
    fn test_invalid_cadence() {
        let mut config = Config::default();
        config.ingest.cadence = "every full moon".to_string();
        let result = config.validate();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.field == "ingest.cadence"));
    }

    #[test]
    fn test_five_field_cadence_is_rejected() {
        // The cron crate expects a seconds-leading expression
        let mut config = Config::default();
        config.ingest.cadence = "15 * * * *".to_string();
        let result = config.validate();
        assert!(!result.is_valid());
    }

    #[test]
    fn test_empty_database_path() {
        let mut config = Config::default();
        config.storage.database_path = "  ".to_string();
        let result = config.validate();
        assert!(!result.is_valid());
        assert!(result
            .errors
            .iter()
            .any(|e| e.field == "storage.database_path"));
    }

    #[test]
    fn test_validation_result_error_summary() {
        let mut result = ValidationResult::default();
        result.add_error("field1", "error1");
        result.add_error("field2", "error2");
        let summary = result.error_summary();
        assert!(summary.contains("field1"));
        assert!(summary.contains("field2"));
    }

    #[test]
    fn test_config_roundtrip_toml() {
        let config = Config::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.ingest.feed_url, config.ingest.feed_url);
        assert_eq!(parsed.ingest.cadence, config.ingest.cadence);
    }
}
