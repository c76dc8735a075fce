//! Application configuration
//!
//! Loaded from a TOML file (auto-created with defaults on first run) with
//! CLI overrides applied in `main`. Durations are humantime-formatted
//! strings ("30s", "1m") in the file and parsed on access.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    #[serde(default)]
    pub web: WebConfig,
    #[serde(default)]
    pub ingest: IngestConfig,
    #[serde(default)]
    pub reconciliation: ReconciliationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Ingest-server collaborator settings, used by the reconciliation probe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Base URL of the ingest server's session API
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// Directory where the ingest server drops finished recordings
    #[serde(default = "default_recordings_dir")]
    pub recordings_dir: PathBuf,
    /// Upper bound on a single liveness probe
    #[serde(default = "default_probe_timeout")]
    pub probe_timeout: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconciliationConfig {
    /// Whether the background lost-stream sweeper runs at all
    #[serde(default = "default_sweep_enabled")]
    pub enabled: bool,
    /// How often the sweeper reconciles open sessions
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8008
}
fn default_api_base() -> String {
    "http://127.0.0.1:8081".to_string()
}
fn default_recordings_dir() -> PathBuf {
    PathBuf::from("./recordings")
}
fn default_probe_timeout() -> String {
    "5s".to_string()
}
fn default_sweep_enabled() -> bool {
    true
}
fn default_sweep_interval() -> String {
    "1m".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: DatabaseConfig::default(),
            web: WebConfig::default(),
            ingest: IngestConfig::default(),
            reconciliation: ReconciliationConfig::default(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://./streamcast.db".to_string(),
            max_connections: Some(10),
        }
    }
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            recordings_dir: default_recordings_dir(),
            probe_timeout: default_probe_timeout(),
        }
    }
}

impl Default for ReconciliationConfig {
    fn default() -> Self {
        Self {
            enabled: default_sweep_enabled(),
            sweep_interval: default_sweep_interval(),
        }
    }
}

impl IngestConfig {
    pub fn probe_timeout_duration(&self) -> Result<Duration, humantime::DurationError> {
        humantime::parse_duration(&self.probe_timeout)
    }
}

impl ReconciliationConfig {
    pub fn sweep_interval_duration(&self) -> Result<Duration, humantime::DurationError> {
        humantime::parse_duration(&self.sweep_interval)
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_file =
            std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".to_string());
        Self::load_from_file(&config_file)
    }

    pub fn load_from_file(config_file: &str) -> Result<Self> {
        if std::path::Path::new(&config_file).exists() {
            let contents = std::fs::read_to_string(config_file)?;
            Ok(toml::from_str(&contents)?)
        } else {
            let default_config = Self::default();
            let contents = toml::to_string_pretty(&default_config)?;
            std::fs::write(config_file, contents)?;
            info!("Created default config file: {}", config_file);
            Ok(default_config)
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.database.url.is_empty() {
            return Err("database.url must not be empty".to_string());
        }
        self.ingest
            .probe_timeout_duration()
            .map_err(|e| format!("ingest.probe_timeout: {e}"))?;
        self.reconciliation
            .sweep_interval_duration()
            .map_err(|e| format!("reconciliation.sweep_interval: {e}"))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(
            config.reconciliation.sweep_interval_duration().unwrap(),
            Duration::from_secs(60)
        );
        assert_eq!(
            config.ingest.probe_timeout_duration().unwrap(),
            Duration::from_secs(5)
        );
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let config: Config = toml::from_str(
            r#"
            [database]
            url = "sqlite::memory:"
            max_connections = 1

            [reconciliation]
            sweep_interval = "30s"
            "#,
        )
        .unwrap();
        assert_eq!(config.web.port, 8008);
        assert!(config.reconciliation.enabled);
        assert_eq!(
            config.reconciliation.sweep_interval_duration().unwrap(),
            Duration::from_secs(30)
        );
    }

    #[test]
    fn bad_duration_fails_validation() {
        let mut config = Config::default();
        config.reconciliation.sweep_interval = "soon".to_string();
        assert!(config.validate().is_err());
    }
}
