use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::constants;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub server: ServerConfig,

    pub providers: ProvidersConfig,

    pub resolver: ResolverConfig,

    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub database_path: String,

    pub log_level: String,

    /// 0 lets tokio pick the default for the machine.
    pub worker_threads: usize,

    pub max_db_connections: u32,

    pub min_db_connections: u32,

    pub suppress_connection_errors: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            database_path: "sqlite:vidarr.db".to_string(),
            log_level: "info".to_string(),
            worker_threads: 0,
            max_db_connections: 5,
            min_db_connections: 1,
            suppress_connection_errors: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub enabled: bool,

    pub port: u16,

    pub cors_permissive: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            port: 7474,
            cors_permissive: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvidersConfig {
    /// Shared HTTP client timeout for provider fetches.
    pub request_timeout_seconds: u64,

    pub user_agent: String,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            request_timeout_seconds: 30,
            user_agent: "Vidarr/1.0".to_string(),
        }
    }
}

/// Policy knobs for the resolution engine. The staleness window and cache
/// TTL are deliberate policy constants with no deeper derivation; they stay
/// configurable rather than baked in.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    pub staleness_window_days: i64,

    pub cache_ttl_minutes: i64,

    pub retry_base_delay_ms: u64,

    pub probe_timeout_seconds: u64,

    pub purge_after_days: i64,

    pub cache_sweep_interval_seconds: u64,

    pub staleness_sweep_interval_seconds: u64,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            staleness_window_days: constants::resolver::STALENESS_WINDOW_DAYS,
            cache_ttl_minutes: constants::cache::RESOLUTION_TTL_MINUTES,
            retry_base_delay_ms: constants::retry::BASE_DELAY.as_millis() as u64,
            probe_timeout_seconds: constants::probe::TIMEOUT.as_secs(),
            purge_after_days: constants::resolver::PURGE_AFTER_DAYS,
            cache_sweep_interval_seconds: constants::intervals::CACHE_SWEEP.as_secs(),
            staleness_sweep_interval_seconds: constants::intervals::STALENESS_SWEEP.as_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub metrics_enabled: bool,

    pub loki_enabled: bool,

    pub loki_url: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: false,
            loki_enabled: false,
            loki_url: "http://localhost:3100".to_string(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let paths = Self::config_paths();

        for path in &paths {
            if path.exists() {
                info!("Loading config from: {}", path.display());
                return Self::load_from_path(path);
            }
        }

        info!("No config file found, using defaults");
        Ok(Self::default())
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Config saved to: {}", path.display());
        Ok(())
    }

    fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("config.toml")];

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("vidarr").join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".vidarr").join("config.toml"));
        }

        paths
    }

    pub fn create_default_if_missing() -> Result<bool> {
        let path = PathBuf::from("config.toml");
        if path.exists() {
            Ok(false)
        } else {
            let config = Self::default();
            config.save_to_path(&path)?;
            info!("Created default config file: {}", path.display());
            Ok(true)
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.general.database_path.is_empty() {
            anyhow::bail!("Database path cannot be empty");
        }

        if self.resolver.staleness_window_days < 1 {
            anyhow::bail!("Staleness window must be at least one day");
        }

        if self.resolver.cache_ttl_minutes < 1 {
            anyhow::bail!("Cache TTL must be at least one minute");
        }

        if self.observability.loki_enabled && self.observability.loki_url.is_empty() {
            anyhow::bail!("Loki URL cannot be empty when Loki logging is enabled");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.resolver.staleness_window_days, 7);
        assert_eq!(config.resolver.cache_ttl_minutes, 5);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            [resolver]
            staleness_window_days = 14
            "#,
        )
        .unwrap();

        assert_eq!(config.resolver.staleness_window_days, 14);
        assert_eq!(config.resolver.cache_ttl_minutes, 5);
        assert_eq!(config.server.port, 7474);
    }

    #[test]
    fn test_validate_rejects_bad_policy() {
        let mut config = Config::default();
        config.resolver.cache_ttl_minutes = 0;
        assert!(config.validate().is_err());
    }
}
