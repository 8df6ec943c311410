//! Dashboard configuration.
//!
//! Settings are layered with figment:
//! 1. built-in defaults
//! 2. a TOML file (explicit path, or `<config dir>/keepix-dashboard/config.toml`)
//! 3. environment variables prefixed with `KEEPIX_DASHBOARD_`, using `__` to reach
//!    nested keys (e.g. `KEEPIX_DASHBOARD_API__BASE_URL=http://10.0.0.4:2000`)

use crate::error::AppError;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const ENV_PREFIX: &str = "KEEPIX_DASHBOARD_";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DashboardConfig {
    pub api: ApiConfig,
    pub polling: PollIntervals,
    pub log: LogConfig,
}

/// Where the plugin backend lives and how to talk to it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Keepix API root, e.g. `http://192.168.1.20:2000`
    pub base_url: String,
    /// Plugin identifier; requests go to `{base_url}/plugins/{plugin_name}`
    pub plugin_name: String,
    pub request_timeout_secs: u64,
    /// Body key naming the execution-layer client in resync requests
    pub execution_client: String,
    /// Body key naming the consensus-layer client in resync requests
    pub consensus_client: String,
    /// Use the `GET /resync-eth1` and `/resync-eth2` routes of older plugin builds
    pub legacy_resync_paths: bool,
    /// Shape of the plugin's `/pools-fetch` reply
    pub pool_format: PoolFormat,
}

/// Minipool plugins return a text report, delegation plugins a JSON pool list.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum PoolFormat {
    #[default]
    MinipoolReport,
    StakingPools,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:2000".to_string(),
            plugin_name: "keepix-polygon-plugin".to_string(),
            request_timeout_secs: 30,
            execution_client: "bor".to_string(),
            consensus_client: "heimdall".to_string(),
            legacy_resync_paths: false,
            pool_format: PoolFormat::default(),
        }
    }
}

impl ApiConfig {
    /// Base URL the way the web dashboard derives it from the page location:
    /// plain http talks to port 2000, anything else to the TLS port 9000.
    pub fn for_page(scheme: &str, host: &str) -> Self {
        let scheme = scheme.trim_end_matches(':');
        let port = if scheme == "http" { 2000 } else { 9000 };
        Self {
            base_url: format!("{scheme}://{host}:{port}"),
            ..Self::default()
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Poll cadence per data source, in milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PollIntervals {
    pub status_ms: u64,
    pub wallet_ms: u64,
    pub sync_progress_ms: u64,
    pub minipools_ms: u64,
    pub staking_pools_ms: u64,
    pub node_info_ms: u64,
    /// How often the scheduler wakes up to look for due sources
    pub tick_ms: u64,
}

impl Default for PollIntervals {
    fn default() -> Self {
        Self {
            status_ms: 2_000,
            wallet_ms: 30_000,
            sync_progress_ms: 5_000,
            minipools_ms: 10_000,
            staking_pools_ms: 60_000,
            node_info_ms: 10_000,
            tick_ms: 250,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Default filter directive; `RUST_LOG` takes precedence when set
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl DashboardConfig {
    /// Load from the default config file location (if present) and the environment.
    pub fn load() -> Result<Self, AppError> {
        Self::load_from(default_config_path())
    }

    pub fn load_from<P: AsRef<Path>>(path: Option<P>) -> Result<Self, AppError> {
        let mut figment = Figment::from(Serialized::defaults(DashboardConfig::default()));
        if let Some(path) = path {
            figment = figment.merge(Toml::file(path.as_ref()));
        }
        let config: DashboardConfig = figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        url::Url::parse(&self.api.base_url)?;

        if self.api.plugin_name.trim().is_empty() {
            return Err(AppError::InvalidInput("api.plugin_name is empty".into()));
        }
        if self.api.request_timeout_secs == 0 {
            return Err(AppError::InvalidInput(
                "api.request_timeout_secs must be > 0".into(),
            ));
        }

        let p = &self.polling;
        let intervals = [
            ("status_ms", p.status_ms),
            ("wallet_ms", p.wallet_ms),
            ("sync_progress_ms", p.sync_progress_ms),
            ("minipools_ms", p.minipools_ms),
            ("staking_pools_ms", p.staking_pools_ms),
            ("node_info_ms", p.node_info_ms),
            ("tick_ms", p.tick_ms),
        ];
        for (name, value) in intervals {
            if value == 0 {
                return Err(AppError::InvalidInput(format!(
                    "polling.{name} must be > 0"
                )));
            }
        }

        Ok(())
    }
}

/// `<config dir>/keepix-dashboard/config.toml`, if a config dir exists on this platform.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("keepix-dashboard").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        let config = DashboardConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.api.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.polling.status_ms, 2_000);
    }

    #[test]
    fn toml_file_overrides_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[api]
base_url = "http://10.0.0.7:2000"
plugin_name = "keepix-rocketpool-plugin"
pool_format = "staking_pools"

[polling]
status_ms = 1500
"#
        )
        .unwrap();

        let config = DashboardConfig::load_from(Some(file.path())).unwrap();
        assert_eq!(config.api.base_url, "http://10.0.0.7:2000");
        assert_eq!(config.api.plugin_name, "keepix-rocketpool-plugin");
        assert_eq!(config.api.pool_format, PoolFormat::StakingPools);
        assert_eq!(config.polling.status_ms, 1500);
        // untouched keys keep their defaults
        assert_eq!(config.polling.sync_progress_ms, 5_000);
        assert_eq!(config.api.consensus_client, "heimdall");
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = DashboardConfig::load_from(Some(dir.path().join("absent.toml"))).unwrap();
        assert_eq!(config.api.plugin_name, "keepix-polygon-plugin");
    }

    #[test]
    fn zero_interval_is_rejected() {
        let mut config = DashboardConfig::default();
        config.polling.sync_progress_ms = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("sync_progress_ms"));
    }

    #[test]
    fn bad_base_url_is_rejected() {
        let mut config = DashboardConfig::default();
        config.api.base_url = "not a url".into();
        assert!(matches!(config.validate(), Err(AppError::Url(_))));
    }

    #[test]
    fn page_derived_base_url() {
        assert_eq!(
            ApiConfig::for_page("http:", "192.168.1.5").base_url,
            "http://192.168.1.5:2000"
        );
        assert_eq!(
            ApiConfig::for_page("https", "keepix.local").base_url,
            "https://keepix.local:9000"
        );
    }
}
