//! Dashboard configuration, read from a RON file.

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use engine_logging::LogDestination;
use log::LevelFilter;
use schedule_core::{Feed, FeedKind};
use schedule_engine::SourceSettings;
use serde::Deserialize;

const DEFAULT_CONFIG_FILENAME: &str = "dashboard.ron";
const CONFIG_ENV_VAR: &str = "SCHEDULE_DASHBOARD_CONFIG";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: ron::error::SpannedError,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WindowConfig {
    pub container_id: String,
    pub endpoint: String,
    /// Overrides the formatting rule implied by the endpoint.
    #[serde(default)]
    pub kind: Option<FeedKind>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub api_base: String,
    /// Zero disables periodic refresh.
    pub refresh_period_ms: u64,
    pub connect_timeout_ms: u64,
    pub request_timeout_ms: u64,
    pub max_body_bytes: u64,
    pub visible_rows: u32,
    pub log_destination: LogDestination,
    pub log_level: String,
    pub log_file: PathBuf,
    pub windows: Vec<WindowConfig>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        let source = SourceSettings::default();
        Self {
            api_base: source.base_url,
            refresh_period_ms: 10_000,
            connect_timeout_ms: source.connect_timeout.as_millis() as u64,
            request_timeout_ms: source.request_timeout.as_millis() as u64,
            max_body_bytes: source.max_bytes,
            visible_rows: 12,
            log_destination: LogDestination::File,
            log_level: "info".to_string(),
            log_file: PathBuf::from("./dashboard.log"),
            windows: Feed::well_known()
                .into_iter()
                .map(|feed| WindowConfig {
                    container_id: feed.container_id,
                    endpoint: feed.endpoint,
                    kind: None,
                })
                .collect(),
        }
    }
}

impl DashboardConfig {
    pub fn refresh_period(&self) -> Duration {
        Duration::from_millis(self.refresh_period_ms)
    }

    /// Unknown level names fall back to `Info`.
    pub fn log_level(&self) -> LevelFilter {
        LevelFilter::from_str(&self.log_level).unwrap_or(LevelFilter::Info)
    }

    pub fn source_settings(&self) -> SourceSettings {
        SourceSettings {
            base_url: self.api_base.clone(),
            connect_timeout: Duration::from_millis(self.connect_timeout_ms),
            request_timeout: Duration::from_millis(self.request_timeout_ms),
            max_bytes: self.max_body_bytes,
        }
    }

    pub fn feeds(&self) -> Vec<Feed> {
        self.windows
            .iter()
            .map(|window| {
                let feed = Feed::new(&window.container_id, &window.endpoint);
                match window.kind {
                    Some(kind) => feed.with_kind(kind),
                    None => feed,
                }
            })
            .collect()
    }
}

/// Config file location: explicit argument, then the environment, then
/// `./dashboard.ron`.
pub fn resolve_path(arg: Option<String>) -> PathBuf {
    arg.or_else(|| std::env::var(CONFIG_ENV_VAR).ok())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILENAME))
}

/// Loads the config at `path`. A missing file yields the defaults.
pub fn load(path: &Path) -> Result<DashboardConfig, ConfigError> {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Ok(DashboardConfig::default());
        }
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    ron::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
