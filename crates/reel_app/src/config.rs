use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use log::LevelFilter;
use reel_engine::FetchSettings;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::logging::LogDestination;

pub const DEFAULT_CONFIG_PATH: &str = "reel.ron";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },
    #[error("invalid playlist entry {entry:?}: {source}")]
    InvalidUrl {
        entry: String,
        #[source]
        source: url::ParseError,
    },
    #[error("unknown log level {0:?}")]
    InvalidLogLevel(String),
}

/// Driver settings read from a RON file. Every field is optional in the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub log_destination: LogDestination,
    /// One of `off`, `error`, `warn`, `info`, `debug`, `trace`.
    pub log_level: String,
    pub tick_interval_ms: u64,
    /// How long the scripted stopwatch session runs before it is stopped.
    pub stopwatch_run_ms: u64,
    pub lap_count: u32,
    /// Length the simulated player reports for every item.
    pub media_duration_secs: f64,
    pub playlist: Vec<String>,
    /// Newline separated list merged into `playlist` at startup.
    pub playlist_url: Option<String>,
    pub fetch: FetchConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_destination: LogDestination::Terminal,
            log_level: "info".to_string(),
            tick_interval_ms: 10,
            stopwatch_run_ms: 1_500,
            lap_count: 3,
            media_duration_secs: 120.0,
            playlist: vec![
                "https://devstreaming-cdn.apple.com/videos/streaming/examples/img_bipbop_adv_example_ts/master.m3u8".to_string(),
                "https://devstreaming-cdn.apple.com/videos/streaming/examples/bipbop_16x9/bipbop_16x9_variant.m3u8".to_string(),
            ],
            playlist_url: None,
            fetch: FetchConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub connect_timeout_ms: u64,
    pub request_timeout_ms: u64,
    pub redirect_limit: usize,
    pub max_bytes: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        let settings = FetchSettings::default();
        Self {
            connect_timeout_ms: settings.connect_timeout.as_millis() as u64,
            request_timeout_ms: settings.request_timeout.as_millis() as u64,
            redirect_limit: settings.redirect_limit,
            max_bytes: settings.max_bytes,
        }
    }
}

impl AppConfig {
    pub fn level_filter(&self) -> Result<LevelFilter, ConfigError> {
        LevelFilter::from_str(&self.log_level)
            .map_err(|_| ConfigError::InvalidLogLevel(self.log_level.clone()))
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn stopwatch_run(&self) -> Duration {
        Duration::from_millis(self.stopwatch_run_ms)
    }

    pub fn playlist_urls(&self) -> Result<Vec<Url>, ConfigError> {
        self.playlist
            .iter()
            .map(|entry| {
                Url::parse(entry).map_err(|source| ConfigError::InvalidUrl {
                    entry: entry.clone(),
                    source,
                })
            })
            .collect()
    }

    pub fn fetch_settings(&self) -> FetchSettings {
        FetchSettings {
            connect_timeout: Duration::from_millis(self.fetch.connect_timeout_ms),
            request_timeout: Duration::from_millis(self.fetch.request_timeout_ms),
            redirect_limit: self.fetch.redirect_limit,
            max_bytes: self.fetch.max_bytes,
            ..FetchSettings::default()
        }
    }
}

/// Reads the configuration at `path`; `Ok(None)` when there is no such file.
pub fn load(path: &Path) -> Result<Option<AppConfig>, ConfigError> {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let config = ron::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Some(config))
}
