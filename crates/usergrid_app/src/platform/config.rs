//! RON configuration for the demo session.
//!
//! Every field has a default, so a partial file (or no file) is valid.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use usergrid_core::{FailureKind, GridOptionsPatch};
use usergrid_engine::FetchSettings;

use super::logging::LogDestination;

pub const CONFIG_FILENAME: &str = "usergrid.ron";
const DEFAULT_DATASET: &str = "data/users.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceConfig {
    Http { url: String },
    File { path: PathBuf },
}

impl Default for SourceConfig {
    fn default() -> Self {
        SourceConfig::File {
            path: PathBuf::from(DEFAULT_DATASET),
        }
    }
}

/// Fail the first `times` fetches with `kind`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub kind: FailureKind,
    pub times: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
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

impl FetchConfig {
    pub fn to_settings(&self) -> FetchSettings {
        FetchSettings {
            connect_timeout: Duration::from_millis(self.connect_timeout_ms),
            request_timeout: Duration::from_millis(self.request_timeout_ms),
            redirect_limit: self.redirect_limit,
            max_bytes: self.max_bytes,
            ..FetchSettings::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub source: SourceConfig,
    pub simulate: Option<SimulationConfig>,
    pub latency_ms: u64,
    pub max_retries: u32,
    pub fetch: FetchConfig,
    pub grid: GridOptionsPatch,
    pub log: LogDestination,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            source: SourceConfig::default(),
            simulate: None,
            latency_ms: 300,
            max_retries: 3,
            fetch: FetchConfig::default(),
            grid: GridOptionsPatch::default(),
            log: LogDestination::default(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("could not parse config {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },
}

/// Reads the config at `path`. A missing file is not an error.
pub fn read_config(path: &Path) -> Result<Option<AppConfig>, ConfigError> {
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

    ron::from_str(&content)
        .map(Some)
        .map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
}
