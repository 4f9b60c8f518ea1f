use std::path::{Path, PathBuf};

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::LaptraceError;

const CONFIG_DIR_NAME: &str = "laptrace";
const CONFIG_FILE_NAME: &str = "config.json";

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000/races";
pub const DEFAULT_YEAR: i32 = 2024;
const DEFAULT_REQUEST_TIMEOUT_S: u64 = 120;

/// Whether the HTTP client keeps and sends cookies
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum CredentialsMode {
    Include,
    #[default]
    Omit,
}

/// Unit the telemetry endpoint reports throttle in. Samples are normalized to
/// percent when they are decoded.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ThrottleUnit {
    #[default]
    Percent,
    Fraction,
}

impl ThrottleUnit {
    pub fn to_percent(&self, value: f64) -> f64 {
        match self {
            Self::Percent => value,
            Self::Fraction => value * 100.,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct WindowSize {
    pub width: f32,
    pub height: f32,
}

impl Default for WindowSize {
    fn default() -> Self {
        Self {
            width: 1400.,
            height: 1000.,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub api_base_url: String,
    pub credentials: CredentialsMode,
    /// Sends `ngrok-skip-browser-warning` so tunnelled APIs answer with JSON
    pub skip_tunnel_warning: bool,
    pub throttle_unit: ThrottleUnit,
    pub request_timeout_s: u64,
    pub default_year: i32,
    pub window_size: WindowSize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            credentials: CredentialsMode::default(),
            skip_tunnel_warning: true,
            throttle_unit: ThrottleUnit::default(),
            request_timeout_s: DEFAULT_REQUEST_TIMEOUT_S,
            default_year: DEFAULT_YEAR,
            window_size: WindowSize::default(),
        }
    }
}

impl AppConfig {
    pub fn default_path() -> Result<PathBuf, LaptraceError> {
        Ok(dirs::config_dir()
            .ok_or(LaptraceError::NoConfigDir)?
            .join(CONFIG_DIR_NAME)
            .join(CONFIG_FILE_NAME))
    }

    /// Loads the config from the user's config directory. Returns `Ok(None)`
    /// when no config file has been saved yet.
    pub fn from_local_file() -> Result<Option<Self>, LaptraceError> {
        Self::from_path(&Self::default_path()?)
    }

    pub fn from_path(config_path: &Path) -> Result<Option<Self>, LaptraceError> {
        if !config_path.exists() {
            debug!("No config file at {:?}", config_path);
            return Ok(None);
        }
        let file = std::fs::File::open(config_path)
            .map_err(|e| LaptraceError::ConfigIOError { source: e })?;
        let config = serde_json::from_reader(file)
            .map_err(|e| LaptraceError::ConfigParseError { source: e })?;
        info!("Loaded config from {:?}", config_path);
        Ok(Some(config))
    }

    /// The config to connect with when the base URL is overridden on the
    /// command line. `self` is left as loaded so saving it keeps the file's URL.
    pub fn with_api_url(&self, api_url: Option<&str>) -> AppConfig {
        match api_url {
            Some(api_base_url) => AppConfig {
                api_base_url: api_base_url.to_string(),
                ..self.clone()
            },
            None => self.clone(),
        }
    }

    pub fn save(&self) -> Result<(), LaptraceError> {
        self.save_to(&Self::default_path()?)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<(), LaptraceError> {
        if let Some(parent) = config_path.parent()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent)
                .map_err(|e| LaptraceError::ConfigIOError { source: e })?;
        }

        let file = std::fs::File::create(config_path)
            .map_err(|e| LaptraceError::ConfigIOError { source: e })?;
        serde_json::to_writer_pretty(file, self)
            .map_err(|e| LaptraceError::ConfigSerializeError { source: e })
    }
}
