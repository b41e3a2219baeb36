//! Dashboard configuration.
//!
//! Every field has a default, so running without a config file shows the
//! three TU Braunschweig canteens and the Braunschweig forecast.
//!
//! ```yaml
//! locations:
//!   - label: Mensa 1 TU Braunschweig
//!     id: "101"
//! weather:
//!   latitude: 52.2659
//!   longitude: 10.5267
//!   hourly: [temperature_2m, precipitation]
//! transport:
//!   ttl_secs: 600
//! ```

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Directory under the home directory holding config, cache and logs.
const APP_DIR: &str = ".mensaboard";

pub const DEFAULT_MENU_BASE_URL: &str = "https://sls.api.stw-on.de/v1";
/// Largest accepted retry backoff factor, in seconds.
pub const MAX_BACKOFF_FACTOR: f64 = 60.0;

pub const DEFAULT_FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";

/// Root configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Canteen locations, shown in this order
    pub locations: Vec<Location>,
    /// Base URL of the menu API (without trailing slash)
    pub menu_base_url: String,
    pub weather: WeatherConfig,
    pub transport: TransportConfig,
}

/// A canteen location: display label plus the opaque API identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub label: String,
    pub id: String,
}

impl Location {
    pub fn new(label: &str, id: &str) -> Self {
        Self {
            label: label.to_string(),
            id: id.to_string(),
        }
    }
}

/// Forecast point and variables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    pub base_url: String,
    pub place: String,
    pub latitude: f64,
    pub longitude: f64,
    pub timezone: String,
    /// Hourly variables, in request order
    pub hourly: Vec<String>,
    /// Daily variables, in request order
    pub daily: Vec<String>,
    /// Hourly variables drawn on their own chart instead of the shared one
    pub hourly_focus: Vec<String>,
}

/// HTTP cache and retry settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    /// SQLite response cache; `None` uses `~/.mensaboard/cache.db`
    pub cache_path: Option<PathBuf>,
    pub ttl_secs: u64,
    pub retries: u32,
    pub backoff_factor: f64,
    pub timeout_secs: u64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            locations: vec![
                Location::new("Mensa 1 TU Braunschweig", "101"),
                Location::new("Mensa 2 TU Braunschweig", "105"),
                Location::new("Mensa 360 Grad", "111"),
            ],
            menu_base_url: DEFAULT_MENU_BASE_URL.to_string(),
            weather: WeatherConfig::default(),
            transport: TransportConfig::default(),
        }
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_FORECAST_URL.to_string(),
            place: "Braunschweig".to_string(),
            latitude: 52.2659,
            longitude: 10.5267,
            timezone: "Europe/Berlin".to_string(),
            hourly: [
                "temperature_2m",
                "precipitation_probability",
                "precipitation",
                "rain",
                "snowfall",
                "uv_index",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            daily: vec![
                "temperature_2m_max".to_string(),
                "temperature_2m_min".to_string(),
            ],
            hourly_focus: vec!["temperature_2m".to_string(), "uv_index".to_string()],
        }
    }
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            cache_path: None,
            ttl_secs: 3600,
            retries: 5,
            backoff_factor: 0.2,
            timeout_secs: 15,
        }
    }
}

impl DashboardConfig {
    /// Load configuration from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::IoError(format!("{}: {}", path.as_ref().display(), e)))?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_yaml::from_str(yaml).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load an explicit config file, or the default one if it exists.
    ///
    /// A missing explicit path is an error; a missing default file is not.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        let default_path = app_dir().join("config.yaml");
        if default_path.exists() {
            log::debug!("Loading config from {}", default_path.display());
            Self::from_file(&default_path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.locations.is_empty() {
            return Err(ConfigError::Invalid("no locations configured".into()));
        }
        if let Some(loc) = self.locations.iter().find(|l| l.id.trim().is_empty()) {
            return Err(ConfigError::Invalid(format!(
                "location '{}' has an empty id",
                loc.label
            )));
        }

        let w = &self.weather;
        if !(-90.0..=90.0).contains(&w.latitude) {
            return Err(ConfigError::Invalid(format!(
                "latitude {} out of range",
                w.latitude
            )));
        }
        if !(-180.0..=180.0).contains(&w.longitude) {
            return Err(ConfigError::Invalid(format!(
                "longitude {} out of range",
                w.longitude
            )));
        }
        check_variables("hourly", &w.hourly)?;
        check_variables("daily", &w.daily)?;

        let factor = self.transport.backoff_factor;
        if !factor.is_finite() || !(0.0..=MAX_BACKOFF_FACTOR).contains(&factor) {
            return Err(ConfigError::Invalid(format!(
                "backoff_factor {} must be between 0 and {}",
                factor, MAX_BACKOFF_FACTOR
            )));
        }
        Ok(())
    }

    /// Resolved path of the response cache database.
    pub fn cache_path(&self) -> PathBuf {
        self.transport
            .cache_path
            .clone()
            .unwrap_or_else(|| app_dir().join("cache.db"))
    }
}

fn check_variables(kind: &str, names: &[String]) -> Result<(), ConfigError> {
    if names.is_empty() {
        return Err(ConfigError::Invalid(format!("no {kind} variables")));
    }
    let mut seen = HashSet::new();
    for name in names {
        if name == "date" {
            return Err(ConfigError::Invalid(format!(
                "'date' is reserved for the time axis ({kind})"
            )));
        }
        if !seen.insert(name.as_str()) {
            return Err(ConfigError::Invalid(format!(
                "duplicate {kind} variable '{name}'"
            )));
        }
    }
    Ok(())
}

/// `~/.mensaboard`, falling back to the working directory.
pub fn app_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),
    #[error("Parse error: {0}")]
    ParseError(String),
    #[error("Invalid config: {0}")]
    Invalid(String),
}
