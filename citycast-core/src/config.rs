use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

/// Environment variable that overrides the stored OpenWeather key.
pub const API_KEY_ENV: &str = "OPENWEATHER_API_KEY";

pub const DEFAULT_STORAGE_KEY: &str = "ciudades";

/// Base URLs for the remote services; overridable for testing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub openweather: String,
    pub openmeteo_geocoding: String,
    pub openmeteo_marine: String,
    pub openmeteo_forecast: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            openweather: "https://api.openweathermap.org".to_string(),
            openmeteo_geocoding: "https://geocoding-api.open-meteo.com".to_string(),
            openmeteo_marine: "https://marine-api.open-meteo.com".to_string(),
            openmeteo_forecast: "https://api.open-meteo.com".to_string(),
        }
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
/// lang = "es"
/// default_cities = ["Madrid", "Barcelona"]
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// OpenWeather API key.
    pub api_key: Option<String>,

    /// Language passed to OpenWeather for descriptions.
    pub lang: String,

    /// Locale used for weekday labels, e.g. "es_ES".
    pub locale: String,

    /// City shown by `show` when none is given.
    pub default_city: String,

    /// Cities used to populate an empty list on first run.
    pub default_cities: Vec<String>,

    pub storage_key: String,

    pub today_hours: usize,
    pub forecast_days: usize,
    pub compact_chart_days: usize,

    /// IANA zone sent to Open-Meteo for marine and wind data.
    pub marine_timezone: String,

    pub endpoints: Endpoints,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            lang: "es".to_string(),
            locale: "es_ES".to_string(),
            default_city: "Barcelona".to_string(),
            default_cities: ["Madrid", "Barcelona", "Bilbao", "Málaga"]
                .into_iter()
                .map(String::from)
                .collect(),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            today_hours: 6,
            forecast_days: 7,
            compact_chart_days: 3,
            marine_timezone: "Europe/Madrid".to_string(),
            endpoints: Endpoints::default(),
        }
    }
}

impl Config {
    /// Load config from disk, or return defaults if it doesn't exist yet.
    /// The API key from the environment wins over the stored one.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        let mut cfg = Self::load_from(&path)?;
        cfg.apply_env_override(std::env::var(API_KEY_ENV).ok());
        Ok(cfg)
    }

    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, use defaults.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "citycast", "citycast")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn apply_env_override(&mut self, value: Option<String>) {
        if let Some(key) = value.filter(|k| !k.trim().is_empty()) {
            self.api_key = Some(key);
        }
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.api_key = Some(api_key);
    }

    /// Returns the API key, ignoring blank values.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|k| !k.trim().is_empty())
    }

    /// Weekday label locale; unknown names fall back to Spanish.
    pub fn chrono_locale(&self) -> chrono::Locale {
        chrono::Locale::try_from(self.locale.as_str()).unwrap_or(chrono::Locale::es_ES)
    }
}
