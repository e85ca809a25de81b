use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, de::DeserializeOwned};

use crate::{
    API_KEY_ENV, CoreError,
    model::{CurrentConditions, Place, WeatherRecord},
    provider::truncate_body,
};

use super::WeatherRecordSource;

const DEFAULT_ICON: &str = "01d";

#[derive(Debug, Clone)]
pub struct OpenWeatherSource {
    api_key: Option<String>,
    base_url: String,
    lang: String,
    http: Client,
}

impl OpenWeatherSource {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key,
            base_url: "https://api.openweathermap.org".to_string(),
            lang: "es".to_string(),
            http: Client::new(),
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_lang(mut self, lang: &str) -> Self {
        self.lang = lang.to_string();
        self
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn api_key(&self) -> Result<&str, CoreError> {
        self.api_key.as_deref().ok_or_else(|| {
            CoreError::Configuration(format!(
                "Missing OpenWeather API key.\n\
                 Hint: set {API_KEY_ENV} or run `citycast configure`."
            ))
        })
    }

    /// GET `path` with the shared query parameters and decode the body as `T`.
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        what: &str,
        query: &[(&str, String)],
    ) -> Result<T, CoreError> {
        let api_key = self.api_key()?;
        let url = format!("{}{}", self.base_url, path);

        tracing::debug!(%url, what, "OpenWeather request");

        let res = self
            .http
            .get(&url)
            .query(query)
            .query(&[("appid", api_key), ("units", "metric"), ("lang", self.lang.as_str())])
            .send()
            .await
            .map_err(|e| {
                CoreError::Transport(format!("Failed to send request to OpenWeather ({what}): {e}"))
            })?;

        let status = res.status();
        let body = res.text().await.map_err(|e| {
            CoreError::Transport(format!("Failed to read OpenWeather {what} response body: {e}"))
        })?;

        match status {
            s if s.is_success() => {}
            StatusCode::NOT_FOUND => {
                return Err(CoreError::NotFound(format!(
                    "OpenWeather {what}: {}",
                    truncate_body(&body)
                )));
            }
            StatusCode::UNAUTHORIZED => {
                return Err(CoreError::Configuration(
                    "OpenWeather rejected the API key".to_string(),
                ));
            }
            _ => {
                return Err(CoreError::Transport(format!(
                    "OpenWeather {what} request failed with status {status}: {}",
                    truncate_body(&body),
                )));
            }
        }

        serde_json::from_str(&body).map_err(|e| {
            CoreError::Transport(format!("Failed to parse OpenWeather {what} JSON: {e}"))
        })
    }

    async fn fetch_current(
        &self,
        query: &[(&str, String)],
    ) -> Result<CurrentConditions, CoreError> {
        let parsed: OwCurrentResponse =
            self.get_json("/data/2.5/weather", "current", query).await?;
        Ok(parsed.into_conditions())
    }
}

#[derive(Debug, Deserialize)]
struct OwCoord {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    #[serde(default)]
    feels_like: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    icon: String,
    description: String,
}

#[derive(Debug, Default, Deserialize)]
struct OwWind {
    #[serde(default)]
    speed: f64,
}

#[derive(Debug, Default, Deserialize)]
struct OwClouds {
    #[serde(default)]
    all: u8,
}

#[derive(Debug, Default, Deserialize)]
struct OwSys {
    #[serde(default)]
    country: String,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    id: i64,
    name: String,
    coord: OwCoord,
    dt: i64,
    main: OwMain,
    #[serde(default)]
    weather: Vec<OwWeather>,
    #[serde(default)]
    wind: OwWind,
    #[serde(default)]
    clouds: OwClouds,
    #[serde(default)]
    sys: OwSys,
}

impl OwCurrentResponse {
    fn into_conditions(self) -> CurrentConditions {
        let (icon_code, description) = first_condition(self.weather, "despejado");

        CurrentConditions {
            source_id: self.id,
            city: self.name,
            country: self.sys.country,
            latitude: self.coord.lat,
            longitude: self.coord.lon,
            record: WeatherRecord {
                timestamp: unix_to_utc(self.dt).unwrap_or_else(Utc::now),
                temperature: self.main.temp,
                icon_code,
                description,
            },
            feels_like: self.main.feels_like.unwrap_or(self.main.temp),
            wind_speed_mps: self.wind.speed,
            cloudiness_pct: self.clouds.all,
        }
    }
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt: i64,
    main: OwMain,
    weather: Vec<OwWeather>,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    // Entries are decoded one by one so a single bad entry is skipped, not fatal.
    list: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct OwGeoEntry {
    name: String,
    lat: f64,
    lon: f64,
    #[serde(default)]
    country: String,
}

fn first_condition(weather: Vec<OwWeather>, fallback_description: &str) -> (String, String) {
    weather
        .into_iter()
        .next()
        .map(|w| (w.icon, w.description))
        .unwrap_or_else(|| (DEFAULT_ICON.to_string(), fallback_description.to_string()))
}

/// Strict decoding of forecast entries; malformed ones are dropped.
fn parse_forecast_entries(list: Vec<serde_json::Value>) -> Vec<WeatherRecord> {
    list.into_iter()
        .filter_map(|value| match serde_json::from_value::<OwForecastEntry>(value) {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::debug!(error = %e, "skipping malformed forecast entry");
                None
            }
        })
        .filter_map(|entry| {
            let timestamp = unix_to_utc(entry.dt)?;
            if !entry.main.temp.is_finite() {
                return None;
            }
            let (icon_code, description) = first_condition(entry.weather, "");
            Some(WeatherRecord {
                timestamp,
                temperature: entry.main.temp,
                icon_code,
                description,
            })
        })
        .collect()
}

#[async_trait]
impl WeatherRecordSource for OpenWeatherSource {
    async fn resolve_current_by_name(&self, name: &str) -> Result<CurrentConditions, CoreError> {
        self.fetch_current(&[("q", name.to_string())]).await
    }

    async fn resolve_current_by_coordinates(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<CurrentConditions, CoreError> {
        self.fetch_current(&[("lat", latitude.to_string()), ("lon", longitude.to_string())])
            .await
    }

    async fn resolve_forecast_by_coordinates(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<Vec<WeatherRecord>, CoreError> {
        let parsed: OwForecastResponse = self
            .get_json(
                "/data/2.5/forecast",
                "forecast",
                &[("lat", latitude.to_string()), ("lon", longitude.to_string())],
            )
            .await?;

        Ok(parse_forecast_entries(parsed.list))
    }

    async fn resolve_coordinates_by_name(&self, name: &str) -> Result<Place, CoreError> {
        let parsed: Vec<OwGeoEntry> = self
            .get_json(
                "/geo/1.0/direct",
                "geocoding",
                &[("q", name.to_string()), ("limit", "1".to_string())],
            )
            .await?;

        let entry = parsed
            .into_iter()
            .next()
            .ok_or_else(|| CoreError::NotFound(format!("No geocoding result for '{name}'")))?;

        let display_name = if entry.country.is_empty() {
            entry.name
        } else {
            format!("{}, {}", entry.name, entry.country)
        };

        Ok(Place {
            latitude: entry.lat,
            longitude: entry.lon,
            display_name,
        })
    }
}

fn unix_to_utc(ts: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(ts, 0)
}
