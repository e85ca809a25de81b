//! Open-Meteo geocoding, marine and daily wind client. No API key required.

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use reqwest::Client;
use serde::{Deserialize, de::DeserializeOwned};

use crate::{
    CoreError,
    model::{DailyWind, MarineHour, Place},
    provider::truncate_body,
};

use super::MarineSource;

#[derive(Debug, Clone)]
pub struct OpenMeteoSource {
    geocoding_url: String,
    marine_url: String,
    forecast_url: String,
    timezone: String,
    http: Client,
}

impl OpenMeteoSource {
    pub fn new(timezone: &str) -> Self {
        Self {
            geocoding_url: "https://geocoding-api.open-meteo.com".to_string(),
            marine_url: "https://marine-api.open-meteo.com".to_string(),
            forecast_url: "https://api.open-meteo.com".to_string(),
            timezone: timezone.to_string(),
            http: Client::new(),
        }
    }

    pub fn with_base_urls(mut self, geocoding: &str, marine: &str, forecast: &str) -> Self {
        self.geocoding_url = geocoding.trim_end_matches('/').to_string();
        self.marine_url = marine.trim_end_matches('/').to_string();
        self.forecast_url = forecast.trim_end_matches('/').to_string();
        self
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: String,
        what: &str,
        query: &[(&str, String)],
    ) -> Result<T, CoreError> {
        tracing::debug!(%url, what, "Open-Meteo request");

        let res = self.http.get(&url).query(query).send().await.map_err(|e| {
            CoreError::Transport(format!("Failed to send request to Open-Meteo ({what}): {e}"))
        })?;

        let status = res.status();
        let body = res.text().await.map_err(|e| {
            CoreError::Transport(format!("Failed to read Open-Meteo {what} response body: {e}"))
        })?;

        if !status.is_success() {
            return Err(CoreError::Transport(format!(
                "Open-Meteo {what} request failed with status {status}: {}",
                truncate_body(&body),
            )));
        }

        serde_json::from_str(&body).map_err(|e| {
            CoreError::Transport(format!("Failed to parse Open-Meteo {what} JSON: {e}"))
        })
    }
}

#[derive(Debug, Deserialize)]
struct GeoResult {
    name: String,
    latitude: f64,
    longitude: f64,
    #[serde(default)]
    country: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeoResponse {
    #[serde(default)]
    results: Option<Vec<GeoResult>>,
}

#[derive(Debug, Default, Deserialize)]
struct MarineHourly {
    time: Option<Vec<String>>,
    wave_height: Option<Vec<Option<f64>>>,
    #[serde(default)]
    wave_direction: Vec<Option<f64>>,
    #[serde(default)]
    wave_period: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct MarineResponse {
    #[serde(default)]
    hourly: Option<MarineHourly>,
}

#[derive(Debug, Default, Deserialize)]
struct WindDaily {
    #[serde(default)]
    time: Vec<String>,
    wind_speed_10m_max: Option<Vec<Option<f64>>>,
    wind_direction_10m_dominant: Option<Vec<Option<f64>>>,
}

#[derive(Debug, Deserialize)]
struct WindResponse {
    #[serde(default)]
    daily: Option<WindDaily>,
}

fn parse_hour(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S"))
        .ok()
}

fn marine_rows(hourly: MarineHourly) -> Result<Vec<MarineHour>, CoreError> {
    let (Some(time), Some(height)) = (hourly.time, hourly.wave_height) else {
        return Err(CoreError::Transport("Incomplete Open-Meteo response (waves)".to_string()));
    };

    // Rows stay aligned with the hour index; a missing reading is kept as a gap.
    let rows = time
        .iter()
        .enumerate()
        .filter_map(|(i, t)| {
            Some(MarineHour {
                time: parse_hour(t)?,
                wave_height_m: height.get(i).copied().flatten(),
                wave_direction_deg: hourly
                    .wave_direction
                    .get(i)
                    .copied()
                    .flatten()
                    .unwrap_or(0.0),
                wave_period_s: hourly.wave_period.get(i).copied().flatten().unwrap_or(0.0),
            })
        })
        .collect();

    Ok(rows)
}

fn wind_rows(daily: WindDaily) -> Result<Vec<DailyWind>, CoreError> {
    let (Some(speed), Some(direction)) =
        (daily.wind_speed_10m_max, daily.wind_direction_10m_dominant)
    else {
        return Err(CoreError::Transport("Incomplete Open-Meteo response (wind)".to_string()));
    };

    let rows = daily
        .time
        .iter()
        .enumerate()
        .filter_map(|(i, d)| {
            Some(DailyWind {
                date: NaiveDate::parse_from_str(d, "%Y-%m-%d").ok()?,
                max_speed_kmh: (*speed.get(i)?)?,
                dominant_direction_deg: (*direction.get(i)?)?,
            })
        })
        .collect();

    Ok(rows)
}

#[async_trait]
impl MarineSource for OpenMeteoSource {
    async fn geocode(&self, name: &str) -> Result<Place, CoreError> {
        let parsed: GeoResponse = self
            .get_json(
                format!("{}/v1/search", self.geocoding_url),
                "geocoding",
                &[("name", name.to_string()), ("count", "1".to_string())],
            )
            .await?;

        let hit = parsed
            .results
            .and_then(|r| r.into_iter().next())
            .ok_or_else(|| CoreError::NotFound(format!("No geocoding result for '{name}'")))?;

        let display_name = match hit.country {
            Some(country) if !country.is_empty() => format!("{}, {}", hit.name, country),
            _ => hit.name,
        };

        Ok(Place {
            latitude: hit.latitude,
            longitude: hit.longitude,
            display_name,
        })
    }

    async fn marine_hourly(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<Vec<MarineHour>, CoreError> {
        let parsed: MarineResponse = self
            .get_json(
                format!("{}/v1/marine", self.marine_url),
                "marine",
                &[
                    ("latitude", latitude.to_string()),
                    ("longitude", longitude.to_string()),
                    ("hourly", "wave_height,wave_direction,wave_period".to_string()),
                    ("timezone", self.timezone.clone()),
                ],
            )
            .await?;

        marine_rows(parsed.hourly.unwrap_or_default())
    }

    async fn daily_wind(&self, latitude: f64, longitude: f64) -> Result<Vec<DailyWind>, CoreError> {
        let parsed: WindResponse = self
            .get_json(
                format!("{}/v1/forecast", self.forecast_url),
                "wind",
                &[
                    ("latitude", latitude.to_string()),
                    ("longitude", longitude.to_string()),
                    ("daily", "wind_speed_10m_max,wind_direction_10m_dominant".to_string()),
                    ("wind_speed_unit", "kmh".to_string()),
                    ("timezone", self.timezone.clone()),
                ],
            )
            .await?;

        wind_rows(parsed.daily.unwrap_or_default())
    }
}
