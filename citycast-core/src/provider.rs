use async_trait::async_trait;
use chrono::Utc;
use std::fmt::Debug;

use crate::{
    Config, CoreError,
    model::{CitySnapshot, CurrentConditions, DailyWind, MarineHour, Place, WeatherRecord},
    provider::{openmeteo::OpenMeteoSource, openweather::OpenWeatherSource},
};

pub mod openmeteo;
pub mod openweather;

/// Supplier of current observations, forecasts and geocoding.
#[async_trait]
pub trait WeatherRecordSource: Send + Sync + Debug {
    async fn resolve_current_by_name(&self, name: &str) -> Result<CurrentConditions, CoreError>;

    async fn resolve_current_by_coordinates(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<CurrentConditions, CoreError>;

    /// Forecast records in ascending time order.
    async fn resolve_forecast_by_coordinates(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<Vec<WeatherRecord>, CoreError>;

    async fn resolve_coordinates_by_name(&self, name: &str) -> Result<Place, CoreError>;

    /// A list entry for `name`, captured now.
    async fn snapshot_by_name(&self, name: &str) -> Result<CitySnapshot, CoreError> {
        let current = self.resolve_current_by_name(name).await?;
        Ok(current.to_snapshot(Utc::now()))
    }
}

/// Supplier of wave and wind data.
#[async_trait]
pub trait MarineSource: Send + Sync + Debug {
    async fn geocode(&self, name: &str) -> Result<Place, CoreError>;

    async fn marine_hourly(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<Vec<MarineHour>, CoreError>;

    async fn daily_wind(&self, latitude: f64, longitude: f64) -> Result<Vec<DailyWind>, CoreError>;
}

/// Construct the OpenWeather source from config.
///
/// A missing API key is not an error here: the source reports it on first use,
/// so data already held can still be shown.
pub fn weather_source_from_config(config: &Config) -> OpenWeatherSource {
    OpenWeatherSource::new(config.api_key().map(str::to_owned))
        .with_base_url(&config.endpoints.openweather)
        .with_lang(&config.lang)
}

pub fn marine_source_from_config(config: &Config) -> OpenMeteoSource {
    OpenMeteoSource::new(&config.marine_timezone).with_base_urls(
        &config.endpoints.openmeteo_geocoding,
        &config.endpoints.openmeteo_marine,
        &config.endpoints.openmeteo_forecast,
    )
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &body[..end])
    } else {
        body.to_string()
    }
}
