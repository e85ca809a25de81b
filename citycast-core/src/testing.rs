//! In-process sources for unit tests.

use std::{
    collections::HashSet,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, TimeZone, Utc};

use crate::{
    CoreError,
    model::{CitySnapshot, CurrentConditions, DailyWind, MarineHour, Place, WeatherRecord},
    provider::{MarineSource, WeatherRecordSource},
};

/// Resolves any name to a fixed place unless told otherwise.
#[derive(Debug, Clone, Default)]
pub struct FakeSource {
    calls: Arc<AtomicUsize>,
    not_found: HashSet<String>,
    missing_key: bool,
    failing_forecast: bool,
    forecast: Vec<WeatherRecord>,
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn not_found(mut self, name: &str) -> Self {
        self.not_found.insert(name.to_string());
        self
    }

    pub fn without_key(mut self) -> Self {
        self.missing_key = true;
        self
    }

    pub fn with_forecast(mut self, records: Vec<WeatherRecord>) -> Self {
        self.forecast = records;
        self
    }

    pub fn failing_forecast(mut self) -> Self {
        self.failing_forecast = true;
        self
    }

    /// Number of remote lookups made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn observed_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 2, 10, 0, 0).unwrap()
    }

    fn conditions(
        &self,
        name: &str,
        latitude: f64,
        longitude: f64,
    ) -> Result<CurrentConditions, CoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.missing_key {
            return Err(CoreError::Configuration("Missing OpenWeather API key".into()));
        }
        if self.not_found.contains(name) {
            return Err(CoreError::NotFound(name.to_string()));
        }

        Ok(CurrentConditions {
            source_id: name.len() as i64,
            city: name.to_string(),
            country: "ES".to_string(),
            latitude,
            longitude,
            record: WeatherRecord {
                timestamp: Self::observed_at(),
                temperature: 21.6,
                icon_code: "02d".to_string(),
                description: "algo de nubes".to_string(),
            },
            feels_like: 21.0,
            wind_speed_mps: 2.5,
            cloudiness_pct: 40,
        })
    }
}

#[async_trait]
impl WeatherRecordSource for FakeSource {
    async fn resolve_current_by_name(&self, name: &str) -> Result<CurrentConditions, CoreError> {
        self.conditions(name, 40.0, -3.0)
    }

    async fn resolve_current_by_coordinates(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<CurrentConditions, CoreError> {
        self.conditions("Coordenadas", latitude, longitude)
    }

    async fn resolve_forecast_by_coordinates(
        &self,
        _latitude: f64,
        _longitude: f64,
    ) -> Result<Vec<WeatherRecord>, CoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing_forecast {
            return Err(CoreError::Transport("forecast down".into()));
        }
        Ok(self.forecast.clone())
    }

    async fn resolve_coordinates_by_name(&self, name: &str) -> Result<Place, CoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.not_found.contains(name) {
            return Err(CoreError::NotFound(name.to_string()));
        }
        Ok(Place {
            latitude: 41.38,
            longitude: 2.17,
            display_name: format!("{name}, ES"),
        })
    }

    /// Capture times advance by one millisecond per call so ids never collide.
    async fn snapshot_by_name(&self, name: &str) -> Result<CitySnapshot, CoreError> {
        let current = self.resolve_current_by_name(name).await?;
        let seq = self.calls() as i64;
        Ok(current.to_snapshot(Self::observed_at() + Duration::milliseconds(seq)))
    }
}

#[derive(Debug, Clone, Default)]
pub struct FakeMarine {
    pub hours: usize,
    pub incomplete: bool,
    pub unknown_place: bool,
    /// Hour indexes reported without a wave height.
    pub gaps: Vec<usize>,
}

#[async_trait]
impl MarineSource for FakeMarine {
    async fn geocode(&self, name: &str) -> Result<Place, CoreError> {
        if self.unknown_place {
            return Err(CoreError::NotFound(name.to_string()));
        }
        Ok(Place {
            latitude: 41.38,
            longitude: 2.17,
            display_name: format!("{name}, España"),
        })
    }

    async fn marine_hourly(
        &self,
        _latitude: f64,
        _longitude: f64,
    ) -> Result<Vec<MarineHour>, CoreError> {
        if self.incomplete {
            return Err(CoreError::Transport("Incomplete Open-Meteo response (waves)".into()));
        }
        let start = NaiveDate::from_ymd_opt(2025, 6, 2)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .unwrap_or(NaiveDateTime::MIN);
        Ok((0..self.hours)
            .map(|i| MarineHour {
                time: start + Duration::hours(i as i64),
                wave_height_m: (!self.gaps.contains(&i)).then(|| 0.5 + i as f64 / 10.0),
                wave_direction_deg: 180.0,
                wave_period_s: 6.0,
            })
            .collect())
    }

    async fn daily_wind(
        &self,
        _latitude: f64,
        _longitude: f64,
    ) -> Result<Vec<DailyWind>, CoreError> {
        Ok(vec![DailyWind {
            date: NaiveDate::from_ymd_opt(2025, 6, 2).unwrap_or_default(),
            max_speed_kmh: 24.3,
            dominant_direction_deg: 247.6,
        }])
    }
}
