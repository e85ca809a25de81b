use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

const ICON_BASE_URL: &str = "https://openweathermap.org/img/wn";

/// Small icon used in hourly and daily rows.
pub fn icon_url(icon_code: &str) -> String {
    format!("{ICON_BASE_URL}/{icon_code}.png")
}

/// Large icon used for current conditions and map markers.
pub fn icon_url_large(icon_code: &str) -> String {
    format!("{ICON_BASE_URL}/{icon_code}@2x.png")
}

/// A point-in-time weather sample as delivered by a source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherRecord {
    pub timestamp: DateTime<Utc>,
    pub temperature: f64,
    pub icon_code: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HourSummary {
    pub display_time: String,
    pub temperature: f64,
    pub icon_url: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DaySummary {
    /// Bucket key; the label is derived from it.
    pub date: NaiveDate,
    pub label: String,
    pub icon_url: String,
    pub max_temperature: f64,
    pub min_temperature: f64,
}

/// One entry of the user's city list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CitySnapshot {
    pub id: String,
    /// "City, CC"
    pub name: String,
    pub temperature: f64,
    pub icon_code: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
}

/// Result of resolving a place name to coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct Place {
    pub latitude: f64,
    pub longitude: f64,
    pub display_name: String,
}

/// Current observation for a place, as returned by a source.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentConditions {
    /// Provider-side identifier of the place.
    pub source_id: i64,
    pub city: String,
    pub country: String,
    pub latitude: f64,
    pub longitude: f64,
    pub record: WeatherRecord,
    pub feels_like: f64,
    pub wind_speed_mps: f64,
    pub cloudiness_pct: u8,
}

impl CurrentConditions {
    pub fn display_name(&self) -> String {
        if self.country.is_empty() {
            self.city.clone()
        } else {
            format!("{}, {}", self.city, self.country)
        }
    }

    /// Build a list entry captured at `captured_at`.
    ///
    /// The id embeds the capture time, so two captures of the same place
    /// usually get distinct ids.
    pub fn to_snapshot(&self, captured_at: DateTime<Utc>) -> CitySnapshot {
        CitySnapshot {
            id: format!("{}-{}", self.source_id, captured_at.timestamp_millis()),
            name: self.display_name(),
            temperature: self.record.temperature,
            icon_code: self.record.icon_code.clone(),
            description: self.record.description.clone(),
            latitude: None,
            longitude: None,
        }
    }
}

/// Derived "air conditions" panel values.
#[derive(Debug, Clone, PartialEq)]
pub struct AirConditions {
    pub real_feel: f64,
    pub wind_kmh: f64,
    pub rain_chance_pct: u8,
    pub uv_index: u8,
}

impl From<&CurrentConditions> for AirConditions {
    fn from(current: &CurrentConditions) -> Self {
        // No precipitation or UV data on the free tier; cloudiness stands in for both.
        Self {
            real_feel: current.feels_like,
            wind_kmh: current.wind_speed_mps * 3.6,
            rain_chance_pct: current.cloudiness_pct,
            uv_index: (f64::from(current.cloudiness_pct) / 33.0).round() as u8,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarineHour {
    pub time: NaiveDateTime,
    /// `None` when the service has no reading for this hour.
    pub wave_height_m: Option<f64>,
    pub wave_direction_deg: f64,
    pub wave_period_s: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DailyWind {
    pub date: NaiveDate,
    pub max_speed_kmh: f64,
    pub dominant_direction_deg: f64,
}
