//! Everything the main weather screen shows for one city.

use std::fmt::Display;

use chrono::{DateTime, Locale, TimeZone};

use crate::{
    Config, CoreError,
    aggregate::{TemperatureChart, derive_daily_aggregates, derive_today_hours, temperature_chart},
    model::{AirConditions, CurrentConditions, DaySummary, HourSummary, icon_url_large},
    provider::WeatherRecordSource,
};

#[derive(Debug, Clone)]
pub struct DashboardOptions {
    pub default_city: String,
    pub today_hours: usize,
    pub forecast_days: usize,
    pub compact_chart_days: usize,
    pub locale: Locale,
}

impl Default for DashboardOptions {
    fn default() -> Self {
        Self {
            default_city: "Barcelona".to_string(),
            today_hours: 6,
            forecast_days: 7,
            compact_chart_days: 3,
            locale: Locale::es_ES,
        }
    }
}

impl From<&Config> for DashboardOptions {
    fn from(config: &Config) -> Self {
        Self {
            default_city: config.default_city.clone(),
            today_hours: config.today_hours,
            forecast_days: config.forecast_days,
            compact_chart_days: config.compact_chart_days,
            locale: config.chrono_locale(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Dashboard {
    pub current: CurrentConditions,
    pub icon_url: String,
    pub air: AirConditions,
    pub hours: Vec<HourSummary>,
    pub days: Vec<DaySummary>,
    pub chart: TemperatureChart,
    pub compact_chart: TemperatureChart,
}

/// Fetch current conditions and forecast for `city` and derive the views.
///
/// A blank `city` falls back to [`DashboardOptions::default_city`].
pub async fn load_dashboard<S, Tz>(
    source: &S,
    city: &str,
    now: &DateTime<Tz>,
    options: &DashboardOptions,
) -> Result<Dashboard, CoreError>
where
    S: WeatherRecordSource + ?Sized,
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let city = match city.trim() {
        "" => options.default_city.as_str(),
        name => name,
    };

    let current = source.resolve_current_by_name(city).await?;
    let records = source
        .resolve_forecast_by_coordinates(current.latitude, current.longitude)
        .await
        .map_err(|e| match e {
            CoreError::Transport(msg) => {
                CoreError::Transport(format!("Forecast unavailable: {msg}"))
            }
            other => other,
        })?;

    tracing::debug!(city, records = records.len(), "forecast loaded");

    let hours = derive_today_hours(&records, now, options.today_hours);
    let days = derive_daily_aggregates(
        &records,
        &now.timezone(),
        options.forecast_days,
        options.locale,
    );
    let chart = temperature_chart(&days, days.len());
    let compact_chart = temperature_chart(&days, options.compact_chart_days);

    Ok(Dashboard {
        icon_url: icon_url_large(&current.record.icon_code),
        air: AirConditions::from(&current),
        current,
        hours,
        days,
        chart,
        compact_chart,
    })
}
