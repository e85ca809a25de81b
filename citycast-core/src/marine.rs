//! Wave and wind conditions for a coastal place.

use crate::{
    CoreError,
    model::{DailyWind, MarineHour, Place},
    provider::MarineSource,
};

/// Hourly rows shown in the conditions grid.
pub const MARINE_ROWS: usize = 9;
/// Points in the wave-height chart.
pub const WAVE_CHART_POINTS: usize = 12;

#[derive(Debug, Clone)]
pub struct MarineReport {
    pub place: Place,
    pub hours: Vec<MarineHour>,
    /// `(HH:MM, wave height in meters)`; hours without a reading are gaps.
    pub wave_chart: Vec<(String, Option<f64>)>,
    pub today_wind: Option<DailyWind>,
}

pub async fn load_marine<M>(source: &M, name: &str) -> Result<MarineReport, CoreError>
where
    M: MarineSource + ?Sized,
{
    let name = name.trim();
    if name.is_empty() {
        return Err(CoreError::NotFound("empty place name".into()));
    }

    let place = source.geocode(name).await?;
    let (hours, wind) = tokio::try_join!(
        source.marine_hourly(place.latitude, place.longitude),
        source.daily_wind(place.latitude, place.longitude),
    )?;

    tracing::debug!(place = %place.display_name, hours = hours.len(), "marine data loaded");

    let wave_chart = hours
        .iter()
        .take(WAVE_CHART_POINTS)
        .map(|h| (h.time.format("%H:%M").to_string(), h.wave_height_m))
        .collect();

    Ok(MarineReport {
        place,
        wave_chart,
        hours: hours.into_iter().take(MARINE_ROWS).collect(),
        today_wind: wind.into_iter().next(),
    })
}
