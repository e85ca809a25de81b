//! Session-only list of cities shown as markers on a map. Never persisted.

use crate::{
    CoreError,
    model::{CitySnapshot, icon_url_large},
    provider::WeatherRecordSource,
};

/// Map view centered on Madrid.
pub const DEFAULT_CENTER: (f64, f64) = (40.4168, -3.7038);
pub const DEFAULT_ZOOM: u8 = 6;

#[derive(Debug, Clone, PartialEq)]
pub struct MapMarker {
    pub id: String,
    pub position: (f64, f64),
    pub icon_url: String,
    pub popup: String,
}

impl MapMarker {
    fn from_snapshot(city: &CitySnapshot) -> Option<Self> {
        Some(Self {
            id: city.id.clone(),
            position: (city.latitude?, city.longitude?),
            icon_url: icon_url_large(&city.icon_code),
            popup: format!("{}\n{}°C, {}", city.name, city.temperature.round(), city.description),
        })
    }
}

#[derive(Debug)]
pub struct CityMap<S> {
    source: S,
    cities: Vec<CitySnapshot>,
    last_error: Option<String>,
}

impl<S: WeatherRecordSource> CityMap<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            cities: Vec::new(),
            last_error: None,
        }
    }

    /// Geocode `name`, fetch its weather at those coordinates and pin it.
    pub async fn add(&mut self, name: &str) -> Result<&CitySnapshot, CoreError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(self.fail(CoreError::NotFound("empty city name".into())));
        }

        let snapshot = match self.resolve(name).await {
            Ok(snapshot) => snapshot,
            Err(e) => return Err(self.fail(e)),
        };

        self.last_error = None;
        self.cities.push(snapshot);
        Ok(&self.cities[self.cities.len() - 1])
    }

    async fn resolve(&self, name: &str) -> Result<CitySnapshot, CoreError> {
        let place = self.source.resolve_coordinates_by_name(name).await?;
        let current = self
            .source
            .resolve_current_by_coordinates(place.latitude, place.longitude)
            .await?;

        Ok(CitySnapshot {
            name: place.display_name,
            latitude: Some(place.latitude),
            longitude: Some(place.longitude),
            ..current.to_snapshot(chrono::Utc::now())
        })
    }

    pub fn cities(&self) -> &[CitySnapshot] {
        &self.cities
    }

    pub fn markers(&self) -> Vec<MapMarker> {
        self.cities.iter().filter_map(MapMarker::from_snapshot).collect()
    }

    pub fn center(&self) -> (f64, f64) {
        DEFAULT_CENTER
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    fn fail(&mut self, err: CoreError) -> CoreError {
        tracing::warn!(error = %err, "map lookup failed");
        self.last_error = Some(err.user_message());
        err
    }
}
