//! Core library for the `citycast` weather client.
//!
//! This crate defines:
//! - Forecast aggregation into "today" hours and per-day summaries
//! - The persisted, user-ordered city list
//! - Dashboard, map and marine views built on top of them
//! - Abstractions over weather sources and blob storage
//!
//! It is used by `citycast-cli`, but can also be reused by other front ends.

pub mod aggregate;
pub mod collection;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod map;
pub mod marine;
pub mod model;
pub mod provider;
pub mod store;

#[cfg(test)]
mod testing;

pub use collection::{CityCollection, CollectionOptions};
pub use config::{API_KEY_ENV, Config, DEFAULT_STORAGE_KEY, Endpoints};
pub use dashboard::{Dashboard, DashboardOptions, load_dashboard};
pub use error::CoreError;
pub use map::{CityMap, MapMarker};
pub use marine::{MarineReport, load_marine};
pub use model::{CitySnapshot, DaySummary, HourSummary, WeatherRecord};
pub use provider::{MarineSource, WeatherRecordSource};
pub use store::{BlobStore, FileBlobStore, MemoryBlobStore};
