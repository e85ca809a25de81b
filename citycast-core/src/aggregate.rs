//! Turns a raw forecast sequence into "today" hours and per-day summaries.
//!
//! Everything here is a pure function of its inputs. Records are expected in
//! ascending timestamp order; nothing is re-sorted, so "first" always means
//! first in the input sequence.

use std::fmt::Display;

use chrono::{DateTime, Locale, NaiveDate, TimeZone};

use crate::model::{DaySummary, HourSummary, WeatherRecord, icon_url};

/// Records of the same local calendar day as `now`, capped at `max_count`.
pub fn derive_today_hours<Tz>(
    records: &[WeatherRecord],
    now: &DateTime<Tz>,
    max_count: usize,
) -> Vec<HourSummary>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let tz = now.timezone();
    let today = now.date_naive();

    records
        .iter()
        .filter_map(|record| {
            let local = record.timestamp.with_timezone(&tz);
            (local.date_naive() == today).then(|| HourSummary {
                display_time: local.format("%H:%M").to_string(),
                temperature: record.temperature,
                icon_url: icon_url(&record.icon_code),
            })
        })
        .take(max_count)
        .collect()
}

struct DayBucket {
    date: NaiveDate,
    label: String,
    first_icon: String,
    max: f64,
    min: f64,
}

/// Buckets records by local calendar date and summarises each bucket.
///
/// Buckets come out in first-seen order and only the first `max_days` are
/// kept. The icon of a day is the icon of its first record.
pub fn derive_daily_aggregates<Tz>(
    records: &[WeatherRecord],
    tz: &Tz,
    max_days: usize,
    locale: Locale,
) -> Vec<DaySummary>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let mut buckets: Vec<DayBucket> = Vec::new();

    for record in records {
        let local = record.timestamp.with_timezone(tz);
        let date = local.date_naive();

        if let Some(bucket) = buckets.iter_mut().find(|b| b.date == date) {
            bucket.max = bucket.max.max(record.temperature);
            bucket.min = bucket.min.min(record.temperature);
            continue;
        }

        // Past the day cap; later days are dropped.
        if buckets.len() >= max_days {
            continue;
        }

        buckets.push(DayBucket {
            date,
            label: capitalize(&local.format_localized("%A", locale).to_string()),
            first_icon: record.icon_code.clone(),
            max: record.temperature,
            min: record.temperature,
        });
    }

    buckets
        .into_iter()
        .map(|b| DaySummary {
            date: b.date,
            label: b.label,
            icon_url: icon_url(&b.first_icon),
            max_temperature: b.max,
            min_temperature: b.min,
        })
        .collect()
}

/// Series for a max/min temperature line chart.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TemperatureChart {
    pub labels: Vec<String>,
    pub max_series: Vec<f64>,
    pub min_series: Vec<f64>,
}

impl TemperatureChart {
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

pub fn temperature_chart(days: &[DaySummary], limit: usize) -> TemperatureChart {
    let days = &days[..days.len().min(limit)];
    TemperatureChart {
        labels: days.iter().map(|d| d.label.clone()).collect(),
        max_series: days.iter().map(|d| d.max_temperature).collect(),
        min_series: days.iter().map(|d| d.min_temperature).collect(),
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
