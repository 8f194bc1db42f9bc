//! Canned responses and records for tests.
//!
//! Compiled for this crate's own tests and, through the `fixtures` feature,
//! for downstream crates' dev-dependencies.

use chrono::{TimeZone, Utc};
use uuid::Uuid;

use crate::response::{
    DailyEntry, DailyValues, ResponseLocation, Timelines, WeatherEntry, WeatherResponse,
    WeatherValues,
};
use crate::types::{DailyForecastPoint, DetailRecord, ForecastPoint, SearchRecord};

fn slot(time: &str, temperature: f64, code: i32) -> WeatherEntry {
    WeatherEntry {
        time: Some(time.to_string()),
        values: Some(WeatherValues {
            temperature: Some(temperature),
            temperature_apparent: Some(temperature),
            humidity: Some(64.0),
            weather_code: Some(code),
            ..Default::default()
        }),
    }
}

fn day(time: &str, max: f64, min: f64, code: i32) -> DailyEntry {
    DailyEntry {
        time: Some(time.to_string()),
        values: Some(DailyValues {
            temperature_max: Some(max),
            temperature_min: Some(min),
            weather_code_max: Some(code),
            ..Default::default()
        }),
    }
}

fn new_york() -> ResponseLocation {
    ResponseLocation {
        lat: Some(40.7128),
        lon: Some(-74.0060),
        name: Some("New York".to_string()),
        kind: Some("city".to_string()),
    }
}

impl WeatherResponse {
    /// A `forecast` response for New York with three slots per timeline.
    pub fn mock() -> Self {
        Self {
            timelines: Some(Timelines {
                minutely: Some(vec![
                    slot("2024-07-09T11:49:00Z", 20.19, 1001),
                    slot("2024-07-09T11:50:00Z", 20.5, 1001),
                    slot("2024-07-09T11:51:00Z", 21.0, 1001),
                ]),
                hourly: Some(vec![
                    slot("2024-07-09T12:00:00Z", 21.0, 1001),
                    slot("2024-07-09T13:00:00Z", 21.5, 1101),
                    slot("2024-07-09T14:00:00Z", 22.0, 1100),
                ]),
                daily: Some(vec![
                    day("2024-07-09T00:00:00Z", 23.0, 21.0, 1001),
                    day("2024-07-10T00:00:00Z", 24.0, 19.5, 1101),
                    day("2024-07-11T00:00:00Z", 26.0, 20.0, 1000),
                ]),
            }),
            location: Some(new_york()),
        }
    }

    /// A `history/recent` response with one hourly and one daily entry.
    pub fn mock_history() -> Self {
        Self {
            timelines: Some(Timelines {
                minutely: None,
                hourly: Some(vec![slot("2024-07-09T12:00:00Z", 21.0, 1001)]),
                daily: Some(vec![day("2024-07-09T00:00:00Z", 23.0, 21.0, 1001)]),
            }),
            location: Some(new_york()),
        }
    }
}

impl ForecastPoint {
    pub fn mock() -> Vec<Self> {
        [("20.19°C", 1001), ("20.5", 1002), ("21.0", 1003)]
            .into_iter()
            .map(|(temperature, weather_code)| Self {
                id: Uuid::new_v4(),
                weather_code,
                temperature: temperature.to_string(),
                time: "12 PM".to_string(),
            })
            .collect()
    }
}

impl DailyForecastPoint {
    pub fn mock() -> Vec<Self> {
        [("25.0°C", "18.0°C", 1001), ("26.0°C", "19.0°C", 1002), ("27.0°C", "20.0°C", 1003)]
            .into_iter()
            .map(|(max, min, weather_code)| Self {
                id: Uuid::new_v4(),
                time: "Tue".to_string(),
                temperature_max: max.to_string(),
                temperature_min: min.to_string(),
                weather_code,
            })
            .collect()
    }
}

impl DetailRecord {
    pub fn mock() -> Self {
        Self {
            id: Uuid::new_v4(),
            time: "Tue Jul 09 2024 11 AM".to_string(),
            city: "New York".to_string(),
            weather_code: 1001,
            temperature: "20.19°C".to_string(),
            minutely: ForecastPoint::mock(),
            hourly: ForecastPoint::mock(),
            daily: DailyForecastPoint::mock(),
        }
    }
}

impl SearchRecord {
    /// A history entry for `city` observed at the given hour of 2024-07-09.
    pub fn mock(city: &str, hour: u32) -> Self {
        let observed_at = Utc
            .with_ymd_and_hms(2024, 7, 9, hour, 0, 0)
            .single()
            .unwrap_or_else(Utc::now);
        Self {
            id: Uuid::new_v4(),
            time: observed_at.to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
            observed_at,
            city: city.to_string(),
            weather_code: 1001,
            temperature: "20.2".to_string(),
            temperature_apparent: "20.2".to_string(),
            forecasts: ForecastPoint::mock(),
        }
    }
}
