//! Wire model of the Tomorrow.io v4 timeline responses.
//!
//! Both `forecast` and `history/recent` return this shape. Every field is
//! optional and unknown fields are ignored, so partial payloads still decode.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeatherResponse {
    #[serde(default)]
    pub timelines: Option<Timelines>,
    #[serde(default)]
    pub location: Option<ResponseLocation>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseLocation {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Timelines {
    #[serde(default)]
    pub minutely: Option<Vec<WeatherEntry>>,
    #[serde(default)]
    pub hourly: Option<Vec<WeatherEntry>>,
    #[serde(default)]
    pub daily: Option<Vec<DailyEntry>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeatherEntry {
    pub time: Option<String>,
    pub values: Option<WeatherValues>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DailyEntry {
    pub time: Option<String>,
    pub values: Option<DailyValues>,
}

/// Instantaneous readings for a minutely or hourly slot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherValues {
    pub cloud_base: Option<f64>,
    pub cloud_ceiling: Option<f64>,
    pub cloud_cover: Option<f64>,
    pub dew_point: Option<f64>,
    pub freezing_rain_intensity: Option<f64>,
    pub humidity: Option<f64>,
    pub precipitation_probability: Option<f64>,
    pub pressure_surface_level: Option<f64>,
    pub rain_intensity: Option<f64>,
    pub sleet_intensity: Option<f64>,
    pub snow_intensity: Option<f64>,
    pub temperature: Option<f64>,
    pub temperature_apparent: Option<f64>,
    pub uv_health_concern: Option<f64>,
    pub uv_index: Option<f64>,
    pub visibility: Option<f64>,
    pub weather_code: Option<i32>,
    pub wind_direction: Option<f64>,
    pub wind_gust: Option<f64>,
    pub wind_speed: Option<f64>,
}

/// Aggregated readings for one day.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyValues {
    pub cloud_cover_avg: Option<f64>,
    pub dew_point_avg: Option<f64>,
    pub humidity_avg: Option<f64>,
    pub precipitation_probability_avg: Option<f64>,
    pub temperature_apparent_avg: Option<f64>,
    pub temperature_apparent_max: Option<f64>,
    pub temperature_apparent_min: Option<f64>,
    pub temperature_avg: Option<f64>,
    pub temperature_max: Option<f64>,
    pub temperature_min: Option<f64>,
    pub uv_index_max: Option<i32>,
    pub visibility_avg: Option<f64>,
    pub weather_code_max: Option<i32>,
    pub weather_code_min: Option<i32>,
    pub wind_speed_avg: Option<f64>,
    pub wind_speed_max: Option<f64>,
}

impl WeatherResponse {
    pub fn minutely(&self) -> &[WeatherEntry] {
        self.timelines
            .as_ref()
            .and_then(|t| t.minutely.as_deref())
            .unwrap_or_default()
    }

    pub fn hourly(&self) -> &[WeatherEntry] {
        self.timelines
            .as_ref()
            .and_then(|t| t.hourly.as_deref())
            .unwrap_or_default()
    }

    pub fn daily(&self) -> &[DailyEntry] {
        self.timelines
            .as_ref()
            .and_then(|t| t.daily.as_deref())
            .unwrap_or_default()
    }
}
