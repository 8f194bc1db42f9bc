//! Projection of API responses into domain records.

use chrono::Utc;
use uuid::Uuid;

use crate::format::{self, DisplayFormat};
use crate::response::WeatherResponse;
use crate::types::{DailyForecastPoint, DetailRecord, ForecastPoint, SearchRecord};

/// Hourly slots kept on a search-history entry.
pub const SEARCH_FORECAST_LIMIT: usize = 6;
/// Minutely slots shown on the detail screen.
pub const MINUTELY_LIMIT: usize = 10;
/// Hourly slots shown on the detail screen and in historical forecasts.
pub const HOURLY_LIMIT: usize = 10;

/// Build a search-history entry for `city`.
///
/// Returns `None` when the response carries no minutely data. Hourly entries
/// missing a code, temperature or time are skipped. Times stay in API form
/// and temperatures carry no unit; the history store formats both on read.
pub fn to_search_record(response: &WeatherResponse, city: &str) -> Option<SearchRecord> {
    let current = response.minutely().first()?;
    let values = current.values.clone().unwrap_or_default();
    let time = current.time.clone().unwrap_or_default();

    let forecasts = response
        .hourly()
        .iter()
        .take(SEARCH_FORECAST_LIMIT)
        .filter_map(|entry| {
            let values = entry.values.as_ref()?;
            Some(ForecastPoint {
                id: Uuid::new_v4(),
                weather_code: values.weather_code?,
                temperature: format::temperature(values.temperature?),
                time: entry.time.clone()?,
            })
        })
        .collect();

    Some(SearchRecord {
        id: Uuid::new_v4(),
        observed_at: format::parse_timestamp(&time).unwrap_or_else(Utc::now),
        time,
        city: city.to_string(),
        weather_code: values.weather_code.unwrap_or(0),
        temperature: format::temperature(values.temperature.unwrap_or(0.0)),
        temperature_apparent: format::temperature(values.temperature_apparent.unwrap_or(0.0)),
        forecasts,
    })
}

/// Build the detail screen's record; the city is title-cased.
pub fn to_detail_record(response: &WeatherResponse, city: &str) -> DetailRecord {
    let current = response.minutely().first();
    let values = current.and_then(|e| e.values.as_ref());

    DetailRecord {
        id: Uuid::new_v4(),
        time: current
            .and_then(|e| e.time.as_deref())
            .map(|t| format::format_time(t, DisplayFormat::FullDateWithTime))
            .unwrap_or_default(),
        city: format::capitalize_words(city),
        weather_code: values.and_then(|v| v.weather_code).unwrap_or(0),
        temperature: format::celsius(values.and_then(|v| v.temperature).unwrap_or(0.0)),
        minutely: to_minutely(response),
        hourly: to_hourly(response),
        daily: to_daily(response),
    }
}

pub fn to_minutely(response: &WeatherResponse) -> Vec<ForecastPoint> {
    response
        .minutely()
        .iter()
        .take(MINUTELY_LIMIT)
        .map(|entry| forecast_point(entry, DisplayFormat::HourMinute))
        .collect()
}

pub fn to_hourly(response: &WeatherResponse) -> Vec<ForecastPoint> {
    response
        .hourly()
        .iter()
        .take(HOURLY_LIMIT)
        .map(|entry| forecast_point(entry, DisplayFormat::Hour))
        .collect()
}

pub fn to_daily(response: &WeatherResponse) -> Vec<DailyForecastPoint> {
    response
        .daily()
        .iter()
        .map(|entry| {
            let values = entry.values.clone().unwrap_or_default();
            DailyForecastPoint {
                id: Uuid::new_v4(),
                time: format::format_time(
                    entry.time.as_deref().unwrap_or_default(),
                    DisplayFormat::DayOfWeekShort,
                ),
                temperature_max: format::celsius(values.temperature_max.unwrap_or(0.0)),
                temperature_min: format::celsius(values.temperature_min.unwrap_or(0.0)),
                weather_code: values.weather_code_max.unwrap_or(0),
            }
        })
        .collect()
}

fn forecast_point(entry: &crate::response::WeatherEntry, layout: DisplayFormat) -> ForecastPoint {
    let values = entry.values.as_ref();
    ForecastPoint {
        id: Uuid::new_v4(),
        weather_code: values.and_then(|v| v.weather_code).unwrap_or(0),
        temperature: format::celsius(values.and_then(|v| v.temperature).unwrap_or(0.0)),
        time: format::format_time(entry.time.as_deref().unwrap_or_default(), layout),
    }
}
