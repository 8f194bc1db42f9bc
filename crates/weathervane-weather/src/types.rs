use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use weathervane_core::NetworkError;

/// Weather condition categories mapped from Tomorrow.io weather codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WeatherCondition {
    #[default]
    Unknown,
    Clear,
    Cloudy,
    MostlyClear,
    PartlyCloudy,
    MostlyCloudy,
    Fog,
    LightFog,
    Drizzle,
    Rain,
    LightRain,
    HeavyRain,
    Snow,
    Flurries,
    LightSnow,
    HeavySnow,
    FreezingDrizzle,
    FreezingRain,
    LightFreezingRain,
    HeavyFreezingRain,
    IcePellets,
    HeavyIcePellets,
    LightIcePellets,
    Thunderstorm,
}

impl WeatherCondition {
    /// Convert a Tomorrow.io weather code to a WeatherCondition
    /// See: https://docs.tomorrow.io/reference/data-layers-weather-codes
    pub fn from_code(code: i32) -> Self {
        match code {
            1000 => Self::Clear,
            1001 => Self::Cloudy,
            1100 => Self::MostlyClear,
            1101 => Self::PartlyCloudy,
            1102 => Self::MostlyCloudy,
            2000 => Self::Fog,
            2100 => Self::LightFog,
            4000 => Self::Drizzle,
            4001 => Self::Rain,
            4200 => Self::LightRain,
            4201 => Self::HeavyRain,
            5000 => Self::Snow,
            5001 => Self::Flurries,
            5100 => Self::LightSnow,
            5101 => Self::HeavySnow,
            6000 => Self::FreezingDrizzle,
            6001 => Self::FreezingRain,
            6200 => Self::LightFreezingRain,
            6201 => Self::HeavyFreezingRain,
            7000 => Self::IcePellets,
            7101 => Self::HeavyIcePellets,
            7102 => Self::LightIcePellets,
            8000 => Self::Thunderstorm,
            _ => Self::Unknown,
        }
    }

    /// Get a human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            Self::Unknown => "Unknown",
            Self::Clear => "Clear",
            Self::Cloudy => "Cloudy",
            Self::MostlyClear => "Mostly Clear",
            Self::PartlyCloudy => "Partly Cloudy",
            Self::MostlyCloudy => "Mostly Cloudy",
            Self::Fog => "Fog",
            Self::LightFog => "Light Fog",
            Self::Drizzle => "Drizzle",
            Self::Rain => "Rain",
            Self::LightRain => "Light Rain",
            Self::HeavyRain => "Heavy Rain",
            Self::Snow => "Snow",
            Self::Flurries => "Flurries",
            Self::LightSnow => "Light Snow",
            Self::HeavySnow => "Heavy Snow",
            Self::FreezingDrizzle => "Freezing Drizzle",
            Self::FreezingRain => "Freezing Rain",
            Self::LightFreezingRain => "Light Freezing Rain",
            Self::HeavyFreezingRain => "Heavy Freezing Rain",
            Self::IcePellets => "Ice Pellets",
            Self::HeavyIcePellets => "Heavy Ice Pellets",
            Self::LightIcePellets => "Light Ice Pellets",
            Self::Thunderstorm => "Thunderstorm",
        }
    }

    /// Get the icon asset name
    pub fn icon_name(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Clear => "clear_day",
            Self::Cloudy => "cloudy",
            Self::MostlyClear => "mostly_clear_day",
            Self::PartlyCloudy => "partly_cloudy_day",
            Self::MostlyCloudy => "mostly_cloudy",
            Self::Fog => "fog",
            Self::LightFog => "fog_light",
            Self::Drizzle => "drizzle",
            Self::Rain => "rain",
            Self::LightRain => "rain_light",
            Self::HeavyRain => "rain_heavy",
            Self::Snow => "snow",
            Self::Flurries => "flurries",
            Self::LightSnow => "snow_light",
            Self::HeavySnow => "snow_heavy",
            Self::FreezingDrizzle => "freezing_drizzle",
            Self::FreezingRain => "freezing_rain",
            Self::LightFreezingRain => "freezing_rain_light",
            Self::HeavyFreezingRain => "freezing_rain_heavy",
            Self::IcePellets => "ice_pellets",
            Self::HeavyIcePellets => "ice_pellets_heavy",
            Self::LightIcePellets => "ice_pellets_light",
            Self::Thunderstorm => "tstorm",
        }
    }
}

/// A single forecast slot (minutely or hourly).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub id: Uuid,
    pub weather_code: i32,
    pub temperature: String,
    pub time: String,
}

impl ForecastPoint {
    pub fn condition(&self) -> WeatherCondition {
        WeatherCondition::from_code(self.weather_code)
    }

    pub fn description(&self) -> &'static str {
        self.condition().description()
    }

    pub fn icon_name(&self) -> &'static str {
        self.condition().icon_name()
    }
}

/// A daily forecast entry with high/low temperatures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyForecastPoint {
    pub id: Uuid,
    pub time: String,
    pub temperature_max: String,
    pub temperature_min: String,
    pub weather_code: i32,
}

impl DailyForecastPoint {
    pub fn condition(&self) -> WeatherCondition {
        WeatherCondition::from_code(self.weather_code)
    }

    pub fn description(&self) -> &'static str {
        self.condition().description()
    }

    pub fn icon_name(&self) -> &'static str {
        self.condition().icon_name()
    }
}

/// One search-history entry.
///
/// Unique per `city` in the search store; `observed_at` orders the history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRecord {
    pub id: Uuid,
    pub time: String,
    pub observed_at: DateTime<Utc>,
    pub city: String,
    pub weather_code: i32,
    pub temperature: String,
    pub temperature_apparent: String,
    pub forecasts: Vec<ForecastPoint>,
}

impl SearchRecord {
    pub fn condition(&self) -> WeatherCondition {
        WeatherCondition::from_code(self.weather_code)
    }

    pub fn description(&self) -> &'static str {
        self.condition().description()
    }

    pub fn icon_name(&self) -> &'static str {
        self.condition().icon_name()
    }
}

/// Everything the detail screen shows for one searched location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailRecord {
    pub id: Uuid,
    pub time: String,
    pub city: String,
    pub weather_code: i32,
    pub temperature: String,
    pub minutely: Vec<ForecastPoint>,
    pub hourly: Vec<ForecastPoint>,
    pub daily: Vec<DailyForecastPoint>,
}

impl DetailRecord {
    pub fn condition(&self) -> WeatherCondition {
        WeatherCondition::from_code(self.weather_code)
    }

    pub fn description(&self) -> &'static str {
        self.condition().description()
    }

    pub fn icon_name(&self) -> &'static str {
        self.condition().icon_name()
    }
}

/// Weather provider errors
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("{0}")]
    Network(#[from] NetworkError),
    #[error("Weather API returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("Failed to decode weather response: {0}")]
    Decode(String),
    #[error("Invalid request URL: {0}")]
    InvalidUrl(String),
}

impl WeatherError {
    /// User-friendly error message for UI display.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Network(e) => e.user_message(),
            Self::Status { status: 401 | 403, .. } => {
                "Weather API key is invalid. Check settings."
            }
            Self::Status { status: 429, .. } => "Too many requests. Please wait and try again.",
            Self::Status { .. } => "Weather service error. Please try again.",
            Self::Decode(_) => "Received an unexpected response. Please try again.",
            Self::InvalidUrl(_) => "Weather service is misconfigured. Check settings.",
        }
    }
}
