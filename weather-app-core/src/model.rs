use serde::{Deserialize, Serialize};

use crate::error::WeatherError;

/// Current conditions for a city, as returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherResult {
    pub success: bool,
    pub city: String,
    pub country: String,
    /// Degrees Celsius, one decimal.
    pub temperature: f64,
    pub feels_like: f64,
    pub humidity: u8,
    pub condition: String,
    pub icon: String,
    pub wind_speed: f64,
}

/// One representative reading per calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastDay {
    /// `YYYY-MM-DD`
    pub date: String,
    /// Three-letter weekday, e.g. `Mon`.
    pub day: String,
    pub temp_min: f64,
    pub temp_max: f64,
    pub condition: String,
    pub icon: String,
    pub humidity: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    pub success: bool,
    pub city: String,
    pub forecast: Vec<ForecastDay>,
}

/// Body of every failed response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResult {
    pub error: String,
}

impl ErrorResult {
    pub fn new(message: impl Into<String>) -> Self {
        Self { error: message.into() }
    }
}

impl From<&WeatherError> for ErrorResult {
    fn from(err: &WeatherError) -> Self {
        Self::new(err.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub service: String,
    pub api_key_set: bool,
}
