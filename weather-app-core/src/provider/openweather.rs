use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, de::DeserializeOwned};
use std::{fmt, time::Duration};
use tracing::{debug, instrument, warn};

use crate::{
    Config,
    error::{ConfigError, WeatherError},
    forecast::pick_daily,
    format::{round_to_tenth, title_case},
    model::{ForecastDay, ForecastResult, WeatherResult},
    transport::{ReqwestTransport, Transport},
};

use super::WeatherService;

const CURRENT_ENDPOINT: &str = "weather";
const FORECAST_ENDPOINT: &str = "forecast";

/// Client for the OpenWeather current-weather and 5-day forecast endpoints.
pub struct OpenWeatherClient<T = ReqwestTransport> {
    api_key: String,
    base_url: String,
    timeout: Duration,
    transport: T,
}

impl OpenWeatherClient {
    /// Build a client with the reqwest transport. Fails if no API key is configured.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let api_key = config.api_key()?;
        let transport = ReqwestTransport::new()?;
        Self::with_transport(api_key, &config.base_url, config.timeout(), transport)
    }
}

impl<T: Transport> OpenWeatherClient<T> {
    pub fn with_transport(
        api_key: impl Into<String>,
        base_url: &str,
        timeout: Duration,
        transport: T,
    ) -> Result<Self, ConfigError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(ConfigError::MissingApiKey);
        }

        Ok(Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
            transport,
        })
    }

    async fn fetch<R: DeserializeOwned>(&self, endpoint: &str, city: &str) -> Result<R, WeatherError> {
        let url = format!("{}/{}", self.base_url, endpoint);
        let params = [("q", city), ("appid", self.api_key.as_str()), ("units", "metric")];

        debug!(%url, "querying OpenWeather");

        let body = self
            .transport
            .fetch_json(&url, &params, self.timeout)
            .await
            .map_err(|e| {
                warn!(error = %e, endpoint, "OpenWeather request failed");
                WeatherError::from_transport(e, city)
            })?;

        serde_json::from_value(body).map_err(|e| {
            warn!(error = %e, endpoint, "unexpected OpenWeather payload");
            WeatherError::unexpected(format!("unexpected {endpoint} payload: {e}"))
        })
    }
}

impl<T: Transport> fmt::Debug for OpenWeatherClient<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenWeatherClient")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("transport", &self.transport)
            .finish_non_exhaustive()
    }
}

fn validate_city(city: &str) -> Result<&str, WeatherError> {
    let city = city.trim();
    if city.is_empty() {
        return Err(WeatherError::EmptyCity);
    }
    Ok(city)
}

fn first_condition(weather: &[OwCondition]) -> Result<&OwCondition, WeatherError> {
    weather
        .first()
        .ok_or_else(|| WeatherError::unexpected("OpenWeather response contained no conditions"))
}

fn weekday_abbrev(ts: i64) -> Result<String, WeatherError> {
    DateTime::<Utc>::from_timestamp(ts, 0)
        .map(|dt| dt.format("%a").to_string())
        .ok_or_else(|| WeatherError::unexpected(format!("timestamp out of range: {ts}")))
}

#[derive(Debug, Deserialize)]
struct OwCondition {
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OwCurrentMain {
    temp: f64,
    feels_like: f64,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwSys {
    #[serde(default)]
    country: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    sys: OwSys,
    main: OwCurrentMain,
    weather: Vec<OwCondition>,
    wind: OwWind,
}

#[derive(Debug, Deserialize)]
struct OwForecastMain {
    temp_min: f64,
    temp_max: f64,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt: i64,
    dt_txt: String,
    main: OwForecastMain,
    weather: Vec<OwCondition>,
}

#[derive(Debug, Deserialize)]
struct OwCity {
    name: String,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    city: OwCity,
    list: Vec<OwForecastEntry>,
}

impl OwCurrentResponse {
    fn into_result(self) -> Result<WeatherResult, WeatherError> {
        let condition = first_condition(&self.weather)?;

        Ok(WeatherResult {
            success: true,
            country: self.sys.country,
            temperature: round_to_tenth(self.main.temp),
            feels_like: round_to_tenth(self.main.feels_like),
            humidity: self.main.humidity,
            condition: title_case(&condition.description),
            icon: condition.icon.clone(),
            wind_speed: self.wind.speed,
            city: self.name,
        })
    }
}

impl OwForecastEntry {
    fn to_day(&self) -> Result<ForecastDay, WeatherError> {
        let condition = first_condition(&self.weather)?;
        let date = self.dt_txt.split_once(' ').map_or(self.dt_txt.as_str(), |(date, _)| date);

        Ok(ForecastDay {
            date: date.to_string(),
            day: weekday_abbrev(self.dt)?,
            temp_min: round_to_tenth(self.main.temp_min),
            temp_max: round_to_tenth(self.main.temp_max),
            condition: title_case(&condition.description),
            icon: condition.icon.clone(),
            humidity: self.main.humidity,
        })
    }
}

#[async_trait]
impl<T: Transport> WeatherService for OpenWeatherClient<T> {
    #[instrument(skip(self))]
    async fn current_weather(&self, city: &str) -> Result<WeatherResult, WeatherError> {
        let city = validate_city(city)?;

        let parsed: OwCurrentResponse = self.fetch(CURRENT_ENDPOINT, city).await?;
        parsed.into_result()
    }

    #[instrument(skip(self))]
    async fn forecast(&self, city: &str) -> Result<ForecastResult, WeatherError> {
        let city = validate_city(city)?;

        let parsed: OwForecastResponse = self.fetch(FORECAST_ENDPOINT, city).await?;
        debug!(entries = parsed.list.len(), "bucketing forecast entries");

        let forecast = pick_daily(&parsed.list, |entry| entry.dt_txt.as_str())?
            .into_iter()
            .map(OwForecastEntry::to_day)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ForecastResult { success: true, city: parsed.city.name, forecast })
    }
}
