use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc};

use crate::{
    Config,
    error::{ConfigError, WeatherError},
    model::{ForecastResult, WeatherResult},
    provider::openweather::OpenWeatherClient,
};

pub mod openweather;

/// Weather lookups served by the router.
#[async_trait]
pub trait WeatherService: Send + Sync + Debug {
    async fn current_weather(&self, city: &str) -> Result<WeatherResult, WeatherError>;

    async fn forecast(&self, city: &str) -> Result<ForecastResult, WeatherError>;
}

/// Outcome of building the service at startup. An `Err` is permanent for the
/// lifetime of the process.
pub type ServiceInit = Result<Arc<dyn WeatherService>, ConfigError>;

/// Construct the OpenWeather-backed service from config.
pub fn service_from_config(config: &Config) -> ServiceInit {
    let client = OpenWeatherClient::from_config(config)?;
    Ok(Arc::new(client))
}
