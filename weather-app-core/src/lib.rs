//! Core library for the `weather-app` relay.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The upstream transport seam and its reqwest implementation
//! - The OpenWeather client, including forecast day-bucketing
//! - Shared response models
//! - The method + path request router
//!
//! It is used by `weather-app-cli`, but any serverless host can drive [`Router`]
//! directly.

pub mod config;
pub mod error;
pub mod forecast;
pub mod format;
pub mod model;
pub mod provider;
pub mod router;
pub mod transport;

pub use config::Config;
pub use error::{ConfigError, TransportError, WeatherError};
pub use model::{ErrorResult, ForecastDay, ForecastResult, HealthStatus, WeatherResult};
pub use provider::{ServiceInit, WeatherService, openweather::OpenWeatherClient, service_from_config};
pub use router::{Request, Response, Router};
pub use transport::{ReqwestTransport, Transport};
