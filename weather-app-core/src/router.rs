//! Method + path dispatch for the serverless entry point.

use reqwest::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
    CONTENT_TYPE, HeaderMap, HeaderValue,
};
use serde::Serialize;
use serde_json::Value;
use tracing::{error, info, warn};

pub use reqwest::{Method, StatusCode};

use crate::{
    error::{ConfigError, WeatherError},
    model::{ErrorResult, HealthStatus},
    provider::ServiceInit,
};

pub const HEALTH_PATH: &str = "/api/health";
pub const API_ROOT_PATH: &str = "/api";
pub const WEATHER_PATH: &str = "/api/weather";
pub const FORECAST_PATH: &str = "/api/forecast";

const SERVICE_NAME: &str = "weather-app";
const SERVICE_UNAVAILABLE: &str = "Weather service unavailable. Check API key configuration.";
const CITY_REQUIRED: &str = "City parameter is required";

/// An inbound request as handed over by the hosting runtime.
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    /// Request target; any query string is ignored for routing.
    pub path: String,
    pub body: Vec<u8>,
}

impl Request {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self { method, path: path.into(), body: Vec::new() }
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }
}

#[derive(Debug, Clone)]
pub struct Response {
    pub status: StatusCode,
    pub headers: HeaderMap,
    /// `None` for an empty body.
    pub body: Option<Value>,
}

impl Response {
    fn empty(status: StatusCode) -> Self {
        Self { status, headers: cors_headers(), body: None }
    }

    fn json(status: StatusCode, body: Value) -> Self {
        Self { status, headers: cors_headers(), body: Some(body) }
    }

    fn error(status: StatusCode, message: impl Into<String>) -> Self {
        let message: String = message.into();
        Self::json(status, serde_json::json!({ "error": message }))
    }

    /// Serialize `body`, turning a serialization failure into a 500.
    fn serialized<B: Serialize>(status: StatusCode, body: &B) -> Self {
        match serde_json::to_value(body) {
            Ok(value) => Self::json(status, value),
            Err(e) => {
                error!(error = %e, "failed to serialize response body");
                Self::error(StatusCode::INTERNAL_SERVER_ERROR, format!("Server error: {e}"))
            }
        }
    }

    /// The body as sent on the wire.
    pub fn body_text(&self) -> String {
        self.body.as_ref().map(Value::to_string).unwrap_or_default()
    }
}

/// Headers carried by every response.
pub fn cors_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(ACCESS_CONTROL_ALLOW_METHODS, HeaderValue::from_static("GET, POST, OPTIONS"));
    headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static("Content-Type"));
    headers
}

#[derive(Debug, Clone, Copy)]
enum Lookup {
    Current,
    Forecast,
}

/// Stateless dispatcher over the service built at startup.
#[derive(Debug)]
pub struct Router {
    service: ServiceInit,
    api_key_set: bool,
}

impl Router {
    pub fn new(service: ServiceInit) -> Self {
        let api_key_set = !matches!(service, Err(ConfigError::MissingApiKey));
        if let Err(e) = &service {
            warn!(error = %e, "weather service failed to initialize");
        }
        Self { service, api_key_set }
    }

    pub async fn handle(&self, request: &Request) -> Response {
        let path = request.path.split_once('?').map_or(request.path.as_str(), |(path, _)| path);

        let response = match (&request.method, path) {
            (&Method::OPTIONS, _) => Response::empty(StatusCode::OK),
            (&Method::GET, HEALTH_PATH | API_ROOT_PATH) => self.health(),
            (&Method::POST, WEATHER_PATH) => self.lookup(Lookup::Current, &request.body).await,
            (&Method::POST, FORECAST_PATH) => self.lookup(Lookup::Forecast, &request.body).await,
            _ => Response::error(StatusCode::NOT_FOUND, "Not found"),
        };

        info!(method = %request.method, path, status = response.status.as_u16(), "handled request");
        response
    }

    fn health(&self) -> Response {
        Response::serialized(
            StatusCode::OK,
            &HealthStatus {
                status: "healthy".to_string(),
                service: SERVICE_NAME.to_string(),
                api_key_set: self.api_key_set,
            },
        )
    }

    async fn lookup(&self, lookup: Lookup, body: &[u8]) -> Response {
        let Ok(service) = &self.service else {
            return Response::error(StatusCode::INTERNAL_SERVER_ERROR, SERVICE_UNAVAILABLE);
        };

        let Some(city) = city_from_body(body) else {
            return Response::error(StatusCode::BAD_REQUEST, CITY_REQUIRED);
        };

        match lookup {
            Lookup::Current => respond(service.current_weather(&city).await),
            Lookup::Forecast => respond(service.forecast(&city).await),
        }
    }
}

fn respond<B: Serialize>(result: Result<B, WeatherError>) -> Response {
    match result {
        Ok(body) => Response::serialized(StatusCode::OK, &body),
        Err(e) => {
            if let WeatherError::Unexpected { detail } = &e {
                warn!(%detail, "weather lookup failed unexpectedly");
            }
            Response::serialized(StatusCode::BAD_REQUEST, &ErrorResult::from(&e))
        }
    }
}

/// Trimmed, non-empty `city` from a JSON body. Unparseable bodies count as `{}`.
fn city_from_body(body: &[u8]) -> Option<String> {
    let parsed: Value = serde_json::from_slice(body).unwrap_or_default();

    parsed
        .get("city")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|city| !city.is_empty())
        .map(str::to_string)
}
