use reqwest::StatusCode;
use thiserror::Error;

/// Failures that leave the weather service permanently unavailable for the
/// lifetime of the process.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("OPENWEATHER_API_KEY environment variable is not set")]
    MissingApiKey,

    #[error("HTTP client could not be initialized: {0}")]
    HttpClient(String),
}

/// Errors produced by an upstream transport.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,

    #[error("connection failed")]
    Connect,

    #[error("upstream responded with status {status}")]
    Status { status: StatusCode, body: String },

    #[error("upstream body is not valid JSON: {0}")]
    Decode(String),

    #[error("transport failure: {0}")]
    Other(String),
}

/// A failed weather lookup.
///
/// The `Display` text is exactly what callers see in the `error` field, so it
/// must never contain upstream URLs (they carry the API key).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WeatherError {
    #[error("City name cannot be empty")]
    EmptyCity,

    #[error("City '{0}' not found. Please check the spelling.")]
    CityNotFound(String),

    #[error("Request timed out. Please try again.")]
    Timeout,

    #[error("Connection error. Check your internet connection.")]
    Connection,

    #[error("Failed to fetch weather data: upstream returned {0}")]
    Upstream(StatusCode),

    /// `detail` is kept for logs only.
    #[error("Unexpected error while fetching weather data. Please try again later.")]
    Unexpected { detail: String },
}

impl WeatherError {
    pub(crate) fn unexpected(detail: impl Into<String>) -> Self {
        WeatherError::Unexpected { detail: detail.into() }
    }

    /// Map a transport failure for a lookup of `city`.
    pub(crate) fn from_transport(err: TransportError, city: &str) -> Self {
        match err {
            TransportError::Status { status, .. } if status == StatusCode::NOT_FOUND => {
                WeatherError::CityNotFound(city.to_string())
            }
            TransportError::Status { status, .. } => WeatherError::Upstream(status),
            TransportError::Timeout => WeatherError::Timeout,
            TransportError::Connect => WeatherError::Connection,
            TransportError::Decode(detail) | TransportError::Other(detail) => {
                WeatherError::Unexpected { detail }
            }
        }
    }
}
