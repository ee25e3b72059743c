//! Integration tests for the OpenWeather client and router using wiremock
//!
//! These drive the real reqwest transport against a mock HTTP server.

use std::time::Duration;

use serde_json::json;
use weather_app_core::{
    Config, Request, Router, WeatherError, WeatherService, router::Method, router::StatusCode,
    service_from_config,
};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path, query_param},
};

fn sample_current_response() -> serde_json::Value {
    json!({
        "coord": { "lon": -0.1257, "lat": 51.5085 },
        "weather": [{ "id": 500, "main": "Rain", "description": "light rain", "icon": "10d" }],
        "base": "stations",
        "main": {
            "temp": 14.56,
            "feels_like": 14.05,
            "temp_min": 13.2,
            "temp_max": 15.6,
            "pressure": 1012,
            "humidity": 82
        },
        "visibility": 10000,
        "wind": { "speed": 4.63, "deg": 240 },
        "clouds": { "all": 75 },
        "dt": 1715342400,
        "sys": { "country": "GB", "sunrise": 1715314253, "sunset": 1715369964 },
        "timezone": 3600,
        "id": 2643743,
        "name": "London",
        "cod": 200
    })
}

fn sample_forecast_response() -> serde_json::Value {
    // 2024-05-10 00:00:00 UTC
    let start = 1_715_299_200_i64;
    let list: Vec<_> = (0..40)
        .map(|i| {
            let dt = start + i * 3 * 3600;
            let hour = (i % 8) * 3;
            let date = 10 + i / 8;
            json!({
                "dt": dt,
                "main": { "temp": 15.0, "temp_min": 10.0 + i as f64, "temp_max": 17.25, "humidity": 50 + i },
                "weather": [{ "id": 800, "main": "Clear", "description": "clear sky", "icon": "01d" }],
                "dt_txt": format!("2024-05-{date:02} {hour:02}:00:00")
            })
        })
        .collect();

    json!({
        "cod": "200",
        "cnt": 40,
        "list": list,
        "city": { "id": 2950159, "name": "Berlin", "country": "DE", "timezone": 7200 }
    })
}

fn config_for(server: &MockServer) -> Config {
    let mut cfg = Config::default();
    cfg.set_api_key("TEST_KEY".into());
    cfg.base_url = server.uri();
    cfg.timeout_secs = 1;
    cfg
}

#[allow(clippy::expect_used)]
fn service_for(cfg: &Config) -> std::sync::Arc<dyn WeatherService> {
    service_from_config(cfg).expect("service")
}

async fn mount(server: &MockServer, endpoint: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(endpoint))
        .respond_with(response)
        .mount(server)
        .await;
}

// ============================================================================
// Success scenarios
// ============================================================================

#[tokio::test]
async fn current_weather_success() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/weather"))
        .and(query_param("q", "London"))
        .and(query_param("appid", "TEST_KEY"))
        .and(query_param("units", "metric"))
        .respond_with(ResponseTemplate::new(200).set_body_json(sample_current_response()))
        .expect(1)
        .mount(&server)
        .await;

    let service = service_for(&config_for(&server));
    let result = service.current_weather("London").await.expect("weather");

    assert_eq!(result.city, "London");
    assert_eq!(result.country, "GB");
    assert_eq!(result.temperature, 14.6);
    assert_eq!(result.feels_like, 14.1);
    assert_eq!(result.humidity, 82);
    assert_eq!(result.condition, "Light Rain");
    assert_eq!(result.icon, "10d");
    assert_eq!(result.wind_speed, 4.63);
}

#[tokio::test]
async fn forecast_success() {
    let server = MockServer::start().await;
    mount(&server, "/forecast", ResponseTemplate::new(200).set_body_json(sample_forecast_response())).await;

    let service = service_for(&config_for(&server));
    let result = service.forecast("Berlin").await.expect("forecast");

    assert_eq!(result.city, "Berlin");
    assert_eq!(result.forecast.len(), 5);

    let first = &result.forecast[0];
    assert_eq!(first.date, "2024-05-10");
    assert_eq!(first.day, "Fri");
    // 12:00 is the fifth entry of the day.
    assert_eq!(first.temp_min, 14.0);
    assert_eq!(first.temp_max, 17.3);
    assert_eq!(first.humidity, 54);

    let last = &result.forecast[4];
    assert_eq!(last.date, "2024-05-14");
    assert_eq!(last.day, "Tue");
}

// ============================================================================
// Error scenarios
// ============================================================================

#[tokio::test]
async fn unknown_city_is_not_found() {
    let server = MockServer::start().await;
    mount(
        &server,
        "/weather",
        ResponseTemplate::new(404).set_body_json(json!({ "cod": "404", "message": "city not found" })),
    )
    .await;

    let service = service_for(&config_for(&server));
    let err = service.current_weather("Atlantis").await.unwrap_err();

    assert_eq!(err, WeatherError::CityNotFound("Atlantis".into()));
}

#[tokio::test]
async fn unauthorized_wraps_status() {
    let server = MockServer::start().await;
    mount(&server, "/forecast", ResponseTemplate::new(401).set_body_string("Invalid API key")).await;

    let service = service_for(&config_for(&server));
    let err = service.forecast("Berlin").await.unwrap_err();

    assert_eq!(err, WeatherError::Upstream(StatusCode::UNAUTHORIZED));
    assert!(!err.to_string().contains("TEST_KEY"));
}

#[tokio::test]
async fn slow_upstream_times_out() {
    let server = MockServer::start().await;
    mount(
        &server,
        "/weather",
        ResponseTemplate::new(200)
            .set_body_json(sample_current_response())
            .set_delay(Duration::from_secs(3)),
    )
    .await;

    let service = service_for(&config_for(&server));
    let err = service.current_weather("London").await.unwrap_err();

    assert_eq!(err, WeatherError::Timeout);
}

#[tokio::test]
async fn refused_connection_is_reported() {
    let mut cfg = Config::default();
    cfg.set_api_key("TEST_KEY".into());
    cfg.base_url = "http://127.0.0.1:1".into();

    let service = service_for(&cfg);
    let err = service.current_weather("London").await.unwrap_err();

    assert_eq!(err, WeatherError::Connection);
}

#[tokio::test]
async fn garbage_body_is_unexpected() {
    let server = MockServer::start().await;
    mount(&server, "/weather", ResponseTemplate::new(200).set_body_string("<html>oops</html>")).await;

    let service = service_for(&config_for(&server));
    let err = service.current_weather("London").await.unwrap_err();

    assert!(matches!(err, WeatherError::Unexpected { .. }));
}

// ============================================================================
// Through the router
// ============================================================================

#[tokio::test]
async fn router_end_to_end() {
    let server = MockServer::start().await;
    mount(&server, "/weather", ResponseTemplate::new(200).set_body_json(sample_current_response())).await;
    mount(&server, "/forecast", ResponseTemplate::new(404)).await;

    let router = Router::new(service_from_config(&config_for(&server)));

    let ok = router
        .handle(&Request::new(Method::POST, "/api/weather").with_body(r#"{"city":"London"}"#))
        .await;
    assert_eq!(ok.status, StatusCode::OK);
    assert_eq!(ok.body.as_ref().map(|b| b["temperature"].clone()), Some(json!(14.6)));

    let missing = router
        .handle(&Request::new(Method::POST, "/api/forecast").with_body(r#"{"city":"Nowhere"}"#))
        .await;
    assert_eq!(missing.status, StatusCode::BAD_REQUEST);
    assert!(missing.body_text().contains("Nowhere"));
}

#[tokio::test]
async fn router_without_key_never_calls_upstream() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut cfg = config_for(&server);
    cfg.api_key = None;
    let router = Router::new(service_from_config(&cfg));

    let response = router
        .handle(&Request::new(Method::POST, "/api/weather").with_body(r#"{"city":"London"}"#))
        .await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
}
