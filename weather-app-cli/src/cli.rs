use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use inquire::{Password, PasswordDisplayMode};
use serde_json::{Map, Value, json};
use std::process::ExitCode;
use tracing::debug;
use weather_app_core::{
    Config, Request, Response, Router,
    router::{FORECAST_PATH, HEALTH_PATH, Method, WEATHER_PATH},
    service_from_config,
};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather-app", version, about = "Run single requests through the weather-app handler")]
pub struct Cli {
    /// Log at debug level.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key in the config file.
    Configure,

    /// Health check (`GET /api/health`).
    Health,

    /// Current weather for a city (`POST /api/weather`).
    Current {
        /// City name, e.g. "London" or "Paris,FR".
        city: String,
    },

    /// Five-day forecast for a city (`POST /api/forecast`).
    Forecast {
        /// City name, e.g. "London" or "Paris,FR".
        city: String,
    },

    /// Route an arbitrary request, the way a serverless host would.
    Invoke {
        #[arg(long, default_value = "GET")]
        method: String,

        #[arg(long)]
        path: String,

        /// Raw request body.
        #[arg(long)]
        body: Option<String>,
    },
}

impl Command {
    /// The request this command routes, or `None` for local-only commands.
    fn to_request(&self) -> anyhow::Result<Option<Request>> {
        let request = match self {
            Command::Configure => return Ok(None),
            Command::Health => Request::new(Method::GET, HEALTH_PATH),
            Command::Current { city } => city_request(WEATHER_PATH, city),
            Command::Forecast { city } => city_request(FORECAST_PATH, city),
            Command::Invoke { method, path, body } => {
                let method = Method::from_bytes(method.to_uppercase().as_bytes())
                    .with_context(|| format!("Invalid HTTP method '{method}'"))?;
                Request::new(method, path.as_str()).with_body(body.clone().unwrap_or_default())
            }
        };

        Ok(Some(request))
    }
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<ExitCode> {
        let Some(request) = self.command.to_request()? else {
            configure()?;
            return Ok(ExitCode::SUCCESS);
        };

        let config = Config::load()?;
        debug!(?config, "loaded configuration");

        let router = Router::new(service_from_config(&config));
        let response = router.handle(&request).await;

        println!("{}", render(&response)?);

        Ok(if response.status.is_success() { ExitCode::SUCCESS } else { ExitCode::FAILURE })
    }
}

fn city_request(path: &str, city: &str) -> Request {
    Request::new(Method::POST, path).with_body(json!({ "city": city }).to_string())
}

fn configure() -> anyhow::Result<()> {
    let path = Config::config_file_path()?;
    let mut config = Config::load_from(&path)?;

    let api_key = Password::new("OpenWeather API key:")
        .without_confirmation()
        .with_display_mode(PasswordDisplayMode::Masked)
        .prompt()
        .context("Failed to read API key")?;

    let api_key = api_key.trim();
    if api_key.is_empty() {
        bail!("API key cannot be empty");
    }

    config.set_api_key(api_key.to_string());
    config.save_to(&path)?;

    println!("Saved API key to {}", path.display());
    Ok(())
}

/// Render a response as `{status, headers, body}`.
fn render(response: &Response) -> anyhow::Result<String> {
    let headers: Map<String, Value> = response
        .headers
        .iter()
        .filter_map(|(name, value)| {
            value.to_str().ok().map(|v| (name.as_str().to_string(), Value::from(v)))
        })
        .collect();

    let out = json!({
        "status": response.status.as_u16(),
        "headers": headers,
        "body": response.body,
    });

    serde_json::to_string_pretty(&out).context("Failed to render response")
}
