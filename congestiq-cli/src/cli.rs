use anyhow::Context;
use clap::{Parser, Subcommand};
use congestiq_core::{
    AssistantContextBuilder, Config, ConversationMessage, LocationContext, ProviderId,
    TrafficImpactResult, WeatherContext, WeatherImpactService,
};
use inquire::Password;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "congestiq", version, about = "CongestiQ traffic intelligence")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP server exposing the weather-impact and assistant endpoints.
    Serve {
        /// Overrides the configured bind host.
        #[arg(long)]
        host: Option<String>,

        /// Overrides the configured bind port.
        #[arg(long)]
        port: Option<u16>,
    },

    /// Configure credentials for a specific provider.
    Configure {
        /// Provider short name: "openweather" or "ai-gateway".
        provider: String,
    },

    /// Show current weather and its traffic impact for a coordinate.
    Weather {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
    },

    /// Ask the traffic assistant a single question.
    Chat {
        message: String,

        /// Weather condition text, e.g. "light rain".
        #[arg(long)]
        condition: Option<String>,

        #[arg(long, allow_hyphen_values = true)]
        temperature: Option<f64>,

        #[arg(long)]
        humidity: Option<f64>,

        /// Resolved address of the user.
        #[arg(long)]
        address: Option<String>,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Serve { host, port } => {
                let mut config = Config::load_with_env()?;
                if let Some(host) = host {
                    config.server.host = host;
                }
                if let Some(port) = port {
                    config.server.port = port;
                }

                congestiq_core::api::serve(&config).await?;
            }
            Command::Configure { provider } => {
                let id = ProviderId::try_from(provider.as_str())?;
                configure(id)?;
            }
            Command::Weather { lat, lon } => {
                let config = Config::load_with_env()?;
                let service = WeatherImpactService::from_config(&config)?;

                let result = service.assess_conditions(lat, lon).await?;
                print_impact(&result);
            }
            Command::Chat { message, condition, temperature, humidity, address } => {
                let config = Config::load_with_env()?;
                let assistant = AssistantContextBuilder::from_config(&config)?;

                let weather = (condition.is_some() || temperature.is_some() || humidity.is_some())
                    .then(|| WeatherContext {
                        temperature,
                        condition,
                        humidity,
                    });
                let location = address.map(|address| LocationContext {
                    address: Some(address),
                    ..Default::default()
                });

                let reply = assistant
                    .generate_reply(
                        &[ConversationMessage::user(message)],
                        weather.as_ref(),
                        location.as_ref(),
                    )
                    .await?;

                println!("{reply}");
            }
        }

        Ok(())
    }
}

fn configure(id: ProviderId) -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = Password::new(&format!("API key for {id}:"))
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    config.upsert_provider_api_key(id, api_key.trim().to_string());
    config.save()?;

    println!("Saved {id} credentials to {}", Config::config_file_path()?.display());
    Ok(())
}

fn print_impact(result: &TrafficImpactResult) {
    let w = &result.weather;

    println!("{} - {}", w.city_name, w.description);
    println!("  Temperature: {}°F (feels like {}°F)", w.temperature_f, w.feels_like_f);
    println!("  Humidity:    {}%", w.humidity_pct);
    println!("  Wind:        {} mph", w.wind_speed_mph);
    println!("  Visibility:  {} mi", w.visibility_miles);

    match &result.air_quality {
        Some(air) => println!(
            "  Air quality: AQI {} (PM2.5 {}, PM10 {})",
            air.aqi, air.pm25, air.pm10
        ),
        None => println!("  Air quality: unavailable"),
    }

    println!(
        "Traffic impact: {} (level {})",
        result.traffic_impact.description, result.traffic_impact.level
    );
}
