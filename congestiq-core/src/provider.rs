use crate::{
    Config, ConversationMessage,
    error::{CoreError, CoreResult},
    provider::{chat_gateway::ChatGatewayProvider, openweather::OpenWeatherProvider},
};
use async_trait::async_trait;
use reqwest::Client;
use std::{convert::TryFrom, fmt::Debug, sync::Arc, time::Duration};

pub mod chat_gateway;
pub mod openweather;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderId {
    OpenWeather,
    AiGateway,
}

impl ProviderId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::OpenWeather => "openweather",
            ProviderId::AiGateway => "ai-gateway",
        }
    }

    /// Environment variable that overrides this provider's API key.
    pub fn api_key_env_var(&self) -> &'static str {
        match self {
            ProviderId::OpenWeather => "OPENWEATHER_API_KEY",
            ProviderId::AiGateway => "AI_GATEWAY_API_KEY",
        }
    }

    pub const fn all() -> &'static [ProviderId] {
        &[ProviderId::OpenWeather, ProviderId::AiGateway]
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ProviderId {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        match lower.as_str() {
            "openweather" => Ok(ProviderId::OpenWeather),
            "ai-gateway" | "aigateway" => Ok(ProviderId::AiGateway),
            _ => Err(anyhow::anyhow!(
                "Unknown provider '{value}'. Supported providers: openweather, ai-gateway."
            )),
        }
    }
}

/// Raw current-conditions reading. Every field is optional; defaults are
/// applied by the service, not the provider.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeatherReading {
    pub temperature: Option<f64>,
    pub feels_like: Option<f64>,
    pub humidity: Option<u8>,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub condition_code: Option<i64>,
    pub wind_speed: Option<f64>,
    pub visibility_meters: Option<f64>,
    pub city: Option<String>,
}

/// First air-pollution sample reported for a coordinate.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AirQualityReading {
    pub aqi: Option<u8>,
    pub pm2_5: Option<f64>,
    pub pm10: Option<f64>,
}

#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// Current conditions in imperial units.
    async fn current_weather(&self, lat: f64, lon: f64) -> anyhow::Result<WeatherReading>;

    /// `Ok(None)` when the provider answered but had no sample.
    async fn air_quality(&self, lat: f64, lon: f64) -> anyhow::Result<Option<AirQualityReading>>;
}

#[async_trait]
pub trait ChatProvider: Send + Sync + Debug {
    /// Send the full message list and return the first choice's content, if any.
    async fn complete(&self, messages: &[ConversationMessage]) -> anyhow::Result<Option<String>>;
}

pub(crate) fn http_client(timeout: Duration) -> anyhow::Result<Client> {
    use anyhow::Context;

    Client::builder().timeout(timeout).build().context("Failed to build HTTP client")
}

fn require_api_key(id: ProviderId, config: &Config) -> CoreResult<&str> {
    config.provider_api_key(id).ok_or_else(|| {
        CoreError::Configuration(format!(
            "No API key configured for provider '{id}'.\n\
             Hint: set {} or run `congestiq configure {id}`.",
            id.api_key_env_var()
        ))
    })
}

/// Construct the weather provider from config. Fails before any network call
/// when the key is missing.
pub fn weather_provider_from_config(
    config: &Config,
) -> CoreResult<Arc<dyn WeatherProvider>> {
    let id = ProviderId::OpenWeather;
    let api_key = require_api_key(id, config)?;

    let provider = OpenWeatherProvider::new(
        api_key.to_owned(),
        config.provider_base_url(id).map(str::to_owned),
        config.request_timeout(),
    )
    .map_err(|e| CoreError::Internal(format!("{e:#}")))?;

    Ok(Arc::new(provider))
}

pub fn chat_provider_from_config(config: &Config) -> CoreResult<Arc<dyn ChatProvider>> {
    let id = ProviderId::AiGateway;
    let api_key = require_api_key(id, config)?;

    let provider = ChatGatewayProvider::new(
        api_key.to_owned(),
        config.chat.model.clone(),
        config.provider_base_url(id).map(str::to_owned),
        config.request_timeout(),
    )
    .map_err(|e| CoreError::Internal(format!("{e:#}")))?;

    Ok(Arc::new(provider))
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &body[..end])
    } else {
        body.to_string()
    }
}
