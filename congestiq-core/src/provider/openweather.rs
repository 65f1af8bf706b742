use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use super::{AirQualityReading, WeatherProvider, WeatherReading, http_client, truncate_body};

const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String, base_url: Option<String>, timeout: Duration) -> Result<Self> {
        let base_url = base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            api_key,
            base_url,
            http: http_client(timeout)?,
        })
    }

    /// GET `endpoint` with the API key appended. The request URL carries the
    /// key, so it is stripped from transport errors before they propagate.
    async fn get_json(&self, endpoint: &str, query: &[(&str, String)]) -> Result<String> {
        let url = format!("{}/{}", self.base_url, endpoint);

        let res = self
            .http
            .get(&url)
            .query(query)
            .query(&[("appid", self.api_key.as_str())])
            .send()
            .await
            .map_err(reqwest::Error::without_url)
            .with_context(|| format!("Failed to send request to OpenWeather ({endpoint})"))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(reqwest::Error::without_url)
            .with_context(|| format!("Failed to read OpenWeather {endpoint} response body"))?;

        if !status.is_success() {
            return Err(anyhow!(
                "OpenWeather {} request failed with status {}: {}",
                endpoint,
                status,
                truncate_body(&body),
            ));
        }

        Ok(body)
    }
}

#[derive(Debug, Default, Deserialize)]
struct OwMain {
    #[serde(default)]
    temp: Option<f64>,
    #[serde(default)]
    feels_like: Option<f64>,
    #[serde(default)]
    humidity: Option<u8>,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    #[serde(default)]
    id: Option<i64>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    icon: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct OwWind {
    #[serde(default)]
    speed: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    main: Option<OwMain>,
    #[serde(default)]
    weather: Option<Vec<OwWeather>>,
    #[serde(default)]
    wind: Option<OwWind>,
    #[serde(default)]
    visibility: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OwAirMain {
    #[serde(default)]
    aqi: Option<u8>,
}

#[derive(Debug, Deserialize)]
struct OwAirComponents {
    #[serde(default)]
    pm2_5: Option<f64>,
    #[serde(default)]
    pm10: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OwAirEntry {
    #[serde(default)]
    main: Option<OwAirMain>,
    #[serde(default)]
    components: Option<OwAirComponents>,
}

#[derive(Debug, Deserialize)]
struct OwAirResponse {
    #[serde(default)]
    list: Option<Vec<OwAirEntry>>,
}

impl From<OwCurrentResponse> for WeatherReading {
    fn from(parsed: OwCurrentResponse) -> Self {
        let main = parsed.main.unwrap_or_default();
        let primary = parsed.weather.and_then(|w| w.into_iter().next());
        let (condition_code, description, icon) = match primary {
            Some(w) => (w.id, w.description, w.icon),
            None => (None, None, None),
        };

        WeatherReading {
            temperature: main.temp,
            feels_like: main.feels_like,
            humidity: main.humidity,
            description,
            icon,
            condition_code,
            wind_speed: parsed.wind.unwrap_or_default().speed,
            visibility_meters: parsed.visibility,
            city: parsed.name,
        }
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn current_weather(&self, lat: f64, lon: f64) -> Result<WeatherReading> {
        let body = self
            .get_json(
                "weather",
                &[
                    ("lat", lat.to_string()),
                    ("lon", lon.to_string()),
                    ("units", "imperial".into()),
                ],
            )
            .await?;

        let parsed: OwCurrentResponse =
            serde_json::from_str(&body).context("Failed to parse OpenWeather current JSON")?;

        Ok(parsed.into())
    }

    async fn air_quality(&self, lat: f64, lon: f64) -> Result<Option<AirQualityReading>> {
        let body = self
            .get_json("air_pollution", &[("lat", lat.to_string()), ("lon", lon.to_string())])
            .await?;

        let parsed: OwAirResponse = serde_json::from_str(&body)
            .context("Failed to parse OpenWeather air pollution JSON")?;

        let sample = parsed.list.and_then(|list| list.into_iter().next()).map(|entry| {
            let (pm2_5, pm10) = match entry.components {
                Some(c) => (c.pm2_5, c.pm10),
                None => (None, None),
            };

            AirQualityReading {
                aqi: entry.main.and_then(|m| m.aqi),
                pm2_5,
                pm10,
            }
        });

        Ok(sample)
    }
}
