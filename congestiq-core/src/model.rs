use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Body of a traffic-impact request: `{ "lat": .., "lon": .. }`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WeatherRequest {
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
}

impl WeatherRequest {
    /// Both coordinates must be present. No range check is applied.
    pub fn coordinates(&self) -> Result<(f64, f64), CoreError> {
        match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => Ok((lat, lon)),
            _ => Err(CoreError::InvalidInput("Latitude and longitude are required".to_string())),
        }
    }
}

/// Current conditions at a coordinate, in imperial units.
///
/// Wire names follow what the dashboard widget reads (`temp`, `feels_like`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherObservation {
    #[serde(rename = "temp")]
    pub temperature_f: i64,
    #[serde(rename = "feels_like")]
    pub feels_like_f: i64,
    #[serde(rename = "humidity")]
    pub humidity_pct: u8,
    pub description: String,
    pub icon: String,
    #[serde(rename = "wind_speed")]
    pub wind_speed_mph: i64,
    #[serde(rename = "visibility")]
    pub visibility_miles: i64,
    #[serde(rename = "city")]
    pub city_name: String,
    pub condition_code: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirQualitySample {
    /// Provider ordinal scale, 1 (good) to 5 (very poor).
    pub aqi: u8,
    pub pm25: f64,
    pub pm10: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrafficImpactAssessment {
    pub description: String,
    pub level: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrafficImpactResult {
    pub weather: WeatherObservation,
    pub air_quality: Option<AirQualitySample>,
    pub traffic_impact: TrafficImpactAssessment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

/// One turn of dialogue. Order within a history is significant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationMessage {
    pub role: Role,
    pub content: String,
}

impl ConversationMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Weather facts the caller already has on screen.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeatherContext {
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub condition: Option<String>,
    #[serde(default)]
    pub humidity: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocationContext {
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lng: Option<f64>,
    #[serde(default)]
    pub address: Option<String>,
}

/// Body of an assistant request.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub messages: Vec<ConversationMessage>,
    #[serde(default)]
    pub weather_context: Option<WeatherContext>,
    #[serde(default)]
    pub location_context: Option<LocationContext>,
    #[serde(default)]
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub message: String,
    pub success: bool,
}
