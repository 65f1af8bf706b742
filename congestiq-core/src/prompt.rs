//! System prompt assembly for the traffic assistant.
//!
//! The prompt is an ordered list of fragments, each a pure function of one
//! optional input. Absent inputs contribute nothing; the rest are joined with
//! a blank line between them.

use crate::model::{LocationContext, WeatherContext};

const BASE_INSTRUCTIONS: &str = "You are CongestiQ AI, an intelligent traffic and navigation \
assistant. You provide real-time, helpful advice about:
- Traffic conditions and congestion
- Route optimization and alternatives
- Weather impacts on travel
- Estimated travel times
- Safety recommendations

You have access to real-time data and should provide specific, actionable advice.";

const CLOSING_INSTRUCTIONS: &str = "Always be conversational, specific, and helpful. If you \
    don't have specific data, provide general best-practice advice while being honest about \
    limitations.";

pub const RAIN_ADVISORY: &str = "Weather Alert: Rain is affecting visibility and road \
    conditions. Advise longer following distances and reduced speeds.";
pub const SNOW_ADVISORY: &str = "Weather Alert: Snow conditions present. Recommend extreme \
    caution and allow extra travel time.";
pub const FOG_ADVISORY: &str = "Weather Alert: Foggy conditions reducing visibility. \
    Recommend using low beams and reduced speed.";

/// Traffic expectation derived from the wall-clock hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeOfDayBand {
    MorningRush,
    EveningRush,
    OffPeak,
    Moderate,
}

impl TimeOfDayBand {
    /// `hour` is 0-23; anything outside the named bands is moderate.
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            7..=9 => TimeOfDayBand::MorningRush,
            16..=19 => TimeOfDayBand::EveningRush,
            22..=23 | 0..=5 => TimeOfDayBand::OffPeak,
            _ => TimeOfDayBand::Moderate,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeOfDayBand::MorningRush => "morning-rush",
            TimeOfDayBand::EveningRush => "evening-rush",
            TimeOfDayBand::OffPeak => "off-peak",
            TimeOfDayBand::Moderate => "moderate",
        }
    }

    pub fn advisory(&self) -> &'static str {
        match self {
            TimeOfDayBand::MorningRush => {
                "Morning rush hour - expect heavy traffic on major routes."
            }
            TimeOfDayBand::EveningRush => {
                "Evening rush hour - congestion likely on highways and main arteries."
            }
            TimeOfDayBand::OffPeak => "Off-peak hours - light traffic expected.",
            TimeOfDayBand::Moderate => "Moderate traffic levels expected.",
        }
    }
}

impl std::fmt::Display for TimeOfDayBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Enrichment inputs for one assistant request.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatContext {
    pub weather: Option<WeatherContext>,
    pub location: Option<LocationContext>,
    pub time_of_day: TimeOfDayBand,
}

impl ChatContext {
    pub fn new(
        weather: Option<WeatherContext>,
        location: Option<LocationContext>,
        hour: u32,
    ) -> Self {
        Self {
            weather,
            location,
            time_of_day: TimeOfDayBand::from_hour(hour),
        }
    }
}

/// At most one advisory fires: rain, then snow, then fog.
pub fn weather_advisory(condition: &str) -> Option<&'static str> {
    let lower = condition.to_lowercase();

    if lower.contains("rain") {
        Some(RAIN_ADVISORY)
    } else if lower.contains("snow") {
        Some(SNOW_ADVISORY)
    } else if lower.contains("fog") {
        Some(FOG_ADVISORY)
    } else {
        None
    }
}

pub fn weather_fragment(weather: &WeatherContext) -> String {
    let temperature = display_or_unknown(weather.temperature.map(|t| format!("{t}°F")));
    let condition = display_or_unknown(weather.condition.clone());
    let humidity = display_or_unknown(weather.humidity.map(|h| format!("{h}%")));

    let mut fragment = format!(
        "Current Weather Conditions:\n\
         - Temperature: {temperature}\n\
         - Condition: {condition}\n\
         - Humidity: {humidity}"
    );

    if let Some(advisory) = weather.condition.as_deref().and_then(weather_advisory) {
        fragment.push('\n');
        fragment.push_str(advisory);
    }

    fragment
}

pub fn location_fragment(location: &LocationContext) -> String {
    let place = match (location.address.as_deref(), location.lat, location.lng) {
        (Some(address), _, _) if !address.trim().is_empty() => address.to_string(),
        (_, Some(lat), Some(lng)) => format!("{lat}, {lng}"),
        _ => "Unknown".to_string(),
    };

    format!("User Location: {place}")
}

pub fn time_of_day_fragment(band: TimeOfDayBand) -> String {
    format!("Current Time Context: {}", band.advisory())
}

pub fn system_prompt(context: &ChatContext) -> String {
    let fragments = [
        Some(BASE_INSTRUCTIONS.to_string()),
        context.weather.as_ref().map(weather_fragment),
        context.location.as_ref().map(location_fragment),
        Some(time_of_day_fragment(context.time_of_day)),
        Some(CLOSING_INSTRUCTIONS.to_string()),
    ];

    fragments.into_iter().flatten().collect::<Vec<_>>().join("\n\n")
}

fn display_or_unknown(value: Option<String>) -> String {
    value.unwrap_or_else(|| "unknown".to_string())
}
