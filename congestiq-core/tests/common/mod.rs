#![allow(dead_code)]

use congestiq_core::{Config, ProviderId};
use serde_json::{Value, json};
use wiremock::MockServer;

/// Config pointing both providers at local mock servers.
pub fn config_for(weather: Option<&MockServer>, chat: Option<&MockServer>) -> Config {
    let mut cfg = Config::default();
    cfg.request_timeout_secs = 5;

    if let Some(server) = weather {
        cfg.upsert_provider_api_key(ProviderId::OpenWeather, "weather-key".to_string());
        cfg.set_provider_base_url(ProviderId::OpenWeather, server.uri()).unwrap();
    }

    if let Some(server) = chat {
        cfg.upsert_provider_api_key(ProviderId::AiGateway, "gateway-key".to_string());
        cfg.set_provider_base_url(ProviderId::AiGateway, server.uri()).unwrap();
    }

    cfg
}

pub fn current_weather_body(code: i64) -> Value {
    json!({
        "coord": {"lon": -122.4194, "lat": 37.7749},
        "weather": [{
            "id": code,
            "main": "Rain",
            "description": "heavy intensity rain",
            "icon": "10d"
        }],
        "main": {"temp": 57.6, "feels_like": 56.4, "humidity": 93},
        "visibility": 3219,
        "wind": {"speed": 14.2},
        "name": "San Francisco"
    })
}

pub fn air_pollution_body() -> Value {
    json!({
        "coord": {"lon": -122.4194, "lat": 37.7749},
        "list": [{
            "main": {"aqi": 2},
            "components": {"pm2_5": 8.4, "pm10": 12.9}
        }]
    })
}

pub fn completion_body(content: Value) -> Value {
    json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "created": 1,
        "model": "google/gemini-2.5-flash",
        "choices": [
            {
                "index": 0,
                "message": {"role": "assistant", "content": content},
                "finish_reason": "stop"
            }
        ]
    })
}
