mod common;

use congestiq_core::{CoreError, WeatherImpactService};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{air_pollution_body, config_for, current_weather_body};

#[tokio::test]
async fn heavy_rain_in_san_francisco() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .and(query_param("lat", "37.7749"))
        .and(query_param("lon", "-122.4194"))
        .and(query_param("units", "imperial"))
        .and(query_param("appid", "weather-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(current_weather_body(502)))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/air_pollution"))
        .and(query_param("appid", "weather-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(air_pollution_body()))
        .expect(1)
        .mount(&server)
        .await;

    let service = WeatherImpactService::from_config(&config_for(Some(&server), None)).unwrap();
    let result = service.assess_conditions(37.7749, -122.4194).await.unwrap();

    assert_eq!(result.traffic_impact.description, "Heavy - Rain");
    assert_eq!(result.traffic_impact.level, 2);
    assert_eq!(result.weather.temperature_f, 58);
    assert_eq!(result.weather.feels_like_f, 56);
    assert_eq!(result.weather.humidity_pct, 93);
    assert_eq!(result.weather.wind_speed_mph, 14);
    assert_eq!(result.weather.visibility_miles, 2);
    assert_eq!(result.weather.city_name, "San Francisco");
    assert_eq!(result.weather.icon, "10d");

    let air = result.air_quality.expect("air quality should be present");
    assert_eq!(air.aqi, 2);
    assert_eq!(air.pm25, 8.4);
    assert_eq!(air.pm10, 12.9);
}

#[tokio::test]
async fn weather_failure_does_not_fetch_air_quality() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/air_pollution"))
        .respond_with(ResponseTemplate::new(200).set_body_json(air_pollution_body()))
        .expect(0)
        .mount(&server)
        .await;

    let service = WeatherImpactService::from_config(&config_for(Some(&server), None)).unwrap();
    let err = service.assess_conditions(37.7749, -122.4194).await.unwrap_err();

    assert!(matches!(err, CoreError::UpstreamFetch(_)));
    assert!(!err.to_string().contains("upstream exploded"));
}

#[tokio::test]
async fn air_quality_failure_yields_null() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_json(current_weather_body(202)))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/air_pollution"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"cod": 401})))
        .mount(&server)
        .await;

    let service = WeatherImpactService::from_config(&config_for(Some(&server), None)).unwrap();
    let result = service.assess_conditions(29.76, -95.37).await.unwrap();

    assert!(result.air_quality.is_none());
    assert_eq!(result.traffic_impact.description, "Severe - Thunderstorm");
    assert_eq!(result.traffic_impact.level, 3);
}

#[tokio::test]
async fn sparse_provider_response_uses_defaults() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/air_pollution"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"list": [{}]})))
        .mount(&server)
        .await;

    let service = WeatherImpactService::from_config(&config_for(Some(&server), None)).unwrap();
    let result = service.assess_conditions(0.0, 0.0).await.unwrap();

    assert_eq!(result.weather.visibility_miles, 6);
    assert_eq!(result.weather.city_name, "Unknown");
    assert_eq!(result.weather.description, "Unknown");
    assert_eq!(result.weather.condition_code, 800);
    assert_eq!(result.traffic_impact.description, "None");
    assert_eq!(result.traffic_impact.level, 0);

    let air = result.air_quality.expect("empty sample still yields defaults");
    assert_eq!(air.aqi, 1);
    assert_eq!(air.pm25, 0.0);
}

#[tokio::test]
async fn empty_air_quality_list_yields_null() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_json(current_weather_body(701)))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/air_pollution"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"list": []})))
        .mount(&server)
        .await;

    let service = WeatherImpactService::from_config(&config_for(Some(&server), None)).unwrap();
    let result = service.assess_conditions(51.51, -0.13).await.unwrap();

    assert!(result.air_quality.is_none());
    assert_eq!(result.traffic_impact.description, "Moderate - Low Visibility");
}

#[tokio::test]
async fn repeated_requests_classify_identically() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_json(current_weather_body(311)))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/air_pollution"))
        .respond_with(ResponseTemplate::new(200).set_body_json(air_pollution_body()))
        .mount(&server)
        .await;

    let service = WeatherImpactService::from_config(&config_for(Some(&server), None)).unwrap();
    let first = service.assess_conditions(1.0, 2.0).await.unwrap();
    let second = service.assess_conditions(1.0, 2.0).await.unwrap();

    assert_eq!(
        serde_json::to_string(&first.traffic_impact).unwrap(),
        serde_json::to_string(&second.traffic_impact).unwrap()
    );
    assert_eq!(first.traffic_impact.description, "Light - Drizzle");
}

#[test]
fn missing_key_fails_before_any_request() {
    let err = WeatherImpactService::from_config(&config_for(None, None)).unwrap_err();
    assert!(matches!(err, CoreError::Configuration(_)));
}
