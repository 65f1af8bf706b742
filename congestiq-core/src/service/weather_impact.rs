use std::sync::Arc;

use crate::{
    Config,
    error::{CoreError, CoreResult},
    impact::{CLEAR_CONDITION_CODE, DEFAULT_VISIBILITY_METERS, classify_impact, meters_to_miles},
    model::{AirQualitySample, TrafficImpactAssessment, TrafficImpactResult, WeatherObservation},
    provider::{AirQualityReading, WeatherProvider, WeatherReading, weather_provider_from_config},
};

#[derive(Debug, Clone)]
pub struct WeatherImpactService {
    provider: Arc<dyn WeatherProvider>,
}

impl WeatherImpactService {
    pub fn new(provider: Arc<dyn WeatherProvider>) -> Self {
        Self { provider }
    }

    pub fn from_config(config: &Config) -> CoreResult<Self> {
        Ok(Self::new(weather_provider_from_config(config)?))
    }

    /// Fetch conditions at a coordinate and classify their traffic impact.
    ///
    /// The weather fetch must succeed; the air-quality fetch is only attempted
    /// afterwards and degrades to `None` on any failure.
    pub async fn assess_conditions(
        &self,
        lat: f64,
        lon: f64,
    ) -> CoreResult<TrafficImpactResult> {
        let reading = self.provider.current_weather(lat, lon).await.map_err(|e| {
            tracing::error!(lat, lon, "Weather fetch failed: {e:#}");
            CoreError::UpstreamFetch("Failed to fetch weather data".to_string())
        })?;

        let air_quality = match self.provider.air_quality(lat, lon).await {
            Ok(sample) => sample.map(air_quality_from_reading),
            Err(e) => {
                tracing::warn!(lat, lon, "Air quality unavailable, continuing without it: {e:#}");
                None
            }
        };

        let weather = observation_from_reading(reading);
        let traffic_impact = TrafficImpactAssessment::from(classify_impact(weather.condition_code));

        tracing::debug!(
            code = weather.condition_code,
            level = traffic_impact.level,
            "Classified traffic impact"
        );

        Ok(TrafficImpactResult {
            weather,
            air_quality,
            traffic_impact,
        })
    }
}

/// Apply defaults and unit conversion. Missing visibility defaults to
/// 10 000 m before conversion, so it reports as 6 mi.
pub fn observation_from_reading(reading: WeatherReading) -> WeatherObservation {
    WeatherObservation {
        temperature_f: reading.temperature.unwrap_or(0.0).round() as i64,
        feels_like_f: reading.feels_like.unwrap_or(0.0).round() as i64,
        humidity_pct: reading.humidity.unwrap_or(0),
        description: reading.description.unwrap_or_else(|| "Unknown".to_string()),
        icon: reading.icon.unwrap_or_else(|| "01d".to_string()),
        wind_speed_mph: reading.wind_speed.unwrap_or(0.0).round() as i64,
        visibility_miles: meters_to_miles(
            reading.visibility_meters.unwrap_or(DEFAULT_VISIBILITY_METERS),
        ),
        city_name: reading.city.unwrap_or_else(|| "Unknown".to_string()),
        condition_code: reading.condition_code.unwrap_or(CLEAR_CONDITION_CODE),
    }
}

pub fn air_quality_from_reading(reading: AirQualityReading) -> AirQualitySample {
    AirQualitySample {
        aqi: reading.aqi.unwrap_or(1),
        pm25: reading.pm2_5.unwrap_or(0.0),
        pm10: reading.pm10.unwrap_or(0.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Default)]
    struct StubProvider {
        weather: Option<WeatherReading>,
        air: Option<AirQualityReading>,
        air_fails: bool,
        air_calls: AtomicUsize,
    }

    #[async_trait]
    impl WeatherProvider for StubProvider {
        async fn current_weather(&self, _lat: f64, _lon: f64) -> anyhow::Result<WeatherReading> {
            self.weather.clone().ok_or_else(|| anyhow!("status 500: boom"))
        }

        async fn air_quality(
            &self,
            _lat: f64,
            _lon: f64,
        ) -> anyhow::Result<Option<AirQualityReading>> {
            self.air_calls.fetch_add(1, Ordering::SeqCst);
            if self.air_fails { Err(anyhow!("status 401")) } else { Ok(self.air.clone()) }
        }
    }

    #[test]
    fn defaults_for_empty_reading() {
        let obs = observation_from_reading(WeatherReading::default());

        assert_eq!(obs.temperature_f, 0);
        assert_eq!(obs.feels_like_f, 0);
        assert_eq!(obs.humidity_pct, 0);
        assert_eq!(obs.description, "Unknown");
        assert_eq!(obs.icon, "01d");
        assert_eq!(obs.visibility_miles, 6);
        assert_eq!(obs.city_name, "Unknown");
        assert_eq!(obs.condition_code, 800);
    }

    #[test]
    fn rounds_and_converts() {
        let obs = observation_from_reading(WeatherReading {
            temperature: Some(58.6),
            feels_like: Some(57.4),
            wind_speed: Some(12.5),
            visibility_meters: Some(1609.34),
            ..Default::default()
        });

        assert_eq!(obs.temperature_f, 59);
        assert_eq!(obs.feels_like_f, 57);
        assert_eq!(obs.wind_speed_mph, 13);
        assert_eq!(obs.visibility_miles, 1);
    }

    #[test]
    fn air_quality_defaults() {
        let sample = air_quality_from_reading(AirQualityReading::default());
        assert_eq!(
            sample,
            AirQualitySample {
                aqi: 1,
                pm25: 0.0,
                pm10: 0.0,
            }
        );
    }

    #[tokio::test]
    async fn weather_failure_skips_air_quality() {
        let provider = Arc::new(StubProvider::default());
        let service = WeatherImpactService::new(provider.clone());

        let err = service.assess_conditions(37.7749, -122.4194).await.unwrap_err();

        assert!(matches!(err, CoreError::UpstreamFetch(_)));
        assert!(!err.to_string().contains("boom"));
        assert_eq!(provider.air_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn air_quality_failure_degrades_to_none() {
        let provider = Arc::new(StubProvider {
            weather: Some(WeatherReading {
                condition_code: Some(611),
                ..Default::default()
            }),
            air_fails: true,
            ..Default::default()
        });
        let service = WeatherImpactService::new(provider.clone());

        let result = service.assess_conditions(40.0, -105.0).await.unwrap();

        assert!(result.air_quality.is_none());
        assert_eq!(result.traffic_impact.description, "Severe - Snow");
        assert_eq!(result.traffic_impact.level, 3);
        assert_eq!(provider.air_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn classification_ignores_other_fields() {
        let quiet = WeatherReading {
            condition_code: Some(741),
            ..Default::default()
        };
        let noisy = WeatherReading {
            condition_code: Some(741),
            temperature: Some(-12.0),
            description: Some("sunny, actually".into()),
            visibility_meters: Some(20_000.0),
            ..Default::default()
        };

        let mut levels = Vec::new();
        for reading in [quiet, noisy] {
            let service = WeatherImpactService::new(Arc::new(StubProvider {
                weather: Some(reading),
                ..Default::default()
            }));
            levels.push(service.assess_conditions(0.0, 0.0).await.unwrap().traffic_impact);
        }

        assert_eq!(levels[0], levels[1]);
        assert_eq!(levels[0].description, "Moderate - Low Visibility");
    }
}
