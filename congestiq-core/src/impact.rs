//! Classification of provider weather condition codes into traffic-impact tiers.

use crate::model::TrafficImpactAssessment;

/// Code used when the provider reports no condition ("clear sky").
pub const CLEAR_CONDITION_CODE: i64 = 800;

/// Visibility assumed when the provider omits it, in meters.
pub const DEFAULT_VISIBILITY_METERS: f64 = 10_000.0;

pub const METERS_PER_MILE: f64 = 1609.34;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImpactTier {
    None,
    Drizzle,
    ModerateRain,
    HeavyRain,
    Thunderstorm,
    Snow,
    LowVisibility,
}

impl ImpactTier {
    pub fn description(&self) -> &'static str {
        match self {
            ImpactTier::None => "None",
            ImpactTier::Drizzle => "Light - Drizzle",
            ImpactTier::ModerateRain => "Moderate - Rain",
            ImpactTier::HeavyRain => "Heavy - Rain",
            ImpactTier::Thunderstorm => "Severe - Thunderstorm",
            ImpactTier::Snow => "Severe - Snow",
            ImpactTier::LowVisibility => "Moderate - Low Visibility",
        }
    }

    /// Ordinal severity, 0 (none) to 3 (severe).
    pub fn level(&self) -> u8 {
        match self {
            ImpactTier::None => 0,
            ImpactTier::Drizzle | ImpactTier::ModerateRain => 1,
            ImpactTier::HeavyRain | ImpactTier::LowVisibility => 2,
            ImpactTier::Thunderstorm | ImpactTier::Snow => 3,
        }
    }

    pub const fn all() -> &'static [ImpactTier] {
        &[
            ImpactTier::None,
            ImpactTier::Drizzle,
            ImpactTier::ModerateRain,
            ImpactTier::HeavyRain,
            ImpactTier::Thunderstorm,
            ImpactTier::Snow,
            ImpactTier::LowVisibility,
        ]
    }
}

impl std::fmt::Display for ImpactTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.description())
    }
}

impl From<ImpactTier> for TrafficImpactAssessment {
    fn from(tier: ImpactTier) -> Self {
        TrafficImpactAssessment {
            description: tier.description().to_string(),
            level: tier.level(),
        }
    }
}

/// Map a condition code to its tier. Ranges are half-open; rain splits at 502.
pub fn classify_impact(code: i64) -> ImpactTier {
    match code {
        200..300 => ImpactTier::Thunderstorm,
        300..400 => ImpactTier::Drizzle,
        500..502 => ImpactTier::ModerateRain,
        502..600 => ImpactTier::HeavyRain,
        600..700 => ImpactTier::Snow,
        700..800 => ImpactTier::LowVisibility,
        _ => ImpactTier::None,
    }
}

pub fn meters_to_miles(meters: f64) -> i64 {
    (meters / METERS_PER_MILE).round() as i64
}
