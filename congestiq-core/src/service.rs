//! The two request-scoped services: weather impact assessment and the
//! traffic assistant. Neither keeps state between calls.

pub mod assistant;
pub mod weather_impact;

pub use assistant::AssistantContextBuilder;
pub use weather_impact::WeatherImpactService;
