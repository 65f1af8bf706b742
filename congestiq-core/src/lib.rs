//! Core library for CongestiQ traffic intelligence.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - Weather condition to traffic-impact classification
//! - Prompt assembly for the traffic assistant
//! - Clients for the weather and chat-completion providers
//! - The HTTP surface exposing both services
//!
//! It is used by `congestiq-cli`, but can also be embedded in other binaries or services.

pub mod api;
pub mod config;
pub mod error;
pub mod impact;
pub mod model;
pub mod prompt;
pub mod provider;
pub mod service;

pub use config::{Config, ProviderConfig};
pub use error::{CoreError, CoreResult};
pub use impact::{ImpactTier, classify_impact};
pub use model::{
    AirQualitySample, ChatRequest, ChatResponse, ConversationMessage, LocationContext, Role,
    TrafficImpactAssessment, TrafficImpactResult, WeatherContext, WeatherObservation,
    WeatherRequest,
};
pub use provider::{ChatProvider, ProviderId, WeatherProvider};
pub use service::{AssistantContextBuilder, WeatherImpactService};
