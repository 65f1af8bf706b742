//! HTTP surface for the two services.
//!
//! Every response is JSON, including failures and panics. Request bodies are
//! read as bytes and parsed here so a malformed body still gets the error shape.

use std::sync::Arc;

use axum::{
    Json, Router,
    body::{Body, Bytes},
    extract::State,
    http::{HeaderName, Response, StatusCode, header},
    response::IntoResponse,
    routing::{get, post},
};
use serde::Serialize;
use serde_json::json;
use tokio::net::TcpListener;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    Config,
    error::CoreError,
    model::{ChatRequest, ChatResponse, WeatherRequest},
    service::{AssistantContextBuilder, WeatherImpactService},
};

pub const WEATHER_ROUTE: &str = "/functions/v1/get-weather";
pub const CHAT_ROUTE: &str = "/functions/v1/ai-chat";
pub const HEALTH_ROUTE: &str = "/health";

/// Services built once at startup. `None` means the credential was missing.
#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub weather: Option<Arc<WeatherImpactService>>,
    pub assistant: Option<Arc<AssistantContextBuilder>>,
}

impl AppState {
    pub fn new(
        weather: Option<WeatherImpactService>,
        assistant: Option<AssistantContextBuilder>,
    ) -> Self {
        Self {
            weather: weather.map(Arc::new),
            assistant: assistant.map(Arc::new),
        }
    }

    /// Build whatever the config allows, warning about the rest.
    pub fn from_config(config: &Config) -> Self {
        let weather = WeatherImpactService::from_config(config)
            .inspect_err(|e| tracing::warn!("Weather endpoint disabled: {e}"))
            .ok();

        let assistant = AssistantContextBuilder::from_config(config)
            .inspect_err(|e| tracing::warn!("Assistant endpoint disabled: {e}"))
            .ok();

        Self::new(weather, assistant)
    }
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers([
            header::AUTHORIZATION,
            HeaderName::from_static("x-client-info"),
            HeaderName::from_static("apikey"),
            header::CONTENT_TYPE,
        ]);

    Router::new()
        .route(WEATHER_ROUTE, post(get_weather))
        .route(CHAT_ROUTE, post(ai_chat))
        .route(HEALTH_ROUTE, get(health))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve until Ctrl+C / SIGTERM.
pub async fn serve(config: &Config) -> anyhow::Result<()> {
    let state = AppState::from_config(config);
    let app = create_router(state);

    let addr = config.server.addr();
    let listener = TcpListener::bind(&addr).await?;

    tracing::info!("CongestiQ starting on http://{}", addr);
    tracing::info!("  Weather impact: POST http://{}{}", addr, WEATHER_ROUTE);
    tracing::info!("  Assistant:      POST http://{}{}", addr, CHAT_ROUTE);

    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

#[derive(Debug, Serialize)]
struct HealthData {
    status: &'static str,
    version: &'static str,
    weather: bool,
    chat: bool,
}

async fn health(State(state): State<AppState>) -> Json<HealthData> {
    Json(HealthData {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        weather: state.weather.is_some(),
        chat: state.assistant.is_some(),
    })
}

async fn get_weather(State(state): State<AppState>, body: Bytes) -> Response<Body> {
    let outcome = async {
        let service = state.weather.as_ref().ok_or_else(|| {
            CoreError::Configuration("OpenWeather API key not configured".to_string())
        })?;

        let request: WeatherRequest = parse_body(&body)?;
        let (lat, lon) = request.coordinates()?;

        service.assess_conditions(lat, lon).await
    }
    .await;

    match outcome {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(err) => {
            let message = match &err {
                CoreError::InvalidInput(msg) => msg.clone(),
                CoreError::Configuration(_) => "OpenWeather API key not configured".to_string(),
                CoreError::UpstreamFetch(_) | CoreError::Internal(_) => {
                    "Failed to fetch weather data".to_string()
                }
            };
            tracing::error!("Weather request failed: {err}");
            (err.status(), Json(json!({ "error": message }))).into_response()
        }
    }
}

async fn ai_chat(State(state): State<AppState>, body: Bytes) -> Response<Body> {
    let outcome = async {
        let assistant = state.assistant.as_ref().ok_or_else(|| {
            CoreError::Configuration("AI gateway API key not configured".to_string())
        })?;

        let request: ChatRequest = parse_body(&body)?;

        tracing::info!(
            message_count = request.messages.len(),
            has_weather = request.weather_context.is_some(),
            has_location = request.location_context.is_some(),
            user = %redact_user_id(request.user_id.as_deref()),
            "AI chat request"
        );

        assistant
            .generate_reply(
                &request.messages,
                request.weather_context.as_ref(),
                request.location_context.as_ref(),
            )
            .await
    }
    .await;

    match outcome {
        Ok(message) => (
            StatusCode::OK,
            Json(ChatResponse {
                message,
                success: true,
            }),
        )
            .into_response(),
        Err(err) => {
            let message = match &err {
                CoreError::InvalidInput(msg) => msg.clone(),
                CoreError::Configuration(_) => "AI gateway API key not configured".to_string(),
                CoreError::UpstreamFetch(_) => {
                    "The assistant is temporarily unavailable. Please try again.".to_string()
                }
                CoreError::Internal(_) => "Unknown error occurred".to_string(),
            };
            tracing::error!("AI chat error: {err}");
            // The chat contract has a single failure status.
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": message, "success": false })),
            )
                .into_response()
        }
    }
}

fn parse_body<T: serde::de::DeserializeOwned>(body: &[u8]) -> Result<T, CoreError> {
    serde_json::from_slice(body)
        .map_err(|e| CoreError::InvalidInput(format!("Invalid request body: {e}")))
}

fn redact_user_id(user_id: Option<&str>) -> String {
    match user_id {
        Some(id) => format!("{}...", id.chars().take(8).collect::<String>()),
        None => "anonymous".to_string(),
    }
}

fn handle_panic(_err: Box<dyn std::any::Any + Send + 'static>) -> Response<Body> {
    tracing::error!("Handler panicked");
    (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": "Internal server error" })))
        .into_response()
}
