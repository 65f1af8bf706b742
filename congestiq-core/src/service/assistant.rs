use chrono::{Local, Timelike};
use std::sync::Arc;

use crate::{
    Config,
    error::{CoreError, CoreResult},
    model::{ConversationMessage, LocationContext, WeatherContext},
    prompt::{ChatContext, system_prompt},
    provider::{ChatProvider, chat_provider_from_config},
};

/// Reply used when the provider answers without any content.
pub const FALLBACK_REPLY: &str =
    "I apologize, but I could not generate a response. Please try again.";

/// Builds the contextual system prompt and forwards the conversation to the
/// chat provider.
#[derive(Debug, Clone)]
pub struct AssistantContextBuilder {
    provider: Arc<dyn ChatProvider>,
}

impl AssistantContextBuilder {
    pub fn new(provider: Arc<dyn ChatProvider>) -> Self {
        Self { provider }
    }

    pub fn from_config(config: &Config) -> CoreResult<Self> {
        Ok(Self::new(chat_provider_from_config(config)?))
    }

    /// Generate a reply using the server's local hour for the time-of-day band.
    pub async fn generate_reply(
        &self,
        history: &[ConversationMessage],
        weather: Option<&WeatherContext>,
        location: Option<&LocationContext>,
    ) -> CoreResult<String> {
        self.generate_reply_at(Local::now().hour(), history, weather, location).await
    }

    pub async fn generate_reply_at(
        &self,
        hour: u32,
        history: &[ConversationMessage],
        weather: Option<&WeatherContext>,
        location: Option<&LocationContext>,
    ) -> CoreResult<String> {
        let messages = build_messages(hour, history, weather, location);

        tracing::info!("Sending {} messages to the AI gateway", messages.len());

        let content = self.provider.complete(&messages).await.map_err(|e| {
            tracing::error!("AI gateway call failed: {e:#}");
            CoreError::UpstreamFetch("AI gateway request failed".to_string())
        })?;

        match content.filter(|c| !c.is_empty()) {
            Some(reply) => {
                tracing::info!("AI response generated successfully");
                Ok(reply)
            }
            None => {
                tracing::warn!("AI gateway returned no content, using fallback reply");
                Ok(FALLBACK_REPLY.to_string())
            }
        }
    }
}

/// The synthesized system message followed by `history` in its original order.
pub fn build_messages(
    hour: u32,
    history: &[ConversationMessage],
    weather: Option<&WeatherContext>,
    location: Option<&LocationContext>,
) -> Vec<ConversationMessage> {
    let context = ChatContext::new(weather.cloned(), location.cloned(), hour);

    let mut messages = Vec::with_capacity(history.len() + 1);
    messages.push(ConversationMessage::system(system_prompt(&context)));
    messages.extend_from_slice(history);
    messages
}
