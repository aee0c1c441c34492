//! Narrative generator: one model call producing prose for the whole tour.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::info;

use crate::config::AgentConfig;
use crate::error::LlmError;
use crate::geo::model::Poi;
use crate::geo::route::Route;
use crate::llm::provider::{ChatMessage, CompletionRequest, LlmProvider};
use crate::tour::prompts::{TOUR_SYSTEM_PROMPT, build_narrative_user_prompt};

/// Max tokens for the narrative reply.
const NARRATIVE_MAX_TOKENS: u32 = 1500;

pub struct NarrativeGenerator {
    llm: Arc<dyn LlmProvider>,
    temperature: f32,
    timeout: Duration,
}

impl NarrativeGenerator {
    pub fn new(llm: Arc<dyn LlmProvider>, config: &AgentConfig) -> Self {
        Self {
            llm,
            temperature: config.temperature,
            timeout: config.llm_timeout,
        }
    }

    /// Errors propagate; there is no fallback narrative. A call that outlives
    /// the timeout is reported as a failed request.
    pub async fn generate(
        &self,
        pois: &[Poi],
        route: &Route,
        preferences: Option<&Value>,
    ) -> Result<String, LlmError> {
        let request = CompletionRequest::new(vec![
            ChatMessage::system(TOUR_SYSTEM_PROMPT),
            ChatMessage::user(build_narrative_user_prompt(pois, route, preferences)),
        ])
        .with_temperature(self.temperature)
        .with_max_tokens(NARRATIVE_MAX_TOKENS);

        let response = tokio::time::timeout(self.timeout, self.llm.complete(request))
            .await
            .map_err(|_| LlmError::RequestFailed {
                provider: self.llm.model_name().to_string(),
                reason: format!("timed out after {:?}", self.timeout),
            })??;

        info!(
            stops = pois.len(),
            model = self.llm.model_name(),
            output_tokens = response.output_tokens,
            "Generated tour narrative"
        );
        Ok(response.content)
    }
}
