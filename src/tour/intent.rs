//! Intent parser: turns a free-text request into an `Intent`.
//!
//! Parsing never fails the pipeline: a failed or timed-out model call, or
//! unusable output, yields `Intent::default()`. Whether the model's JSON is used at all is
//! controlled by `AgentConfig::honor_model_intent`; when it is off the
//! model reply is discarded and the default intent is returned.

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::AgentConfig;
use crate::llm::provider::{ChatMessage, CompletionRequest, LlmProvider};
use crate::tour::model::Intent;
use crate::tour::prompts::{INTENT_SYSTEM_PROMPT, build_intent_user_prompt};

/// Max tokens for the intent call (a small JSON object).
const INTENT_MAX_TOKENS: u32 = 256;

pub struct IntentParser {
    llm: Arc<dyn LlmProvider>,
    temperature: f32,
    honor_model_intent: bool,
    max_stops: usize,
    timeout: Duration,
}

impl IntentParser {
    pub fn new(llm: Arc<dyn LlmProvider>, config: &AgentConfig) -> Self {
        Self {
            llm,
            temperature: config.temperature,
            honor_model_intent: config.honor_model_intent,
            max_stops: config.max_stops.max(1),
            timeout: config.llm_timeout,
        }
    }

    /// Issue one model call and derive an intent from it.
    pub async fn parse(&self, message: &str, city: &str, preferences: Option<&Value>) -> Intent {
        let request = CompletionRequest::new(vec![
            ChatMessage::system(INTENT_SYSTEM_PROMPT),
            ChatMessage::user(build_intent_user_prompt(message, city, preferences)),
        ])
        .with_temperature(self.temperature)
        .with_max_tokens(INTENT_MAX_TOKENS);

        let intent = match tokio::time::timeout(self.timeout, self.llm.complete(request)).await {
            Ok(Ok(response)) => self.interpret(&response.content),
            Ok(Err(e)) => {
                warn!(error = %e, city, "Intent model call failed, using default intent");
                Intent::default()
            }
            Err(_) => {
                warn!(
                    timeout_ms = self.timeout.as_millis() as u64,
                    city, "Intent model call timed out, using default intent"
                );
                Intent::default()
            }
        };

        info!(
            tour_type = %intent.tour_type,
            categories = ?intent.categories,
            num_stops = intent.num_stops,
            "Parsed tour intent"
        );
        intent
    }

    /// Map raw model output to an intent.
    pub fn interpret(&self, raw: &str) -> Intent {
        if !self.honor_model_intent {
            debug!("Model intent disabled, using default intent");
            return Intent::default();
        }

        match parse_intent_json(raw, self.max_stops) {
            Some(intent) => intent,
            None => {
                warn!(response = raw, "Could not parse intent JSON, using default intent");
                Intent::default()
            }
        }
    }
}

/// Keys the intent prompt asks for. All optional; gaps take default values.
#[derive(Debug, Deserialize)]
struct RawIntent {
    tour_type: Option<String>,
    categories: Option<Vec<String>>,
    num_stops: Option<i64>,
    time_budget_min: Option<i64>,
    accessibility: Option<String>,
    transport_mode: Option<String>,
}

fn parse_intent_json(raw: &str, max_stops: usize) -> Option<Intent> {
    let json = extract_json_object(raw)?;
    let parsed: RawIntent = serde_json::from_str(json).ok()?;
    let defaults = Intent::default();

    let tour_type = parsed
        .tour_type
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .unwrap_or(defaults.tour_type);

    let categories: Vec<String> = parsed
        .categories
        .unwrap_or_default()
        .into_iter()
        .map(|c| c.trim().to_lowercase())
        .filter(|c| !c.is_empty())
        .collect();
    let categories = if categories.is_empty() {
        defaults.categories
    } else {
        categories
    };

    let num_stops = match parsed.num_stops {
        Some(n) => usize::try_from(n.max(1)).unwrap_or(1).min(max_stops),
        None => defaults.num_stops.min(max_stops),
    };

    Some(Intent {
        tour_type,
        categories,
        num_stops,
        time_budget_min: parsed
            .time_budget_min
            .filter(|m| *m > 0)
            .and_then(|m| u32::try_from(m).ok()),
        accessibility: non_empty(parsed.accessibility),
        transport_mode: non_empty(parsed.transport_mode).map(|m| m.to_lowercase()),
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Find a JSON object in model output that may be fenced or padded.
fn extract_json_object(text: &str) -> Option<&str> {
    let trimmed = text.trim();

    if trimmed.starts_with('{') && trimmed.ends_with('}') {
        return Some(trimmed);
    }

    if let Some(start) = trimmed.find("```") {
        let after = &trimmed[start + 3..];
        let after = after.strip_prefix("json").unwrap_or(after);
        if let Some(end) = after.find("```") {
            let inner = after[..end].trim();
            if inner.starts_with('{') {
                return Some(inner);
            }
        }
    }

    let start = trimmed.find('{')?;
    let end = trimmed.rfind('}')?;
    (end > start).then(|| &trimmed[start..=end])
}
