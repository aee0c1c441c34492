//! Bridges rig-core's `CompletionModel` to our `LlmProvider` trait.

use async_trait::async_trait;
use rig::completion::{AssistantContent, CompletionModel, Message};

use crate::error::LlmError;
use crate::llm::provider::{
    ChatMessage, CompletionRequest, CompletionResponse, LlmProvider, Role,
};

/// Adapter over any rig completion model.
pub struct RigAdapter<M> {
    model: M,
    model_name: String,
}

impl<M> RigAdapter<M> {
    pub fn new(model: M, model_name: &str) -> Self {
        Self {
            model,
            model_name: model_name.to_string(),
        }
    }
}

/// Messages rearranged into rig's preamble / history / prompt shape.
#[derive(Debug, PartialEq)]
struct SplitMessages {
    preamble: Option<String>,
    history: Vec<ChatMessage>,
    prompt: String,
}

/// System turns become the preamble; the final user turn is the prompt.
fn split_messages(messages: Vec<ChatMessage>) -> Result<SplitMessages, String> {
    let mut system = Vec::new();
    let mut rest = Vec::new();
    for message in messages {
        match message.role {
            Role::System => system.push(message.content),
            _ => rest.push(message),
        }
    }

    let prompt = match rest.pop() {
        Some(ChatMessage {
            role: Role::User,
            content,
        }) => content,
        Some(_) => return Err("last message must be a user turn".to_string()),
        None => return Err("request has no user message".to_string()),
    };

    Ok(SplitMessages {
        preamble: (!system.is_empty()).then(|| system.join("\n\n")),
        history: rest,
        prompt,
    })
}

fn to_rig_message(message: ChatMessage) -> Message {
    match message.role {
        Role::Assistant => Message::assistant(message.content),
        _ => Message::user(message.content),
    }
}

#[async_trait]
impl<M> LlmProvider for RigAdapter<M>
where
    M: CompletionModel + 'static,
{
    fn model_name(&self) -> &str {
        &self.model_name
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let split = split_messages(request.messages).map_err(|reason| LlmError::RequestFailed {
            provider: self.model_name.clone(),
            reason,
        })?;

        let history: Vec<Message> = split.history.into_iter().map(to_rig_message).collect();
        let mut builder = self
            .model
            .completion_request(Message::user(split.prompt))
            .messages(history);
        if let Some(preamble) = split.preamble {
            builder = builder.preamble(preamble);
        }
        if let Some(temperature) = request.temperature {
            builder = builder.temperature(f64::from(temperature));
        }
        if let Some(max_tokens) = request.max_tokens {
            builder = builder.max_tokens(u64::from(max_tokens));
        }

        let response = builder.send().await.map_err(|e| LlmError::RequestFailed {
            provider: self.model_name.clone(),
            reason: e.to_string(),
        })?;

        let content: String = response
            .choice
            .iter()
            .filter_map(|part| match part {
                AssistantContent::Text(text) => Some(text.text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("");

        if content.trim().is_empty() {
            return Err(LlmError::InvalidResponse {
                provider: self.model_name.clone(),
                reason: "response contained no text".to_string(),
            });
        }

        Ok(CompletionResponse {
            content,
            input_tokens: u32::try_from(response.usage.input_tokens).unwrap_or(u32::MAX),
            output_tokens: u32::try_from(response.usage.output_tokens).unwrap_or(u32::MAX),
        })
    }
}
