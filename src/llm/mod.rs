//! Model access for the tour pipeline.
//!
//! The intent and narrative steps only see `LlmProvider`. The concrete
//! provider is a rig-core completion model for the configured backend,
//! wrapped in `RigAdapter`.

pub mod provider;
mod rig_adapter;

pub use provider::*;
pub use rig_adapter::RigAdapter;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use rig::client::CompletionClient;
use rig::completion::CompletionModel;
use secrecy::{ExposeSecret, SecretString};
use tracing::info;

use crate::config::{DEFAULT_ANTHROPIC_MODEL, DEFAULT_OPENAI_MODEL};
use crate::error::LlmError;

/// Hosted model backends the guide can run on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LlmBackend {
    #[default]
    OpenAi,
    Anthropic,
}

impl LlmBackend {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Anthropic => "anthropic",
        }
    }

    /// Environment variable holding this backend's API key.
    pub fn api_key_var(self) -> &'static str {
        match self {
            Self::OpenAi => "OPENAI_API_KEY",
            Self::Anthropic => "ANTHROPIC_API_KEY",
        }
    }

    pub fn default_model(self) -> &'static str {
        match self {
            Self::OpenAi => DEFAULT_OPENAI_MODEL,
            Self::Anthropic => DEFAULT_ANTHROPIC_MODEL,
        }
    }
}

impl fmt::Display for LlmBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LlmBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(Self::OpenAi),
            "anthropic" => Ok(Self::Anthropic),
            other => Err(format!(
                "unknown backend '{other}' (expected openai or anthropic)"
            )),
        }
    }
}

/// Backend, credentials and model name for the tour guide.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub backend: LlmBackend,
    pub api_key: SecretString,
    pub model: String,
}

/// Build the provider shared by the intent and narrative steps.
pub fn create_provider(config: &LlmConfig) -> Result<Arc<dyn LlmProvider>, LlmError> {
    let key = config.api_key.expose_secret();
    if key.trim().is_empty() {
        return Err(LlmError::AuthFailed {
            provider: config.backend.to_string(),
        });
    }

    let provider = match config.backend {
        LlmBackend::OpenAi => {
            use rig::providers::openai;

            let client: rig::client::Client<openai::client::OpenAIResponsesExt> =
                openai::Client::new(key).map_err(|e| client_error(config.backend, e))?;
            adapt(client.completion_model(&config.model), &config.model)
        }
        LlmBackend::Anthropic => {
            use rig::providers::anthropic;

            let client: rig::client::Client<anthropic::client::AnthropicExt> =
                anthropic::Client::new(key).map_err(|e| client_error(config.backend, e))?;
            adapt(client.completion_model(&config.model), &config.model)
        }
    };

    info!(backend = %config.backend, model = %config.model, "Tour guide model ready");
    Ok(provider)
}

fn adapt<M>(model: M, name: &str) -> Arc<dyn LlmProvider>
where
    M: CompletionModel + 'static,
{
    Arc::new(RigAdapter::new(model, name))
}

fn client_error(backend: LlmBackend, e: impl fmt::Display) -> LlmError {
    LlmError::RequestFailed {
        provider: backend.to_string(),
        reason: format!("Failed to create client: {e}"),
    }
}
