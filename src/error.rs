//! Error types for GeoExplore.

/// Top-level error type for the service.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Geo service error: {0}")]
    Geo(#[from] GeoError),

    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// LLM provider errors.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("Provider {provider} request failed: {reason}")]
    RequestFailed { provider: String, reason: String },

    #[error("Invalid response from {provider}: {reason}")]
    InvalidResponse { provider: String, reason: String },

    #[error("Authentication failed for provider {provider}")]
    AuthFailed { provider: String },
}

/// Errors from the ArcGIS geocoding, feature and routing services.
#[derive(Debug, thiserror::Error)]
pub enum GeoError {
    #[error("Request to {service} failed: {reason}")]
    Request { service: String, reason: String },

    #[error("{service} returned HTTP {status}")]
    Status { service: String, status: u16 },

    #[error("Invalid response from {service}: {reason}")]
    InvalidResponse { service: String, reason: String },

    #[error("{service} reported error {code}: {message}")]
    Provider {
        service: String,
        code: i64,
        message: String,
    },
}

/// Errors the tour pipeline lets escape to the caller.
///
/// Every other step degrades in place, so narrative generation is the only
/// variant.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Narrative generation failed: {0}")]
    Narrative(#[from] LlmError),
}

/// Result type alias for the service.
pub type Result<T> = std::result::Result<T, Error>;
