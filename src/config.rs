//! Configuration types.
//!
//! Everything is read from the environment once at startup. Parsing goes
//! through a lookup closure so tests can supply their own variables.

use std::str::FromStr;
use std::time::Duration;

use secrecy::SecretString;

use crate::error::ConfigError;
use crate::llm::{LlmBackend, LlmConfig};

pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_FRONTEND_URL: &str = "http://localhost:5173";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o";
pub const DEFAULT_ANTHROPIC_MODEL: &str = "claude-sonnet-4-20250514";
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_MAX_STOPS: usize = 10;

pub const DEFAULT_GEOCODE_URL: &str =
    "https://geocode-api.arcgis.com/arcgis/rest/services/World/GeocodeServer";
pub const DEFAULT_ROUTE_URL: &str =
    "https://route-api.arcgis.com/arcgis/rest/services/World/Route/NAServer/Route_World/solve";

/// ArcGIS endpoints and credentials.
#[derive(Debug, Clone)]
pub struct ArcGisSettings {
    /// Token for routing, geocoding and feature queries. `None` disables routing.
    pub api_key: Option<SecretString>,
    pub geocode_url: String,
    pub route_url: String,
    /// Feature service holding POIs. When unset, placeholder POIs are generated.
    pub poi_feature_url: Option<String>,
    /// Overall timeout applied to each outbound call.
    pub timeout: Duration,
}

impl Default for ArcGisSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            geocode_url: DEFAULT_GEOCODE_URL.to_string(),
            route_url: DEFAULT_ROUTE_URL.to_string(),
            poi_feature_url: None,
            timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        }
    }
}

/// Tour agent tuning.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Sampling temperature for both intent and narrative calls.
    pub temperature: f32,
    /// Use the model's JSON intent instead of the static default.
    pub honor_model_intent: bool,
    /// Upper bound for a model-supplied stop count.
    pub max_stops: usize,
    /// Overall bound on each model call.
    pub llm_timeout: Duration,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            temperature: DEFAULT_TEMPERATURE,
            honor_model_intent: false,
            max_stops: DEFAULT_MAX_STOPS,
            llm_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        }
    }
}

/// Full service configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub frontend_url: String,
    pub llm: LlmConfig,
    pub arcgis: ArcGisSettings,
    pub agent: AgentConfig,
}

impl AppConfig {
    /// Build config from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = parse_or(&get, "APP_PORT", DEFAULT_PORT)?;
        let frontend_url =
            get("FRONTEND_URL").unwrap_or_else(|| DEFAULT_FRONTEND_URL.to_string());

        let backend: LlmBackend =
            parse_or(&get, "GEO_EXPLORE_LLM_BACKEND", LlmBackend::default())?;
        let key_var = backend.api_key_var();
        let api_key = get(key_var).ok_or_else(|| ConfigError::MissingEnvVar(key_var.to_string()))?;
        let model = get("GEO_EXPLORE_MODEL").unwrap_or_else(|| backend.default_model().to_string());

        let timeout_secs = parse_or(&get, "GEO_EXPLORE_HTTP_TIMEOUT_SECS", DEFAULT_HTTP_TIMEOUT_SECS)?;
        if timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "GEO_EXPLORE_HTTP_TIMEOUT_SECS".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        let timeout = Duration::from_secs(timeout_secs);

        let arcgis = ArcGisSettings {
            api_key: get("ARCGIS_API_KEY").map(SecretString::from),
            geocode_url: get("ARCGIS_GEOCODE_URL")
                .unwrap_or_else(|| DEFAULT_GEOCODE_URL.to_string()),
            route_url: get("ARCGIS_ROUTE_URL").unwrap_or_else(|| DEFAULT_ROUTE_URL.to_string()),
            poi_feature_url: get("ARCGIS_POI_FEATURE_URL"),
            timeout,
        };

        let agent = AgentConfig {
            temperature: parse_or(&get, "GEO_EXPLORE_TEMPERATURE", DEFAULT_TEMPERATURE)?,
            honor_model_intent: parse_or(&get, "GEO_EXPLORE_HONOR_MODEL_INTENT", false)?,
            max_stops: parse_or(&get, "GEO_EXPLORE_MAX_STOPS", DEFAULT_MAX_STOPS)?,
            llm_timeout: timeout,
        };
        if agent.max_stops == 0 {
            return Err(ConfigError::InvalidValue {
                key: "GEO_EXPLORE_MAX_STOPS".to_string(),
                message: "must be at least 1".to_string(),
            });
        }

        Ok(Self {
            port,
            frontend_url,
            llm: LlmConfig {
                backend,
                api_key: SecretString::from(api_key),
                model,
            },
            arcgis,
            agent,
        })
    }
}

fn parse_or<T, G>(get: &G, key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        }),
    }
}
