use std::env;
use std::time::Duration;

use config::{Config, Environment};
use serde::Deserialize;
use stackql_agent::agent::DEFAULT_MAX_ITERATIONS;
use stackql_agent::mcp::{McpClient, TransportResult, DEFAULT_MCP_URL, LIST_TIMEOUT, TOOL_TIMEOUT};
use stackql_agent::providers::configs::{
    OpenAiProviderConfig, DEFAULT_OPENAI_HOST, DEFAULT_OPENAI_MODEL, DEFAULT_REQUEST_TIMEOUT,
};

use crate::error::{to_env_var, ConfigError, ENV_PREFIX};

/// Unprefixed variables accepted for compatibility, with the key each one sets
const PLAIN_ENV_VARS: [(&str, &str); 4] = [
    ("OPENAI_API_KEY", "provider.api_key"),
    ("OPENAI_MODEL", "provider.model"),
    ("OPENAI_API_HOST", "provider.host"),
    ("STACKQL_MCP_URL", "mcp.url"),
];

#[derive(Debug, Deserialize)]
pub struct ProviderSettings {
    pub host: String,
    #[serde(default)]
    pub api_key: Option<String>,
    pub model: String,
    #[serde(default)]
    pub temperature: Option<f32>,
    #[serde(default)]
    pub max_tokens: Option<i32>,
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize)]
pub struct McpSettings {
    pub url: String,
    pub tool_timeout_secs: u64,
    pub list_timeout_secs: u64,
}

#[derive(Debug, Deserialize)]
pub struct AgentSettings {
    pub max_iterations: usize,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub provider: ProviderSettings,
    pub mcp: McpSettings,
    pub agent: AgentSettings,
}

/// Values given on the command line, which beat every other source
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub mcp_url: Option<String>,
    pub max_iterations: Option<usize>,
}

impl Settings {
    /// Layer defaults, `STACKQL_AGENT_*` variables, the plain variables and the command line
    pub fn load(overrides: &Overrides) -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .set_default("provider.host", DEFAULT_OPENAI_HOST)?
            .set_default("provider.model", DEFAULT_OPENAI_MODEL)?
            .set_default("provider.timeout_secs", DEFAULT_REQUEST_TIMEOUT.as_secs())?
            .set_default("mcp.url", DEFAULT_MCP_URL)?
            .set_default("mcp.tool_timeout_secs", TOOL_TIMEOUT.as_secs())?
            .set_default("mcp.list_timeout_secs", LIST_TIMEOUT.as_secs())?
            .set_default("agent.max_iterations", DEFAULT_MAX_ITERATIONS as u64)?
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        for (var, key) in PLAIN_ENV_VARS {
            builder = builder.set_override_option(key, env::var(var).ok())?;
        }

        builder = builder
            .set_override_option("provider.api_key", overrides.api_key.clone())?
            .set_override_option("provider.model", overrides.model.clone())?
            .set_override_option("mcp.url", overrides.mcp_url.clone())?
            .set_override_option(
                "agent.max_iterations",
                overrides.max_iterations.map(|n| n as u64),
            )?;

        let settings: Settings = builder.build()?.try_deserialize().map_err(|err| {
            tracing::debug!("Configuration error: {:?}", &err);
            match &err {
                config::ConfigError::NotFound(field) => ConfigError::MissingEnvVar {
                    env_var: to_env_var(field),
                },
                _ => ConfigError::Other(err),
            }
        })?;
        Ok(settings)
    }

    /// The OpenAI configuration, which needs an api key
    pub fn provider_config(&self) -> Result<OpenAiProviderConfig, ConfigError> {
        let api_key = self
            .provider
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar {
                env_var: "OPENAI_API_KEY".to_string(),
            })?;

        Ok(OpenAiProviderConfig {
            host: self.provider.host.clone(),
            api_key,
            model: self.provider.model.clone(),
            temperature: self.provider.temperature,
            max_tokens: self.provider.max_tokens,
            timeout: Duration::from_secs(self.provider.timeout_secs),
        })
    }

    pub fn mcp_client(&self) -> TransportResult<McpClient> {
        Ok(McpClient::new(self.mcp.url.as_str())?.with_timeouts(
            Duration::from_secs(self.mcp.tool_timeout_secs),
            Duration::from_secs(self.mcp.list_timeout_secs),
        ))
    }
}
