use thiserror::Error;

pub const ENV_PREFIX: &str = "STACKQL_AGENT";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable: {env_var}")]
    MissingEnvVar { env_var: String },

    #[error("Invalid configuration: {0}")]
    Other(#[from] config::ConfigError),
}

/// The prefixed environment variable that sets a dotted config key
pub fn to_env_var(field_path: &str) -> String {
    format!(
        "{}_{}",
        ENV_PREFIX,
        field_path.replace('.', "__").to_uppercase()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_env_var() {
        assert_eq!(to_env_var("provider.api_key"), "STACKQL_AGENT_PROVIDER__API_KEY");
        assert_eq!(to_env_var("mcp.url"), "STACKQL_AGENT_MCP__URL");
    }

    #[test]
    fn test_missing_env_var_message() {
        let err = ConfigError::MissingEnvVar {
            env_var: "OPENAI_API_KEY".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Missing required environment variable: OPENAI_API_KEY"
        );
    }
}
