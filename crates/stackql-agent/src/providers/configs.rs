use std::time::Duration;

pub const DEFAULT_OPENAI_HOST: &str = "https://api.openai.com";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Clone)]
pub struct OpenAiProviderConfig {
    pub host: String,
    pub api_key: String,
    pub model: String,
    pub temperature: Option<f32>,
    pub max_tokens: Option<i32>,
    pub timeout: Duration,
}

impl OpenAiProviderConfig {
    /// Config against the public OpenAI endpoint with the default model
    pub fn new<S: Into<String>>(api_key: S) -> Self {
        Self {
            host: DEFAULT_OPENAI_HOST.to_string(),
            api_key: api_key.into(),
            model: DEFAULT_OPENAI_MODEL.to_string(),
            temperature: None,
            max_tokens: None,
            timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}
