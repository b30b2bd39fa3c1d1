use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use reqwest::StatusCode;
use serde_json::{json, Map, Value};
use tracing::{debug, warn};

use super::base::{ModelReply, Provider, Usage};
use super::configs::OpenAiProviderConfig;
use super::utils::{
    check_openai_context_length_error, openai_response_to_reply, openai_usage,
    tools_to_openai_spec, turns_to_openai_spec,
};
use crate::models::message::Turn;
use crate::models::tool::Tool;

pub struct OpenAiProvider {
    client: Client,
    config: OpenAiProviderConfig,
}

impl OpenAiProvider {
    pub fn new(config: OpenAiProviderConfig) -> Result<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;

        Ok(Self { client, config })
    }

    fn payload(&self, transcript: &[Turn], tools: &[Tool]) -> Result<Value> {
        let mut payload = Map::new();
        payload.insert("model".to_string(), json!(self.config.model));
        payload.insert(
            "messages".to_string(),
            json!(turns_to_openai_spec(transcript)),
        );

        if !tools.is_empty() {
            payload.insert("tools".to_string(), json!(tools_to_openai_spec(tools)?));
            payload.insert("tool_choice".to_string(), json!("auto"));
        }
        if let Some(temp) = self.config.temperature {
            payload.insert("temperature".to_string(), json!(temp));
        }
        if let Some(tokens) = self.config.max_tokens {
            payload.insert("max_tokens".to_string(), json!(tokens));
        }

        Ok(Value::Object(payload))
    }

    async fn post(&self, payload: Value) -> Result<Value> {
        let url = format!(
            "{}/v1/chat/completions",
            self.config.host.trim_end_matches('/')
        );

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::OK {
            return Ok(response.json().await?);
        }

        // error bodies are json on OpenAI, but a proxy in between may answer with anything
        let body = response.text().await.unwrap_or_default();
        let error = serde_json::from_str::<Value>(&body)
            .ok()
            .and_then(|value| value.get("error").cloned());
        if let Some(err) = error.as_ref().and_then(check_openai_context_length_error) {
            return Err(err.into());
        }

        warn!(status = status.as_u16(), "OpenAI request failed");
        match status {
            StatusCode::TOO_MANY_REQUESTS => Err(anyhow!("Rate limited by OpenAI: {}", status)),
            status if status.is_server_error() => Err(anyhow!("Server error: {}", status)),
            _ => Err(anyhow!(
                "Request failed: {}\n{}",
                status,
                error.map(|e| e.to_string()).unwrap_or(body)
            )),
        }
    }
}

#[async_trait]
impl Provider for OpenAiProvider {
    async fn complete(&self, transcript: &[Turn], tools: &[Tool]) -> Result<(ModelReply, Usage)> {
        let payload = self.payload(transcript, tools)?;
        debug!(
            model = %self.config.model,
            turns = transcript.len(),
            tools = tools.len(),
            "requesting chat completion"
        );

        let response = self.post(payload).await?;

        // Raise specific error if context length is exceeded
        if let Some(error) = response.get("error") {
            if let Some(err) = check_openai_context_length_error(error) {
                return Err(err.into());
            }
            return Err(anyhow!("OpenAI API error: {}", error));
        }

        let reply = openai_response_to_reply(&response)?;
        let usage = openai_usage(&response);
        debug!(
            tool_requests = reply.requests.len(),
            total_tokens = ?usage.total_tokens,
            "chat completion received"
        );

        Ok((reply, usage))
    }
}
