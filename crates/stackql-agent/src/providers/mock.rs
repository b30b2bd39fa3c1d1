use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::sync::Arc;
use std::sync::Mutex;

use crate::models::message::Turn;
use crate::models::tool::Tool;
use crate::providers::base::{ModelReply, Provider, Usage};

/// A mock provider that returns pre-configured replies and records what it was sent
#[derive(Clone, Default)]
pub struct MockProvider {
    responses: Arc<Mutex<Vec<Result<ModelReply, String>>>>,
    fallback: Option<ModelReply>,
    transcripts: Arc<Mutex<Vec<Vec<Turn>>>>,
}

impl MockProvider {
    /// Create a new mock provider with a sequence of replies
    pub fn new(responses: Vec<ModelReply>) -> Self {
        Self::with_results(responses.into_iter().map(Ok).collect())
    }

    /// Like `new`, but an `Err` makes the matching call fail with that message
    pub fn with_results(responses: Vec<Result<ModelReply, String>>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(responses)),
            ..Default::default()
        }
    }

    /// A provider that answers every call with the same reply
    pub fn repeating(reply: ModelReply) -> Self {
        Self {
            fallback: Some(reply),
            ..Default::default()
        }
    }

    /// Every transcript the provider has been called with, oldest first
    pub fn transcripts(&self) -> Vec<Vec<Turn>> {
        self.transcripts.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.transcripts.lock().unwrap().len()
    }
}

#[async_trait]
impl Provider for MockProvider {
    async fn complete(&self, transcript: &[Turn], _tools: &[Tool]) -> Result<(ModelReply, Usage)> {
        self.transcripts.lock().unwrap().push(transcript.to_vec());

        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            // Return empty response if no more pre-configured responses
            let reply = self.fallback.clone().unwrap_or_default();
            Ok((reply, Usage::default()))
        } else {
            match responses.remove(0) {
                Ok(reply) => Ok((reply, Usage::default())),
                Err(message) => Err(anyhow!(message)),
            }
        }
    }
}
