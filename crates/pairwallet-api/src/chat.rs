//! Client for an OpenAI-compatible chat completion endpoint

use pairwallet_config::ChatConfig;
use pairwallet_core::chat::{trim_history, ChatMessage};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::ApiError;

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChatMessage,
}

#[derive(Debug, Clone)]
pub struct ChatClient {
    http: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
    temperature: f32,
    max_history: usize,
}

impl ChatClient {
    /// `None` when no endpoint is configured. The API key is read from the
    /// environment variable named in the config.
    pub fn from_config(config: &ChatConfig, timeout: Duration) -> Result<Option<Self>, ApiError> {
        let endpoint = match config.endpoint.as_deref().map(str::trim) {
            Some(endpoint) if !endpoint.is_empty() => endpoint.to_string(),
            _ => return Ok(None),
        };
        let api_key = std::env::var(&config.api_key_env).ok().filter(|k| !k.is_empty());
        if api_key.is_none() {
            log::warn!("{} is not set, chat requests are sent without a key", config.api_key_env);
        }
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::InternalError { message: e.to_string() })?;
        Ok(Some(Self {
            http,
            endpoint,
            model: config.model.clone(),
            api_key,
            temperature: config.temperature,
            max_history: config.max_history,
        }))
    }

    /// Send the system instruction and the recent history, return the reply text
    pub async fn complete(
        &self,
        system: &str,
        history: &[ChatMessage],
    ) -> Result<String, ApiError> {
        let mut messages = vec![ChatMessage::system(system)];
        messages.extend(trim_history(history, self.max_history));

        let request = CompletionRequest {
            model: &self.model,
            messages,
            temperature: self.temperature,
        };
        let mut builder = self.http.post(&self.endpoint).json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| ApiError::Upstream { message: e.to_string() })?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Upstream {
                message: format!("completion endpoint returned {}", status),
            });
        }
        let body: CompletionResponse = response
            .json()
            .await
            .map_err(|e| ApiError::Upstream { message: e.to_string() })?;

        body.choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| ApiError::Upstream {
                message: "completion response had no choices".to_string(),
            })
    }
}
