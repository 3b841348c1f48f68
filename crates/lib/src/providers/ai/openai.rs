use crate::{
    constants::{DEFAULT_MAX_TOKENS, DEFAULT_MODEL_API_URL, DEFAULT_MODEL_NAME},
    errors::CapabilityError,
    providers::ai::AiProvider,
};
use async_trait::async_trait;
use reqwest::Client as ReqwestClient;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use tracing::debug;

// --- OpenAI-compatible request and response structures ---

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Deserialize, Debug)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize, Debug)]
struct ChatChoice {
    message: ChatMessage,
}

// --- Provider implementation ---

/// A provider for the OpenAI chat completions API or any compatible server.
#[derive(Clone)]
pub struct OpenAiProvider {
    client: ReqwestClient,
    api_url: String,
    api_key: String,
    model: String,
    max_tokens: u32,
}

impl Debug for OpenAiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiProvider")
            .field("api_url", &self.api_url)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .finish_non_exhaustive()
    }
}

impl OpenAiProvider {
    /// Creates a provider for the public OpenAI endpoint with the default model.
    pub fn new(api_key: String) -> Result<Self, CapabilityError> {
        Self::with_options(
            DEFAULT_MODEL_API_URL.to_string(),
            api_key,
            DEFAULT_MODEL_NAME.to_string(),
            DEFAULT_MAX_TOKENS,
        )
    }

    /// Creates a provider for a specific endpoint, model and response budget.
    pub fn with_options(
        api_url: String,
        api_key: String,
        model: String,
        max_tokens: u32,
    ) -> Result<Self, CapabilityError> {
        let client = ReqwestClient::builder()
            .build()
            .map_err(CapabilityError::ReqwestClientBuild)?;
        Ok(Self {
            client,
            api_url,
            api_key,
            model,
            max_tokens,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl AiProvider for OpenAiProvider {
    async fn generate(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<String, CapabilityError> {
        let request_body = ChatCompletionRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system_prompt.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user_prompt.to_string(),
                },
            ],
            max_tokens: self.max_tokens,
        };

        debug!(model = %self.model, "--> Sending chat completion request");

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(CapabilityError::Request)?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(CapabilityError::Api(format!("{status}: {error_text}")));
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(CapabilityError::Deserialization)?;

        let reply = completion
            .choices
            .first()
            .map(|c| c.message.content.trim().to_string())
            .unwrap_or_default();

        if reply.is_empty() {
            return Err(CapabilityError::EmptyResponse);
        }
        debug!("<-- Chat completion reply: {}", reply);
        Ok(reply)
    }
}
