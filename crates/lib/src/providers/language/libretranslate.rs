use crate::{
    errors::CapabilityError,
    providers::language::{LanguageDetector, Translator},
};
use async_trait::async_trait;
use reqwest::Client as ReqwestClient;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use tracing::debug;

// --- LibreTranslate request and response structures ---

#[derive(Serialize)]
struct TranslateRequest<'a> {
    q: &'a str,
    source: &'a str,
    target: &'a str,
    format: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    api_key: Option<&'a str>,
}

#[derive(Deserialize, Debug)]
struct TranslateResponse {
    #[serde(rename = "translatedText")]
    translated_text: String,
}

#[derive(Serialize)]
struct DetectRequest<'a> {
    q: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    api_key: Option<&'a str>,
}

#[derive(Deserialize, Debug)]
struct Detection {
    language: String,
    #[serde(default)]
    confidence: f64,
}

// --- Client implementation ---

/// A client for a LibreTranslate-compatible translation service.
///
/// One service answers both detection (`POST /detect`) and translation
/// (`POST /translate`), so the client implements both capabilities.
#[derive(Clone)]
pub struct LibreTranslateClient {
    client: ReqwestClient,
    api_url: String,
    api_key: Option<String>,
}

impl Debug for LibreTranslateClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LibreTranslateClient")
            .field("api_url", &self.api_url)
            .field("has_api_key", &self.api_key.is_some())
            .finish()
    }
}

impl LibreTranslateClient {
    /// Creates a client for the service rooted at `api_url` (e.g. `http://localhost:5000`).
    pub fn new(api_url: String, api_key: Option<String>) -> Result<Self, CapabilityError> {
        let client = ReqwestClient::builder()
            .build()
            .map_err(CapabilityError::ReqwestClientBuild)?;
        Ok(Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    async fn post<B: Serialize, R: for<'de> Deserialize<'de>>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<R, CapabilityError> {
        let response = self
            .client
            .post(format!("{}/{endpoint}", self.api_url))
            .json(body)
            .send()
            .await
            .map_err(CapabilityError::Request)?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(CapabilityError::Api(format!("{status}: {error_text}")));
        }

        response
            .json()
            .await
            .map_err(CapabilityError::Deserialization)
    }
}

#[async_trait]
impl Translator for LibreTranslateClient {
    async fn translate(&self, text: &str, dest: &str) -> Result<String, CapabilityError> {
        let request = TranslateRequest {
            q: text,
            source: "auto",
            target: dest,
            format: "text",
            api_key: self.api_key.as_deref(),
        };
        let response: TranslateResponse = self.post("translate", &request).await?;
        if response.translated_text.trim().is_empty() {
            return Err(CapabilityError::EmptyResponse);
        }
        debug!(target_lang = dest, "Translated text");
        Ok(response.translated_text)
    }
}

#[async_trait]
impl LanguageDetector for LibreTranslateClient {
    async fn detect(&self, text: &str) -> Result<String, CapabilityError> {
        let request = DetectRequest {
            q: text,
            api_key: self.api_key.as_deref(),
        };
        let detections: Vec<Detection> = self.post("detect", &request).await?;
        let best = detections
            .into_iter()
            .max_by(|a, b| a.confidence.total_cmp(&b.confidence))
            .ok_or(CapabilityError::Undetectable)?;
        debug!(language = %best.language, confidence = best.confidence, "Detected language");
        Ok(best.language)
    }
}
