//! # Application State
//!
//! This module defines the shared application state (`AppState`) and the logic
//! for building it at startup: the knowledge base is loaded, the optional
//! capabilities are instantiated from the configuration and wired into a
//! [`ChatProcessor`].

use crate::config::AppConfig;
use agrobot::{
    default_kb_path, load_kb,
    providers::{
        ai::{openai::OpenAiProvider, AiProvider},
        language::{
            libretranslate::LibreTranslateClient, script::ScriptDetector, LanguageDetector,
            Translator,
        },
    },
    rules::KeywordResponder,
    ChatProcessor, ChatProcessorBuilder, MatchStrategy,
};
use std::{path::PathBuf, sync::Arc, time::Duration};
use tracing::{info, warn};

/// The shared application state, accessible from all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// The knowledge-base chatbot.
    pub processor: Arc<ChatProcessor>,
    /// The rule-based companion responder behind `/get`.
    pub responder: KeywordResponder,
    /// The file `/kb/reload` reads from.
    pub kb_path: PathBuf,
}

/// Resolves the knowledge base path, falling back to the bundled file.
pub fn resolve_kb_path(config: &AppConfig) -> PathBuf {
    config
        .kb_path
        .as_ref()
        .map(PathBuf::from)
        .unwrap_or_else(default_kb_path)
}

/// Builds a [`ChatProcessor`] from the configuration.
///
/// - The model is enabled only when an API key is configured.
/// - Translation is enabled only when a translation service is configured.
/// - `detector` selects the offline script heuristic, the translation service
///   (which must then be configured), or no detection at all.
pub fn build_processor(config: &AppConfig) -> anyhow::Result<ChatProcessor> {
    let strategy = MatchStrategy::from_name(&config.match_strategy, config.similarity_threshold)
        .ok_or_else(|| {
            anyhow::anyhow!("Unsupported match strategy '{}'", config.match_strategy)
        })?;

    let translation_client = config
        .translation
        .as_ref()
        .map(|t| LibreTranslateClient::new(t.api_url.clone(), t.api_key.clone()))
        .transpose()?;

    let detector: Option<Box<dyn LanguageDetector>> = match config.detector.as_str() {
        "script" => Some(Box::new(ScriptDetector::new())),
        "translation_service" => {
            let client = translation_client.clone().ok_or_else(|| {
                anyhow::anyhow!(
                    "detector 'translation_service' requires a translation.api_url to be configured"
                )
            })?;
            Some(Box::new(client))
        }
        "none" => None,
        other => return Err(anyhow::anyhow!("Unsupported language detector '{other}'")),
    };

    let ai_provider: Option<Box<dyn AiProvider>> = match &config.model.api_key {
        Some(api_key) => Some(Box::new(OpenAiProvider::with_options(
            config.model.api_url.clone(),
            api_key.clone(),
            config.model.model_name.clone(),
            config.model.max_tokens,
        )?)),
        None => {
            warn!("No model API key configured; unanswered questions get the default reply.");
            None
        }
    };

    let kb_path = resolve_kb_path(config);
    let kb = load_kb(&kb_path);
    info!(
        path = %kb_path.display(),
        keywords = kb.len(),
        strategy = ?strategy,
        detector = %config.detector,
        translation = translation_client.is_some(),
        model = ai_provider.is_some(),
        "Chat processor configured"
    );

    let mut builder = ChatProcessorBuilder::new()
        .knowledge_base(kb)
        .match_strategy(strategy)
        .capability_timeout(Duration::from_secs(config.capability_timeout_secs));
    if let Some(detector) = detector {
        builder = builder.detector(detector);
    }
    if let Some(client) = translation_client {
        builder = builder.translator(Box::new(client) as Box<dyn Translator>);
    }
    if let Some(provider) = ai_provider {
        builder = builder.ai_provider(provider);
    }
    Ok(builder.build())
}

/// Builds the shared application state from the configuration.
pub async fn build_app_state(config: AppConfig) -> anyhow::Result<AppState> {
    let processor = build_processor(&config)?;
    Ok(AppState {
        processor: Arc::new(processor),
        responder: KeywordResponder::new(),
        kb_path: resolve_kb_path(&config),
    })
}
