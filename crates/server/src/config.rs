//! # Application Configuration
//!
//! This module defines the configuration structure shared by `agrobot-server` and
//! the `agrobot` CLI, and the logic for loading it from an optional `config.yml`
//! file and environment variables.

use agrobot::constants::{
    DEFAULT_CAPABILITY_TIMEOUT_SECS, DEFAULT_MAX_TOKENS, DEFAULT_MODEL_API_URL,
    DEFAULT_MODEL_NAME, DEFAULT_SIMILARITY_THRESHOLD,
};
use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use regex::Regex;
use serde::Deserialize;
use std::env;
use std::fs;
use std::sync::OnceLock;
use thiserror::Error;
use tracing::info;

/// A custom error type for configuration issues.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Indicates an error from the underlying `config` crate.
    #[error("Configuration error: {0}")]
    General(String),
    /// Indicates an explicitly requested configuration file was not found.
    #[error("{0}")]
    NotFound(String),
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::General(err.to_string())
    }
}

/// The root configuration structure, mapping directly to `config.yml`.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// The port for the server to listen on. Loaded from `PORT` env var.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Path of the knowledge base file. The bundled `kb.json` is used when unset.
    #[serde(default)]
    pub kb_path: Option<String>,
    /// `token_overlap` or `similarity`.
    #[serde(default = "default_match_strategy")]
    pub match_strategy: String,
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f64,
    /// Upper bound in seconds for every detection, translation and model call.
    #[serde(default = "default_capability_timeout_secs")]
    pub capability_timeout_secs: u64,
    /// `script`, `translation_service` or `none`.
    #[serde(default = "default_detector")]
    pub detector: String,
    #[serde(default)]
    pub model: ModelConfig,
    /// The translation service. Translation is disabled when absent.
    #[serde(default)]
    pub translation: Option<TranslationConfig>,
}

fn default_port() -> u16 {
    5000
}

fn default_match_strategy() -> String {
    "token_overlap".to_string()
}

fn default_similarity_threshold() -> f64 {
    DEFAULT_SIMILARITY_THRESHOLD
}

fn default_capability_timeout_secs() -> u64 {
    DEFAULT_CAPABILITY_TIMEOUT_SECS
}

fn default_detector() -> String {
    "script".to_string()
}

/// The OpenAI-compatible model used when the knowledge base has no answer.
///
/// The model is disabled when no API key is configured.
#[derive(Debug, Deserialize, Clone)]
pub struct ModelConfig {
    #[serde(default = "default_model_api_url")]
    pub api_url: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_model_name")]
    pub model_name: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            api_url: default_model_api_url(),
            api_key: None,
            model_name: default_model_name(),
            max_tokens: default_max_tokens(),
        }
    }
}

fn default_model_api_url() -> String {
    DEFAULT_MODEL_API_URL.to_string()
}

fn default_model_name() -> String {
    DEFAULT_MODEL_NAME.to_string()
}

fn default_max_tokens() -> u32 {
    DEFAULT_MAX_TOKENS
}

/// A LibreTranslate-compatible translation service.
#[derive(Debug, Deserialize, Clone)]
pub struct TranslationConfig {
    #[serde(default)]
    pub api_url: String,
    #[serde(default)]
    pub api_key: Option<String>,
}

fn env_var_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\$\{(?P<var>[A-Z0-9_]+)\}").expect("env var pattern is a valid regex")
    })
}

// Reads a file and substitutes `${VAR}` references with environment values.
// Returns Ok(None) if the file does not exist.
fn read_and_substitute(path: &str) -> Result<Option<String>, ConfigError> {
    if !std::path::Path::new(path).exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(path)
        .map_err(|e| ConfigError::General(format!("Failed to read config file '{path}': {e}")))?;

    let expanded_content = env_var_pattern().replace_all(&content, |caps: &regex::Captures| {
        env::var(&caps["var"]).unwrap_or_default()
    });

    Ok(Some(expanded_content.to_string()))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn env_non_blank(name: &str) -> Option<String> {
    non_blank(env::var(name).ok())
}

/// Loads the application configuration from a file and environment variables.
///
/// Layers, lowest precedence first:
/// 1. Programmatic defaults from the library.
/// 2. `config.yml` next to this crate's manifest, or `config_path_override`
///    (which must exist). `${VAR}` references are substituted.
/// 3. Plain environment variables for top-level keys (`PORT`, `KB_PATH`, ...).
/// 4. `AGROBOT_` variables for nested keys (e.g. `AGROBOT_MODEL__MODEL_NAME`).
///
/// `OPENAI_API_KEY` and `TRANSLATE_API_KEY` fill in the credentials when no layer
/// set them. Blank values count as unset.
pub fn get_config(config_path_override: Option<&str>) -> Result<AppConfig, ConfigError> {
    let mut builder = ConfigBuilder::builder()
        .set_default("model.api_url", DEFAULT_MODEL_API_URL)?
        .set_default("model.model_name", DEFAULT_MODEL_NAME)?
        .set_default("model.max_tokens", i64::from(DEFAULT_MAX_TOKENS))?;

    let main_config_path = match config_path_override {
        Some(path) => path.to_string(),
        None => format!("{}/config.yml", env!("CARGO_MANIFEST_DIR")),
    };
    match read_and_substitute(&main_config_path)? {
        Some(content) => {
            info!("Loading configuration from '{main_config_path}'.");
            builder = builder.add_source(File::from_str(&content, FileFormat::Yaml));
        }
        None if config_path_override.is_some() => {
            return Err(ConfigError::NotFound(format!(
                "Config file not found at '{main_config_path}'."
            )));
        }
        None => info!("No config file at '{main_config_path}'; using defaults and environment."),
    }

    let settings = builder
        .add_source(Environment::default())
        .add_source(
            Environment::with_prefix("AGROBOT")
                .prefix_separator("_")
                .try_parsing(true)
                .separator("__"),
        )
        .build()?;

    let mut config: AppConfig = settings.try_deserialize()?;

    config.kb_path = non_blank(config.kb_path);
    config.model.api_key =
        non_blank(config.model.api_key).or_else(|| env_non_blank("OPENAI_API_KEY"));
    config.translation = config
        .translation
        .filter(|t| !t.api_url.trim().is_empty())
        .map(|mut t| {
            t.api_key = non_blank(t.api_key).or_else(|| env_non_blank("TRANSLATE_API_KEY"));
            t
        });

    Ok(config)
}
