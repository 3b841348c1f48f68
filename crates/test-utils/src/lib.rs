use agrobot::errors::CapabilityError;
use agrobot::providers::ai::AiProvider;
use agrobot::providers::language::{LanguageDetector, Translator};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt::Debug;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;
use tempfile::TempDir;

// --- Test Setup ---

static INIT: Once = Once::new();

/// Initializes the tracing subscriber and loads .env for tests.
pub fn setup_tracing() {
    INIT.call_once(|| {
        dotenvy::dotenv().ok();
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Writes `content` as `kb.json` inside a fresh temporary directory.
///
/// Keep the returned `TempDir` alive for as long as the file is needed.
pub fn write_kb_file(content: &Value) -> (TempDir, PathBuf) {
    write_raw_kb_file(&content.to_string())
}

/// Writes raw text (possibly invalid JSON) as `kb.json` in a temporary directory.
pub fn write_raw_kb_file(content: &str) -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("kb.json");
    std::fs::write(&path, content).unwrap();
    (dir, path)
}

// --- Mock AI Provider ---

/// A scripted language model. Replies are handed out in order; once they run
/// out, a default reply is returned.
#[derive(Clone, Debug)]
pub struct MockAiProvider {
    responses: Arc<Mutex<Vec<String>>>,
    calls: Arc<Mutex<Vec<(String, String)>>>,
    fail: bool,
    delay: Option<Duration>,
}

impl MockAiProvider {
    pub fn new(responses: Vec<&str>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(
                responses.into_iter().rev().map(String::from).collect(),
            )),
            calls: Arc::new(Mutex::new(Vec::new())),
            fail: false,
            delay: None,
        }
    }

    /// A provider whose every call fails with an API error.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new(vec![])
        }
    }

    /// Sleeps for `delay` before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Retrieves the recorded `(system_prompt, user_prompt)` calls for assertion.
    pub fn get_calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

impl Default for MockAiProvider {
    fn default() -> Self {
        Self::new(vec![])
    }
}

#[async_trait]
impl AiProvider for MockAiProvider {
    async fn generate(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<String, CapabilityError> {
        self.calls
            .lock()
            .unwrap()
            .push((system_prompt.to_string(), user_prompt.to_string()));

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail {
            return Err(CapabilityError::Api("MockAiProvider: scripted failure".to_string()));
        }

        let next = self.responses.lock().unwrap().pop();
        Ok(next.unwrap_or_else(|| "Default mock response".to_string()))
    }
}

// --- Mock Language Capabilities ---

/// A detector that always reports the same language, or always fails.
#[derive(Clone, Debug)]
pub struct MockDetector {
    language: Option<String>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockDetector {
    pub fn new(language: &str) -> Self {
        Self {
            language: Some(language.to_string()),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn failing() -> Self {
        Self {
            language: None,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn get_calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl LanguageDetector for MockDetector {
    async fn detect(&self, text: &str) -> Result<String, CapabilityError> {
        self.calls.lock().unwrap().push(text.to_string());
        self.language.clone().ok_or(CapabilityError::Undetectable)
    }
}

/// A translator with programmed translations. Unprogrammed input is returned
/// tagged with its destination, e.g. `"[hi] Use neem oil"`.
#[derive(Clone, Debug)]
pub struct MockTranslator {
    translations: Arc<Mutex<HashMap<(String, String), String>>>,
    calls: Arc<Mutex<Vec<(String, String)>>>,
    fail: bool,
}

impl MockTranslator {
    pub fn new() -> Self {
        Self {
            translations: Arc::new(Mutex::new(HashMap::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    /// Programs the translation of `text` into `dest`.
    pub fn add_translation(&self, text: &str, dest: &str, translated: &str) {
        self.translations.lock().unwrap().insert(
            (text.to_string(), dest.to_string()),
            translated.to_string(),
        );
    }

    /// Retrieves the recorded `(text, dest)` calls for assertion.
    pub fn get_calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

impl Default for MockTranslator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Translator for MockTranslator {
    async fn translate(&self, text: &str, dest: &str) -> Result<String, CapabilityError> {
        self.calls
            .lock()
            .unwrap()
            .push((text.to_string(), dest.to_string()));
        if self.fail {
            return Err(CapabilityError::Api("MockTranslator: scripted failure".to_string()));
        }
        let translations = self.translations.lock().unwrap();
        Ok(translations
            .get(&(text.to_string(), dest.to_string()))
            .cloned()
            .unwrap_or_else(|| format!("[{dest}] {text}")))
    }
}
