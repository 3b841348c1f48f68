use crate::constants::DEFAULT_CAPABILITY_TIMEOUT_SECS;
use crate::knowledge::{KnowledgeBase, MatchStrategy, SharedKnowledgeBase};
use crate::providers::{
    ai::AiProvider,
    language::{LanguageDetector, Translator},
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Caller-supplied details about the person asking.
///
/// Only `preferred_language` is interpreted; every other field is passed
/// through to the model prompt untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_language: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UserProfile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_preferred_language(mut self, language: impl Into<String>) -> Self {
        self.preferred_language = Some(language.into());
        self
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

/// The chatbot: a knowledge base plus the optional capabilities it may escalate to.
pub struct ChatProcessor {
    pub(crate) knowledge: Arc<SharedKnowledgeBase>,
    pub(crate) detector: Option<Box<dyn LanguageDetector>>,
    pub(crate) translator: Option<Box<dyn Translator>>,
    pub(crate) ai_provider: Option<Box<dyn AiProvider>>,
    pub(crate) match_strategy: MatchStrategy,
    pub(crate) capability_timeout: Duration,
}

impl fmt::Debug for ChatProcessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatProcessor")
            .field("keywords", &self.knowledge.snapshot().len())
            .field("detector", &self.detector)
            .field("translator", &self.translator)
            .field("ai_provider", &self.ai_provider)
            .field("match_strategy", &self.match_strategy)
            .field("capability_timeout", &self.capability_timeout)
            .finish()
    }
}

impl ChatProcessor {
    /// The knowledge base handle, for callers that need to trigger a reload.
    pub fn knowledge(&self) -> &Arc<SharedKnowledgeBase> {
        &self.knowledge
    }

    pub fn match_strategy(&self) -> MatchStrategy {
        self.match_strategy
    }

    pub fn has_translator(&self) -> bool {
        self.translator.is_some()
    }

    pub fn has_model(&self) -> bool {
        self.ai_provider.is_some()
    }
}

/// A builder for [`ChatProcessor`].
///
/// Every capability is optional. A processor built with nothing but a knowledge
/// base answers from it in English and otherwise returns the default message.
///
/// ```
/// use agrobot::{ChatProcessorBuilder, KnowledgeBase, KnowledgeEntry};
///
/// let mut kb = KnowledgeBase::new();
/// kb.insert("aphid", KnowledgeEntry::english_only("Use neem oil"));
/// let processor = ChatProcessorBuilder::new().knowledge_base(kb).build();
/// assert!(!processor.has_model());
/// ```
pub struct ChatProcessorBuilder {
    knowledge: Option<Arc<SharedKnowledgeBase>>,
    detector: Option<Box<dyn LanguageDetector>>,
    translator: Option<Box<dyn Translator>>,
    ai_provider: Option<Box<dyn AiProvider>>,
    match_strategy: MatchStrategy,
    capability_timeout: Duration,
}

impl Default for ChatProcessorBuilder {
    fn default() -> Self {
        Self {
            knowledge: None,
            detector: None,
            translator: None,
            ai_provider: None,
            match_strategy: MatchStrategy::default(),
            capability_timeout: Duration::from_secs(DEFAULT_CAPABILITY_TIMEOUT_SECS),
        }
    }
}

impl ChatProcessorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the knowledge base to answer from.
    pub fn knowledge_base(mut self, kb: KnowledgeBase) -> Self {
        self.knowledge = Some(Arc::new(SharedKnowledgeBase::new(kb)));
        self
    }

    /// Shares an existing knowledge base handle, so reloads are seen by this processor.
    pub fn shared_knowledge_base(mut self, knowledge: Arc<SharedKnowledgeBase>) -> Self {
        self.knowledge = Some(knowledge);
        self
    }

    pub fn detector(mut self, detector: Box<dyn LanguageDetector>) -> Self {
        self.detector = Some(detector);
        self
    }

    pub fn translator(mut self, translator: Box<dyn Translator>) -> Self {
        self.translator = Some(translator);
        self
    }

    pub fn ai_provider(mut self, ai_provider: Box<dyn AiProvider>) -> Self {
        self.ai_provider = Some(ai_provider);
        self
    }

    pub fn match_strategy(mut self, strategy: MatchStrategy) -> Self {
        self.match_strategy = strategy;
        self
    }

    /// Upper bound for every detection, translation and model call.
    pub fn capability_timeout(mut self, timeout: Duration) -> Self {
        self.capability_timeout = timeout;
        self
    }

    pub fn build(self) -> ChatProcessor {
        ChatProcessor {
            knowledge: self.knowledge.unwrap_or_default(),
            detector: self.detector,
            translator: self.translator,
            ai_provider: self.ai_provider,
            match_strategy: self.match_strategy,
            capability_timeout: self.capability_timeout,
        }
    }
}
