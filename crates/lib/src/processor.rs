//! # Message Processing
//!
//! The fallback cascade run for every incoming message:
//!
//! 1.  Empty input gets the ask-a-question prompt.
//! 2.  The input's language is detected and, if it is not English and a
//!     translator is available, the input is translated for matching.
//! 3.  The knowledge base is searched. A hit is answered in the resolved reply
//!     language (profile preference, then detected language, then English).
//! 4.  Otherwise the language model is asked, if one is configured.
//! 5.  Otherwise the not-found message is returned.
//!
//! Capability failures never escape: detection degrades to English, translation
//! to the untranslated text and the model to an empty reply.

use crate::constants::{ASK_QUESTION_MESSAGE, DEFAULT_LANGUAGE, NOT_FOUND_MESSAGE};
use crate::errors::CapabilityError;
use crate::knowledge::{find_in_kb, KbMatch, KnowledgeEntry};
use crate::language::{resolve_language, truncate_language_code, with_timeout};
use crate::prompts::{build_fallback_prompt, AGRONOMIST_SYSTEM_PROMPT};
use crate::types::{ChatProcessor, UserProfile};
use tracing::{debug, error, info, warn};

impl ChatProcessor {
    /// Answers `message` for `profile`. Always returns a reply.
    pub async fn process_message(&self, profile: &UserProfile, message: &str) -> String {
        if message.trim().is_empty() {
            debug!("[process_message] Empty message");
            return ASK_QUESTION_MESSAGE.to_string();
        }

        let detected = self.detect_language(message).await;
        let working_text = if detected != DEFAULT_LANGUAGE && self.translator.is_some() {
            self.translate_text(message, DEFAULT_LANGUAGE).await
        } else {
            message.to_string()
        };
        let target = resolve_language(profile, &detected);
        info!(detected = %detected, target = %target, "[process_message] received message");

        let kb = self.knowledge.snapshot();
        if let Some(KbMatch { keyword, kind, entry }) =
            find_in_kb(&kb, &working_text, self.match_strategy)
        {
            info!(keyword, ?kind, "[process_message] Knowledge base hit");
            if let Some(answer) = self.resolve_answer(entry, &target).await {
                return answer;
            }
            warn!(keyword, "Matched knowledge entry has no answer; escalating");
        }

        let reply = self.model_fallback(profile, &working_text, &target).await;
        if !reply.is_empty() {
            return reply;
        }

        NOT_FOUND_MESSAGE.to_string()
    }

    /// Looks `message` up in the current knowledge base and returns a copy of the entry.
    pub fn find_in_kb(&self, message: &str) -> Option<KnowledgeEntry> {
        let kb = self.knowledge.snapshot();
        find_in_kb(&kb, message, self.match_strategy).map(|hit| hit.entry.clone())
    }

    /// Detects the language of `text`, defaulting to English.
    pub async fn detect_language(&self, text: &str) -> String {
        match self.try_detect_language(text).await {
            Ok(language) => language,
            Err(CapabilityError::Unavailable(_)) => DEFAULT_LANGUAGE.to_string(),
            Err(e) => {
                warn!("Language detection failed, assuming English: {e}");
                DEFAULT_LANGUAGE.to_string()
            }
        }
    }

    /// Detects the language of `text`, reporting why detection was not possible.
    pub async fn try_detect_language(&self, text: &str) -> Result<String, CapabilityError> {
        let detector = self
            .detector
            .as_deref()
            .ok_or(CapabilityError::Unavailable("language detection"))?;
        let language = with_timeout(self.capability_timeout, detector.detect(text)).await?;
        let language = truncate_language_code(&language);
        if language.is_empty() {
            return Err(CapabilityError::Undetectable);
        }
        Ok(language)
    }

    /// Translates `text` into `dest`, returning it unchanged when that is not possible.
    pub async fn translate_text(&self, text: &str, dest: &str) -> String {
        match self.try_translate(text, dest).await {
            Ok(translated) => translated,
            Err(CapabilityError::Unavailable(_)) => text.to_string(),
            Err(e) => {
                warn!(dest, "Translation failed, keeping original text: {e}");
                text.to_string()
            }
        }
    }

    /// Translates `text` into `dest` (truncated to 2 characters).
    pub async fn try_translate(&self, text: &str, dest: &str) -> Result<String, CapabilityError> {
        let translator = self
            .translator
            .as_deref()
            .ok_or(CapabilityError::Unavailable("translation"))?;
        let dest = truncate_language_code(dest);
        let translated = with_timeout(self.capability_timeout, translator.translate(text, &dest)).await?;
        if translated.trim().is_empty() {
            return Err(CapabilityError::EmptyResponse);
        }
        Ok(translated)
    }

    /// Asks the language model, returning an empty string when it cannot answer.
    pub async fn model_fallback(
        &self,
        profile: &UserProfile,
        message: &str,
        target_language: &str,
    ) -> String {
        match self.try_model_fallback(profile, message, target_language).await {
            Ok(reply) => reply,
            Err(CapabilityError::Unavailable(_)) => String::new(),
            Err(e) => {
                error!("Model fallback failed: {e}");
                String::new()
            }
        }
    }

    /// Asks the language model and translates its reply into `target_language`
    /// when that is not English.
    pub async fn try_model_fallback(
        &self,
        profile: &UserProfile,
        message: &str,
        target_language: &str,
    ) -> Result<String, CapabilityError> {
        let provider = self
            .ai_provider
            .as_deref()
            .ok_or(CapabilityError::Unavailable("language model"))?;

        let user_prompt = build_fallback_prompt(profile, message);
        debug!(user_prompt = %user_prompt, "--> Escalating to language model");
        let reply = with_timeout(
            self.capability_timeout,
            provider.generate(AGRONOMIST_SYSTEM_PROMPT, &user_prompt),
        )
        .await?;
        let reply = reply.trim();
        if reply.is_empty() {
            return Err(CapabilityError::EmptyResponse);
        }

        if target_language != DEFAULT_LANGUAGE && self.translator.is_some() {
            return Ok(self.translate_text(reply, target_language).await);
        }
        Ok(reply.to_string())
    }

    /// Picks the answer for `target` from a matched entry.
    ///
    /// Order: the target-language slot; the English answer as written; any other
    /// non-empty slot, translated when the target is not English and a
    /// translator exists.
    async fn resolve_answer(&self, entry: &KnowledgeEntry, target: &str) -> Option<String> {
        if let Some(answer) = entry.answer(target) {
            return Some(answer.to_string());
        }
        if let Some(english) = entry.english() {
            return Some(english.to_string());
        }
        let other = entry.first_available()?;
        if target != DEFAULT_LANGUAGE && self.translator.is_some() {
            return Some(self.translate_text(other, target).await);
        }
        Some(other.to_string())
    }
}
