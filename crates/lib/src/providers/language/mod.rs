//! # Language Capabilities
//!
//! Optional detection and translation services. The chatbot works English-only
//! when neither is configured; see [`crate::ChatProcessor`] for how failures degrade.

pub mod libretranslate;
pub mod script;

use crate::errors::CapabilityError;
use async_trait::async_trait;
use dyn_clone::DynClone;
use std::fmt::Debug;

/// Detects the language of a piece of text.
#[async_trait]
pub trait LanguageDetector: Send + Sync + Debug + DynClone {
    /// Returns a language code such as `"en"` or `"hi"`.
    async fn detect(&self, text: &str) -> Result<String, CapabilityError>;
}

dyn_clone::clone_trait_object!(LanguageDetector);

/// Translates text into a target language.
#[async_trait]
pub trait Translator: Send + Sync + Debug + DynClone {
    /// Translates `text` into the language identified by the 2-letter code `dest`.
    async fn translate(&self, text: &str, dest: &str) -> Result<String, CapabilityError>;
}

dyn_clone::clone_trait_object!(Translator);
