//! # AgroBot
//!
//! An agricultural assistant chatbot. Questions are answered from a static,
//! keyword-indexed, multilingual knowledge base; when it has nothing to say the
//! question escalates to a hosted language model, and failing that to a fixed
//! apology. Language detection, translation and the model are all optional
//! capabilities that degrade silently when absent or broken.
//!
//! [`rules::KeywordResponder`] is a much smaller companion bot that answers from a
//! handful of hard-coded categories and needs nothing external.

pub mod constants;
pub mod errors;
pub mod knowledge;
pub mod language;
mod processor;
pub mod prompts;
pub mod providers;
pub mod rules;
pub mod types;

pub use errors::{CapabilityError, KnowledgeError};
pub use knowledge::{
    find_in_kb, load_kb, KbMatch, KnowledgeBase, KnowledgeEntry, MatchKind, MatchStrategy,
    SharedKnowledgeBase,
};
pub use types::{ChatProcessor, ChatProcessorBuilder, UserProfile};

use std::path::PathBuf;

/// The knowledge base bundled with this crate (`kb.json` next to its manifest).
pub fn default_kb_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join(constants::KB_FILE_NAME)
}
