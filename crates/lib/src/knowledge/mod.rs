//! # Knowledge Base
//!
//! The static, keyword-indexed answer table the chatbot consults before it
//! escalates to a language model. A [`KnowledgeBase`] is built once from a JSON
//! file (see [`loader`]) and never mutated afterwards; [`SharedKnowledgeBase`]
//! replaces it wholesale when a reload is requested.

pub mod loader;
pub mod matcher;
pub mod similarity;

pub use loader::{load_kb, try_load};
pub use matcher::{find_in_kb, KbMatch, MatchKind, MatchStrategy};

use crate::constants::DEFAULT_LANGUAGE;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::{Arc, RwLock};
use tracing::info;

/// One topic's answers, keyed by 2-letter language code.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct KnowledgeEntry {
    answers: BTreeMap<String, String>,
}

impl KnowledgeEntry {
    /// Creates an entry carrying only an English answer.
    pub fn english_only(answer: impl Into<String>) -> Self {
        Self::default().with_answer(DEFAULT_LANGUAGE, answer)
    }

    /// Adds or replaces the answer for `language`.
    pub fn with_answer(mut self, language: &str, answer: impl Into<String>) -> Self {
        self.set_answer(language, answer);
        self
    }

    pub(crate) fn set_answer(&mut self, language: &str, answer: impl Into<String>) {
        self.answers
            .insert(language.to_lowercase(), answer.into());
    }

    /// The non-empty answer for `language`, if any.
    pub fn answer(&self, language: &str) -> Option<&str> {
        self.answers
            .get(language)
            .map(String::as_str)
            .filter(|a| !a.trim().is_empty())
    }

    /// The non-empty English answer, if any.
    pub fn english(&self) -> Option<&str> {
        self.answer(DEFAULT_LANGUAGE)
    }

    /// Any non-empty answer, in language-code order.
    pub fn first_available(&self) -> Option<&str> {
        self.answers
            .values()
            .map(String::as_str)
            .find(|a| !a.trim().is_empty())
    }

    /// An entry is usable when at least one language slot holds text.
    pub fn is_usable(&self) -> bool {
        self.first_available().is_some()
    }

    /// Language codes present in the entry, including empty slots.
    pub fn languages(&self) -> impl Iterator<Item = &str> {
        self.answers.keys().map(String::as_str)
    }
}

/// Ordered mapping from lowercase keyword to [`KnowledgeEntry`].
///
/// Iteration follows insertion order. Re-inserting a keyword keeps its original
/// position and replaces its entry.
#[derive(Debug, Clone, Default)]
pub struct KnowledgeBase {
    entries: Vec<(String, KnowledgeEntry)>,
    index: HashMap<String, usize>,
}

impl KnowledgeBase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `entry` under the case-folded `keyword`.
    ///
    /// Returns `false` (and stores nothing) when the keyword is blank.
    pub fn insert(&mut self, keyword: &str, entry: KnowledgeEntry) -> bool {
        if keyword.trim().is_empty() {
            return false;
        }
        let key = keyword.to_lowercase();
        match self.index.get(&key) {
            Some(&pos) => self.entries[pos].1 = entry,
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, entry));
            }
        }
        true
    }

    pub fn get(&self, keyword: &str) -> Option<&KnowledgeEntry> {
        self.index
            .get(&keyword.to_lowercase())
            .map(|&pos| &self.entries[pos].1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keywords and entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &KnowledgeEntry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keywords(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }
}

/// A knowledge base handle that can be swapped atomically.
///
/// Readers take an `Arc` snapshot and keep using it even if a reload happens
/// mid-request. The underlying [`KnowledgeBase`] itself is never mutated.
#[derive(Debug, Default)]
pub struct SharedKnowledgeBase {
    current: RwLock<Arc<KnowledgeBase>>,
}

impl SharedKnowledgeBase {
    pub fn new(kb: KnowledgeBase) -> Self {
        Self {
            current: RwLock::new(Arc::new(kb)),
        }
    }

    /// Returns the knowledge base currently in effect.
    pub fn snapshot(&self) -> Arc<KnowledgeBase> {
        let guard = self.current.read().unwrap_or_else(|e| e.into_inner());
        Arc::clone(&guard)
    }

    /// Replaces the current knowledge base, returning the previous one.
    pub fn swap(&self, kb: KnowledgeBase) -> Arc<KnowledgeBase> {
        let mut guard = self.current.write().unwrap_or_else(|e| e.into_inner());
        std::mem::replace(&mut *guard, Arc::new(kb))
    }

    /// Loads `path` from scratch and swaps it in. Returns the new keyword count.
    ///
    /// A missing or malformed file results in an empty knowledge base, exactly as
    /// at startup.
    pub fn reload(&self, path: impl AsRef<Path>) -> usize {
        let kb = load_kb(path.as_ref());
        let count = kb.len();
        self.swap(kb);
        info!(path = %path.as_ref().display(), keywords = count, "Knowledge base reloaded");
        count
    }
}
