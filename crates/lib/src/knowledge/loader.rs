//! # Knowledge Base Loader
//!
//! Flattens the two supported JSON shapes into a [`KnowledgeBase`]:
//!
//! 1.  A list of records, each with `keywords` (an array, or one comma-separated
//!     string) and `answer_<lang>` fields. Every keyword maps to the same answers.
//! 2.  An object mapping a keyword to either a plain string (the English answer)
//!     or an object with `answer_<lang>` fields.

use super::{KnowledgeBase, KnowledgeEntry};
use crate::constants::{BASE_LANGUAGES, DEFAULT_LANGUAGE};
use crate::errors::KnowledgeError;
use serde_json::{Map, Value};
use std::path::Path;
use tracing::{debug, info, warn};

const ANSWER_PREFIX: &str = "answer_";

/// Loads the knowledge base at `path`, degrading to an empty one on any error.
pub fn load_kb(path: impl AsRef<Path>) -> KnowledgeBase {
    let path = path.as_ref();
    match try_load(path) {
        Ok(kb) => {
            info!(path = %path.display(), keywords = kb.len(), "Loaded knowledge base");
            kb
        }
        Err(e) => {
            warn!("{e}. Continuing with an empty knowledge base.");
            KnowledgeBase::default()
        }
    }
}

/// Loads the knowledge base at `path`, reporting why it could not be read.
pub fn try_load(path: impl AsRef<Path>) -> Result<KnowledgeBase, KnowledgeError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|source| KnowledgeError::Io {
        path: path.display().to_string(),
        source,
    })?;
    KnowledgeBase::from_json_str(&content)
}

impl KnowledgeBase {
    /// Parses a knowledge base from JSON text.
    pub fn from_json_str(content: &str) -> Result<Self, KnowledgeError> {
        let data: Value = serde_json::from_str(content)?;
        Self::from_value(data)
    }

    /// Builds a knowledge base from an already-parsed JSON value.
    pub fn from_value(data: Value) -> Result<Self, KnowledgeError> {
        let mut kb = KnowledgeBase::new();
        match data {
            Value::Array(records) => {
                for (i, record) in records.into_iter().enumerate() {
                    match record {
                        Value::Object(fields) => insert_record(&mut kb, &fields),
                        other => warn!(
                            "Skipping knowledge record #{i}: expected an object, found {}",
                            value_kind(&other)
                        ),
                    }
                }
            }
            Value::Object(map) => {
                for (keyword, value) in map {
                    let entry = match value {
                        Value::String(answer) => KnowledgeEntry::english_only(answer),
                        Value::Object(fields) => entry_from_fields(&fields),
                        other => {
                            warn!(
                                "Skipping knowledge key '{keyword}': expected a string or an object, found {}",
                                value_kind(&other)
                            );
                            continue;
                        }
                    };
                    if !kb.insert(&keyword, entry) {
                        debug!("Dropping blank knowledge key");
                    }
                }
            }
            other => return Err(KnowledgeError::UnsupportedShape(value_kind(&other))),
        }
        Ok(kb)
    }
}

fn insert_record(kb: &mut KnowledgeBase, fields: &Map<String, Value>) {
    let keywords = record_keywords(fields.get("keywords"));
    if keywords.is_empty() {
        debug!("Knowledge record has no keywords; skipping");
        return;
    }
    let entry = entry_from_fields(fields);
    for keyword in keywords {
        kb.insert(&keyword, entry.clone());
    }
}

/// Extracts keywords from either an array of strings or a comma-separated string.
fn record_keywords(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::String(joined)) => joined
            .split(',')
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(String::from)
            .collect(),
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .filter(|k| !k.trim().is_empty())
            .map(String::from)
            .collect(),
        Some(Value::Null) | None => Vec::new(),
        Some(other) => {
            warn!(
                "Ignoring 'keywords' field: expected a string or an array, found {}",
                value_kind(other)
            );
            Vec::new()
        }
    }
}

/// Collects every `answer_<lang>` field. The base languages are always present,
/// empty when the source omits them.
fn entry_from_fields(fields: &Map<String, Value>) -> KnowledgeEntry {
    let mut entry = KnowledgeEntry::default();
    for lang in BASE_LANGUAGES {
        entry.set_answer(lang, "");
    }
    for (field, value) in fields {
        let Some(lang) = field.strip_prefix(ANSWER_PREFIX) else {
            continue;
        };
        if lang.chars().count() != 2 || !lang.chars().all(|c| c.is_ascii_alphabetic()) {
            continue;
        }
        entry.set_answer(lang, value.as_str().unwrap_or_default());
    }
    if entry.english().is_none() {
        debug!("Knowledge entry has no '{DEFAULT_LANGUAGE}' answer");
    }
    entry
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
