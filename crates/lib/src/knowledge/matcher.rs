//! # Knowledge Base Matcher
//!
//! Finds the entry that answers a (case-folded) message. Exact substring
//! containment is always tried first; the configured [`MatchStrategy`] decides
//! the fuzzy fallback.

use super::similarity::ratio;
use super::{KnowledgeBase, KnowledgeEntry};
use crate::constants::{DEFAULT_SIMILARITY_THRESHOLD, MIN_OVERLAP_TOKEN_CHARS};
use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;
use tracing::debug;

/// The fuzzy strategy applied when no keyword is contained verbatim.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MatchStrategy {
    /// A message word longer than three characters appears among a keyword's words.
    TokenOverlap,
    /// The best keyword/message similarity ratio strictly exceeds `threshold`.
    Similarity { threshold: f64 },
}

impl MatchStrategy {
    /// Similarity matching with the default threshold.
    pub fn similarity() -> Self {
        MatchStrategy::Similarity {
            threshold: DEFAULT_SIMILARITY_THRESHOLD,
        }
    }

    /// Parses a configured strategy name (`token_overlap` or `similarity`).
    pub fn from_name(name: &str, threshold: f64) -> Option<Self> {
        match name.trim().to_lowercase().replace('-', "_").as_str() {
            "token_overlap" | "token" => Some(MatchStrategy::TokenOverlap),
            "similarity" | "fuzzy" => Some(MatchStrategy::Similarity { threshold }),
            _ => None,
        }
    }
}

impl Default for MatchStrategy {
    fn default() -> Self {
        MatchStrategy::TokenOverlap
    }
}

/// How a [`KbMatch`] was found.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MatchKind {
    Exact,
    TokenOverlap,
    Similarity(f64),
}

/// A knowledge base hit.
#[derive(Debug, Clone, Copy)]
pub struct KbMatch<'a> {
    pub keyword: &'a str,
    pub entry: &'a KnowledgeEntry,
    pub kind: MatchKind,
}

/// Looks `message` up in `kb`.
///
/// Keys are scanned in insertion order, so when several keywords qualify the
/// earliest-inserted one wins. `None` means the caller should escalate.
pub fn find_in_kb<'a>(
    kb: &'a KnowledgeBase,
    message: &str,
    strategy: MatchStrategy,
) -> Option<KbMatch<'a>> {
    if kb.is_empty() {
        return None;
    }
    let message = message.to_lowercase();

    if let Some((keyword, entry)) = kb.iter().find(|(k, _)| message.contains(*k)) {
        return Some(KbMatch {
            keyword,
            entry,
            kind: MatchKind::Exact,
        });
    }

    let found = match strategy {
        MatchStrategy::TokenOverlap => match_token_overlap(kb, &message),
        MatchStrategy::Similarity { threshold } => match_similarity(kb, &message, threshold),
    };
    if found.is_none() {
        debug!(?strategy, "No knowledge base match");
    }
    found
}

fn match_token_overlap<'a>(kb: &'a KnowledgeBase, message: &str) -> Option<KbMatch<'a>> {
    let message_tokens: Vec<&str> = tokenize(message)
        .filter(|t| t.chars().count() > MIN_OVERLAP_TOKEN_CHARS)
        .collect();
    if message_tokens.is_empty() {
        return None;
    }
    kb.iter()
        .find(|(keyword, _)| {
            let key_tokens: HashSet<&str> = tokenize(keyword).collect();
            message_tokens.iter().any(|t| key_tokens.contains(t))
        })
        .map(|(keyword, entry)| KbMatch {
            keyword,
            entry,
            kind: MatchKind::TokenOverlap,
        })
}

fn match_similarity<'a>(
    kb: &'a KnowledgeBase,
    message: &str,
    threshold: f64,
) -> Option<KbMatch<'a>> {
    let mut best: Option<(&str, &KnowledgeEntry, f64)> = None;
    for (keyword, entry) in kb.iter() {
        let score = ratio(keyword, message);
        let better = match best {
            Some((_, _, top)) => score > top,
            None => true,
        };
        if better {
            best = Some((keyword, entry, score));
        }
    }
    best.filter(|(_, _, score)| *score > threshold)
        .map(|(keyword, entry, score)| KbMatch {
            keyword,
            entry,
            kind: MatchKind::Similarity(score),
        })
}

/// Splits text into word-like tokens (`\w+`).
pub fn tokenize(text: &str) -> impl Iterator<Item = &str> {
    static WORD: OnceLock<Regex> = OnceLock::new();
    WORD.get_or_init(|| Regex::new(r"\w+").expect("word pattern is valid"))
        .find_iter(text)
        .map(|m| m.as_str())
}
