//! # Shared Constants
//!
//! Fixed replies, defaults and thresholds shared by the library, the server
//! and the CLI.

/// Returned for empty or whitespace-only input.
pub const ASK_QUESTION_MESSAGE: &str = "Please ask a question about crops, soil, or pests.";

/// Returned when neither the knowledge base nor the model produced an answer.
pub const NOT_FOUND_MESSAGE: &str =
    "I don't have that answer in my knowledge base. Try asking about a specific crop or pest.";

/// The language every knowledge base entry is expected to carry.
pub const DEFAULT_LANGUAGE: &str = "en";

/// Languages always present in a record-shaped knowledge entry.
pub const BASE_LANGUAGES: [&str; 3] = ["en", "hi", "ta"];

/// File name of the knowledge base, resolved next to the crate manifest by default.
pub const KB_FILE_NAME: &str = "kb.json";

/// Minimum similarity ratio a fuzzy match must strictly exceed.
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.55;

/// Message tokens must be longer than this (in characters) to count for token overlap.
pub const MIN_OVERLAP_TOKEN_CHARS: usize = 3;

/// Default per-call timeout for every external capability.
pub const DEFAULT_CAPABILITY_TIMEOUT_SECS: u64 = 15;

/// Default OpenAI-compatible chat completions endpoint.
pub const DEFAULT_MODEL_API_URL: &str = "https://api.openai.com/v1/chat/completions";

/// Default chat model.
pub const DEFAULT_MODEL_NAME: &str = "gpt-4o-mini";

/// Response length budget for the model fallback.
pub const DEFAULT_MAX_TOKENS: u32 = 300;
