//! # Rule-Based Responder
//!
//! A keyword responder with no knowledge file and no external services. Each
//! category has a couple of canned replies and one is picked at random.

use crate::knowledge::matcher::tokenize;
use rand::seq::SliceRandom;
use rand::Rng;

/// A reply category, checked in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Greeting,
    Fertilizer,
    Pest,
    Weather,
    Default,
}

impl Category {
    /// The canned replies for this category.
    pub fn replies(self) -> &'static [&'static str] {
        match self {
            Category::Greeting => &[
                "Hello! I'm your agriculture assistant. 🌱 How can I help you today?",
                "Hi there! Ask me anything about farming and crops. 🚜",
            ],
            Category::Fertilizer => &[
                "For better yield, use organic compost and nitrogen-rich fertilizer like urea.",
                "Consider using phosphorus and potassium-based fertilizers for root growth.",
            ],
            Category::Pest => &[
                "Neem oil spray is effective for many pests.",
                "Introduce natural predators like ladybugs to control pest population.",
            ],
            Category::Weather => &[
                "Please check the local forecast before sowing seeds.",
                "Avoid watering plants if heavy rain is predicted.",
            ],
            Category::Default => &[
                "I'm not sure about that. Could you please rephrase?",
                "Sorry, I don't understand. Can you ask another question?",
            ],
        }
    }
}

const GREETING_WORDS: [&str; 2] = ["hello", "hi"];

/// Classifies input into a [`Category`] and answers with one of its replies.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordResponder;

impl KeywordResponder {
    pub fn new() -> Self {
        Self
    }

    /// Case-insensitive classification. Greetings must be whole words; the
    /// topic keywords may appear anywhere (so "pesticide" counts as `Pest`).
    pub fn classify(&self, input: &str) -> Category {
        let input = input.to_lowercase();
        if tokenize(&input).any(|t| GREETING_WORDS.contains(&t)) {
            Category::Greeting
        } else if input.contains("fertilizer") {
            Category::Fertilizer
        } else if input.contains("pest") {
            Category::Pest
        } else if input.contains("weather") {
            Category::Weather
        } else {
            Category::Default
        }
    }

    /// Replies to `input` using the thread-local random generator.
    pub fn respond(&self, input: &str) -> &'static str {
        self.respond_with(input, &mut rand::thread_rng())
    }

    /// Replies to `input` using `rng` to choose among the category's replies.
    pub fn respond_with<R: Rng + ?Sized>(&self, input: &str, rng: &mut R) -> &'static str {
        let replies = self.classify(input).replies();
        replies.choose(rng).copied().unwrap_or(replies[0])
    }
}
