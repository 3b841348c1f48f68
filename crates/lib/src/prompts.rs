//! # Model Fallback Prompts

use crate::types::UserProfile;

/// Persona sent as the system message on every fallback call.
pub const AGRONOMIST_SYSTEM_PROMPT: &str = "You are a helpful agronomist.";

/// Builds the user message for the model fallback: the profile as JSON, then the question.
pub fn build_fallback_prompt(profile: &UserProfile, question: &str) -> String {
    let profile_json = serde_json::to_string(profile).unwrap_or_else(|_| "{}".to_string());
    format!(
        "You are an expert agronomist.\n\
         User profile: {profile_json}\n\
         Question: {question}\n\
         Answer concisely and clearly."
    )
}
