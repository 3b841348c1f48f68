pub mod openai;

use crate::errors::CapabilityError;
use async_trait::async_trait;
use dyn_clone::DynClone;
use std::fmt::Debug;

/// A trait for interacting with a hosted language model.
///
/// The processor only reaches for a model when the knowledge base had no answer.
#[async_trait]
pub trait AiProvider: Send + Sync + Debug + DynClone {
    /// Generates a reply from a given system and user prompt.
    async fn generate(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<String, CapabilityError>;
}

dyn_clone::clone_trait_object!(AiProvider);
