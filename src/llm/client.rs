use async_trait::async_trait;
use std::sync::Arc;

use crate::config::Settings;
use crate::llm::gemini::GeminiClient;
use crate::llm::GenerationError;

/// A hosted language model that turns a prompt into text.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Short provider name for logs
    fn name(&self) -> &str;

    /// Send one prompt and return the first candidate's text.
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}

/// Build an LLM provider from runtime settings.
pub fn build_provider(settings: &Settings) -> Result<Arc<dyn LlmProvider>, GenerationError> {
    match settings.llm.provider.to_lowercase().as_str() {
        "gemini" => Ok(Arc::new(GeminiClient::from_settings(settings)?)),
        other => Err(GenerationError::NotConfigured(format!(
            "Unsupported llm.provider '{}'. Supported providers: gemini",
            other
        ))),
    }
}
