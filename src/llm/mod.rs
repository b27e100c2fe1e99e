//! LLM module for recap
//!
//! Handles AI-powered transcript summaries using the Gemini API.

mod client;
mod error;
mod gemini;
mod prompts;
mod summary;

pub use client::{build_provider, LlmProvider};
pub use error::GenerationError;
pub use gemini::GeminiClient;
pub use prompts::build_summary_prompt;
pub use summary::{
    parse_sections, truncate_chars, SummaryGenerator, SummaryOutcome, SummarySections,
    MAX_TRANSCRIPT_CHARS, MIN_SUMMARY_CHARS,
};
