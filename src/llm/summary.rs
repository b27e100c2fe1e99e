//! Transcript summarization on top of an [`LlmProvider`]
//!
//! The primary path truncates the transcript and returns typed errors. The
//! fallback path sends the whole transcript and never fails, reporting a
//! [`SummaryOutcome`] instead.

use regex::Regex;
use std::sync::{Arc, OnceLock};
use tracing::{info, warn};

use crate::config::Settings;
use crate::llm::client::{build_provider, LlmProvider};
use crate::llm::prompts::build_summary_prompt;
use crate::llm::GenerationError;

/// Maximum transcript characters forwarded upstream on the primary path
pub const MAX_TRANSCRIPT_CHARS: usize = 32_000;

/// Shortest summary accepted as a real result
pub const MIN_SUMMARY_CHARS: usize = 20;

/// Sections parsed out of a model reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummarySections {
    pub summary: String,
    pub topics: Vec<String>,
    pub insights: Vec<String>,
}

/// Result of the fallback path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SummaryOutcome {
    Generated(String),
    Failed { reason: String },
}

impl SummaryOutcome {
    pub fn summary(&self) -> Option<&str> {
        match self {
            Self::Generated(summary) => Some(summary),
            Self::Failed { .. } => None,
        }
    }
}

#[derive(Clone)]
pub struct SummaryGenerator {
    provider: Arc<dyn LlmProvider>,
    max_chars: usize,
}

impl SummaryGenerator {
    pub fn new(provider: Arc<dyn LlmProvider>) -> Self {
        Self {
            provider,
            max_chars: MAX_TRANSCRIPT_CHARS,
        }
    }

    /// Build a generator from settings; fails when no provider can be built.
    pub fn from_settings(settings: &Settings) -> Result<Self, GenerationError> {
        let provider = build_provider(settings)?;
        Ok(Self::new(provider).with_max_chars(settings.llm.max_transcript_chars))
    }

    pub fn with_max_chars(mut self, max_chars: usize) -> Self {
        self.max_chars = max_chars.max(1);
        self
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Summarize a transcript, truncating it to the character budget.
    pub async fn generate(&self, transcript: &str) -> Result<String, GenerationError> {
        Ok(self.generate_sections(transcript).await?.summary)
    }

    /// Like [`generate`](Self::generate) but keeps topics and insights.
    pub async fn generate_sections(
        &self,
        transcript: &str,
    ) -> Result<SummarySections, GenerationError> {
        if transcript.trim().is_empty() {
            return Err(GenerationError::EmptyTranscript);
        }

        let text = truncate_chars(transcript, self.max_chars);
        if text.len() < transcript.len() {
            info!(
                original_chars = transcript.chars().count(),
                kept_chars = self.max_chars,
                "Transcript truncated"
            );
        }

        self.request(text).await
    }

    /// Fallback summarization: no truncation, never returns an error.
    pub async fn generate_untruncated(&self, transcript: &str) -> SummaryOutcome {
        if transcript.trim().is_empty() {
            return SummaryOutcome::Failed {
                reason: GenerationError::EmptyTranscript.to_string(),
            };
        }

        match self.request(transcript).await {
            Ok(sections) => SummaryOutcome::Generated(sections.summary),
            Err(e) => {
                warn!(error = %e, "Fallback summary generation failed");
                SummaryOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }

    async fn request(&self, text: &str) -> Result<SummarySections, GenerationError> {
        let prompt = build_summary_prompt(text);
        let reply = self.provider.generate(&prompt).await?;
        parse_sections(&reply)
    }
}

/// Keep at most `max_chars` characters from the start of `text`.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

fn summary_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)SUMMARY:\s*(.*?)\s*(?:TOPICS:|$)").unwrap())
}

fn topics_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)TOPICS:\s*(.*?)\s*(?:INSIGHTS:|$)").unwrap())
}

fn insights_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)INSIGHTS:\s*(.*)$").unwrap())
}

/// Parse a model reply into its labeled sections.
///
/// Only the summary is required; it must be at least
/// [`MIN_SUMMARY_CHARS`] characters after trimming.
pub fn parse_sections(reply: &str) -> Result<SummarySections, GenerationError> {
    let summary = summary_re()
        .captures(reply)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| s.chars().count() >= MIN_SUMMARY_CHARS)
        .ok_or(GenerationError::InvalidSummary)?;

    let topics = topics_re()
        .captures(reply)
        .and_then(|caps| caps.get(1))
        .map(|m| {
            m.as_str()
                .split([',', '\n'])
                .map(strip_list_marker)
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    let insights = insights_re()
        .captures(reply)
        .and_then(|caps| caps.get(1))
        .map(|m| {
            m.as_str()
                .lines()
                .map(strip_list_marker)
                .filter(|line| !line.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    Ok(SummarySections {
        summary,
        topics,
        insights,
    })
}

fn strip_list_marker(item: &str) -> &str {
    item.trim()
        .trim_start_matches(['-', '*', '•'])
        .trim()
        .trim_matches(|c| c == '[' || c == ']')
        .trim()
}
