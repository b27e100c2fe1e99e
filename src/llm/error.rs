use thiserror::Error;

/// Failures of the summary pipeline
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Transcript is empty")]
    EmptyTranscript,

    #[error("{0}")]
    NotConfigured(String),

    #[error("Invalid API key - please check your Gemini API key configuration")]
    InvalidApiKey,

    #[error("API access forbidden - the API key may not have access to this model")]
    Forbidden,

    #[error("Rate limit exceeded - please try again later")]
    RateLimited,

    #[error("Gemini API error: {status} - {body}")]
    Upstream { status: u16, body: String },

    #[error("Gemini request timed out after {0} seconds")]
    Timeout(u64),

    #[error("Gemini request failed: {0}")]
    Request(String),

    #[error("Failed to parse Gemini response: {0}")]
    MalformedResponse(String),

    #[error("No text in Gemini response")]
    EmptyResponse,

    #[error("Invalid or too short summary generated")]
    InvalidSummary,
}

impl GenerationError {
    /// Map a non-success upstream status to an error.
    pub fn from_status(status: u16, body: &str) -> Self {
        match status {
            401 => Self::InvalidApiKey,
            403 => Self::Forbidden,
            429 => Self::RateLimited,
            _ => Self::Upstream {
                status,
                body: body.chars().take(200).collect(),
            },
        }
    }

    /// Whether a later attempt with the same input may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout(_) | Self::RateLimited => true,
            Self::Upstream { status, .. } => *status >= 500,
            _ => false,
        }
    }
}
