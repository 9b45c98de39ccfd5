//! Error types for research operations

use thiserror::Error;

/// Research tool errors
///
/// The first six variants are the failure taxonomy surfaced to callers; the
/// rest wrap lower-level failures.
#[derive(Debug, Error)]
pub enum ResearchError {
    /// Provider returned an empty or absent result
    #[error("{0}")]
    NoData(String),

    /// An expected label or column is absent from an otherwise non-empty result
    #[error("{0}")]
    MissingField(String),

    /// Data present but too little of it qualifies for the statistic
    #[error("{0}")]
    InsufficientData(String),

    /// Provider failed or returned an error document
    #[error("{0}")]
    Upstream(String),

    /// Rate limit exceeded for a provider
    #[error("Rate limit exceeded for {provider}")]
    RateLimited { provider: String },

    /// A downstream text response could not be interpreted
    #[error("{message}")]
    ParseFailure { message: String, raw_output: String },

    /// Invalid tool parameters
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    /// Network or HTTP error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// LLM provider error
    #[error("LLM error: {0}")]
    Llm(#[from] research_llm::LLMError),

    /// Indicator computation error
    #[error("Indicator error: {0}")]
    Indicator(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias for research operations
pub type Result<T> = std::result::Result<T, ResearchError>;

/// Convert ResearchError to the tool-level error, keeping raw model output
impl From<ResearchError> for research_tools::Error {
    fn from(err: ResearchError) -> Self {
        match err {
            ResearchError::InvalidParameters(msg) => research_tools::Error::InvalidParameters(msg),
            ResearchError::ParseFailure {
                message,
                raw_output,
            } => research_tools::Error::Failed {
                message,
                raw_output: Some(raw_output),
            },
            other => research_tools::Error::failed(other.to_string()),
        }
    }
}
