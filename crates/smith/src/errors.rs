use serde::{Deserialize, Serialize};
use thiserror::Error;

#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Deserialize, Serialize)]
pub enum SmithError {
    #[error("Input cannot be empty")]
    EmptyInput,

    #[error("Input exceeds maximum length of {max} characters (got {length})")]
    InputTooLong { length: usize, max: usize },

    #[error("Template '{template}' expects {expected} subject(s), got {actual}")]
    SubjectCount {
        template: String,
        expected: usize,
        actual: usize,
    },

    #[error("Rate limit exceeded. Please try again later")]
    RateLimitExceeded,

    #[error("Max retries exceeded after {attempts} attempts. Please try again later")]
    MaxRetriesExceeded { attempts: u32 },

    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Context length exceeded. Message: {0}")]
    ContextLengthExceeded(String),

    #[error("Server error ({status}): {message}")]
    ServerError { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Compilation failed: {0}")]
    CompilationFailed(String),

    #[error("Template error: {0}")]
    Template(String),

    #[error("Unknown error: {0}")]
    UnknownError(String),

    #[error("Transport error: {0}")]
    TransportError(String),
}

impl SmithError {
    /// Stable, machine readable name of the error kind
    pub fn kind(&self) -> &'static str {
        match self {
            SmithError::EmptyInput => "empty_input",
            SmithError::InputTooLong { .. } => "input_too_long",
            SmithError::SubjectCount { .. } => "subject_count",
            SmithError::RateLimitExceeded => "rate_limit_exceeded",
            SmithError::MaxRetriesExceeded { .. } => "max_retries_exceeded",
            SmithError::AuthenticationError(_) => "authentication_error",
            SmithError::InvalidRequest(_) => "invalid_request",
            SmithError::ContextLengthExceeded(_) => "context_length_exceeded",
            SmithError::ServerError { .. } => "server_error",
            SmithError::InvalidResponse(_) => "invalid_response",
            SmithError::CompilationFailed(_) => "compilation_failed",
            SmithError::Template(_) => "template_error",
            SmithError::UnknownError(_) => "unknown_error",
            SmithError::TransportError(_) => "transport_error",
        }
    }

    /// Errors raised locally before any network call
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            SmithError::EmptyInput | SmithError::InputTooLong { .. } | SmithError::SubjectCount { .. }
        )
    }
}

impl From<reqwest::Error> for SmithError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            SmithError::InvalidResponse(err.to_string())
        } else {
            SmithError::TransportError(err.to_string())
        }
    }
}

impl From<tera::Error> for SmithError {
    fn from(err: tera::Error) -> Self {
        SmithError::Template(err.to_string())
    }
}

pub type SmithResult<T> = Result<T, SmithError>;
