//! Error types for rapid_keywords
//!
//! Only configuration problems are fatal to an evaluation. Document and
//! collaborator problems are recovered by the stage that meets them and
//! surface here mostly for diagnostics and logging.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, KeywordError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum KeywordError {
    /// Document has no tokens or carries inverted offsets
    #[error("Unusable document: {message}")]
    InvalidDocument { message: String },

    /// An option is out of range
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// The external annotation collaborator failed or returned malformed data
    #[error("Collaborator failure for {subject:?}: {message}")]
    Collaborator { subject: String, message: String },

    /// Annotated document or config could not be read or written as JSON
    #[error("Malformed JSON: {message}")]
    Json { message: String },
}

impl KeywordError {
    pub fn invalid_document(message: impl Into<String>) -> Self {
        Self::InvalidDocument {
            message: message.into(),
        }
    }

    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Collaborator failure for `subject`, usually the entity text
    pub fn collaborator(subject: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Collaborator {
            subject: subject.into(),
            message: message.into(),
        }
    }

    pub fn json(message: impl Into<String>) -> Self {
        Self::Json {
            message: message.into(),
        }
    }

    /// Whether the pipeline skips past this error instead of aborting
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::InvalidDocument { .. } | Self::Collaborator { .. })
    }
}

impl From<serde_json::Error> for KeywordError {
    fn from(err: serde_json::Error) -> Self {
        Self::json(err.to_string())
    }
}
