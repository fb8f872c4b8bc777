use crate::models::SnippetId;
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SnipjarError {
    /// The store could not be read or written.
    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Snippet not found: {0}")]
    NotFound(SnippetId),

    /// An import document was not a well-formed snippet array.
    #[error("Import format error: {0}")]
    ImportFormat(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Clipboard error: {0}")]
    Clipboard(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// No id greater than the largest one in use is left.
    #[error("No snippet id left after {0}")]
    IdsExhausted(SnippetId),
}

impl SnipjarError {
    /// Short message for the notice line of the UI.
    pub fn user_message(&self) -> String {
        match self {
            Self::Persistence(msg) => format!("Failed to save snippets: {}", msg),
            Self::NotFound(_) => "Snippet no longer exists".to_string(),
            Self::ImportFormat(_) => "Error importing file: Invalid JSON format".to_string(),
            Self::Io(e) => format!("File error: {}", e),
            Self::Json(e) => format!("Data format error: {}", e),
            Self::Clipboard(msg) => format!("Could not copy to clipboard: {}", msg),
            Self::InvalidConfig(msg) => msg.clone(),
            Self::IdsExhausted(_) => "Cannot create a snippet: no ids left".to_string(),
        }
    }

    /// Errors that leave the session untouched and only deserve a warning.
    pub fn is_recoverable_noop(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, SnipjarError>;
