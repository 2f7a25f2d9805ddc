//! Error types and handling for the `TourChat` backend

use thiserror::Error;

/// Main error type for the `TourChat` backend
#[derive(Error, Debug)]
pub enum TourChatError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// A language tag with no registered profile
    #[error("Unsupported language: '{tag}'")]
    UnsupportedLanguage { tag: String },

    /// Completion service communication errors
    #[error("API error: {message}")]
    Api { message: String },

    /// An external call that exceeded its time budget
    #[error("Timed out after {seconds}s: {operation}")]
    Timeout { operation: String, seconds: u64 },

    /// Input validation errors
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// History or user storage errors
    #[error("Storage error: {message}")]
    Storage { message: String },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl TourChatError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new unsupported language error
    pub fn unsupported_language<S: Into<String>>(tag: S) -> Self {
        Self::UnsupportedLanguage { tag: tag.into() }
    }

    /// Create a new API error
    pub fn api<S: Into<String>>(message: S) -> Self {
        Self::Api {
            message: message.into(),
        }
    }

    /// Create a new timeout error
    pub fn timeout<S: Into<String>>(operation: S, seconds: u64) -> Self {
        Self::Timeout {
            operation: operation.into(),
            seconds,
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new storage error
    pub fn storage<S: Into<String>>(message: S) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            TourChatError::Config { .. } => {
                "Configuration error. Please check your config file and API keys.".to_string()
            }
            TourChatError::UnsupportedLanguage { tag } => {
                format!("Language '{tag}' is not supported.")
            }
            TourChatError::Api { .. } | TourChatError::Timeout { .. } => {
                "Unable to reach the language model service. Please try again later.".to_string()
            }
            TourChatError::Validation { message } => message.clone(),
            TourChatError::Storage { .. } => {
                "Conversation storage is unavailable. Please try again later.".to_string()
            }
            TourChatError::Io { .. } => {
                "File operation failed. Please check file permissions.".to_string()
            }
        }
    }
}

impl From<fjall::Error> for TourChatError {
    fn from(err: fjall::Error) -> Self {
        TourChatError::storage(err.to_string())
    }
}

impl From<postcard::Error> for TourChatError {
    fn from(err: postcard::Error) -> Self {
        TourChatError::storage(format!("record encoding failed: {err}"))
    }
}

impl From<tokio::task::JoinError> for TourChatError {
    fn from(err: tokio::task::JoinError) -> Self {
        TourChatError::storage(format!("storage task failed: {err}"))
    }
}
