use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReelcutError {
    #[error("Invalid input: {reason}")]
    Validation { reason: String },

    #[error("Media processing failed during {operation}: {reason}")]
    Processing {
        operation: &'static str,
        reason: String,
    },

    #[error("Media engine is busy, cannot start {operation} while another operation is running")]
    Busy { operation: &'static str },

    #[error("Media engine is not loaded, call load() before {operation}")]
    NotLoaded { operation: &'static str },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl ReelcutError {
    pub fn validation(reason: impl Into<String>) -> Self {
        Self::Validation {
            reason: reason.into(),
        }
    }

    pub fn processing(operation: &'static str, reason: impl Into<String>) -> Self {
        Self::Processing {
            operation,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ReelcutError>;
