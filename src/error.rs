use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during recipe import operations
#[derive(Error, Debug)]
pub enum ImportError {
    /// The source URL could not be reached or answered with a non-success status
    #[error("Failed to fetch {url}: {reason}")]
    FetchError { url: String, reason: String },

    /// The payload does not match any recognized dialect
    #[error("Unrecognized format: {0}")]
    FormatError(String),

    /// The caller supplied an unusable input (empty URL, empty upload)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Builder configuration error
    #[error("Builder error: {0}")]
    BuilderError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(#[from] config::ConfigError),

    /// Reading an input file failed
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Serializing a result failed
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl ImportError {
    /// HTTP status a web handler should answer with for this error.
    ///
    /// Anything the caller can fix (unreachable page, unrecognized upload,
    /// missing input) maps to 400; everything else is a 500.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ImportError::FetchError { .. }
            | ImportError::FormatError(_)
            | ImportError::InvalidInput(_)
            | ImportError::BuilderError(_) => StatusCode::BAD_REQUEST,
            ImportError::ConfigError(_)
            | ImportError::IoError(_)
            | ImportError::SerializationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// `{ "error": "..." }` body returned alongside [`ImportError::status_code`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl From<&ImportError> for ErrorBody {
    fn from(err: &ImportError) -> Self {
        ErrorBody {
            error: err.to_string(),
        }
    }
}
