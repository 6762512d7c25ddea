/*!
 * Error types for the doctrans application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

/// Errors that can occur when talking to the inference endpoint
#[derive(Error, Debug)]
pub enum ClientError {
    /// The transport could not reach the endpoint at all
    #[error("Connection failed: {0}")]
    ConnectionFailure(String),

    /// The request exceeded the configured deadline
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// The endpoint was reachable but returned an error status,
    /// an unparseable body, or a body missing the result field
    #[error("API error ({status_code}): {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message or response body excerpt
        message: String,
    },

    /// All retry attempts exhausted; carries the last underlying error
    #[error("Translation failed after {attempts} attempts. Last error: {source}")]
    AggregateFailure {
        /// Number of attempts made
        attempts: u32,
        /// The error observed on the final attempt
        #[source]
        source: Box<ClientError>,
    },
}

impl ClientError {
    /// Whether a user-facing message should suggest checking the local service
    pub fn is_local_remediable(&self) -> bool {
        match self {
            Self::ConnectionFailure(_) | Self::Timeout(_) => true,
            Self::ApiError { .. } => false,
            Self::AggregateFailure { source, .. } => source.is_local_remediable(),
        }
    }
}

/// Errors that can occur when managing the local inference service process
#[derive(Error, Debug)]
pub enum ServiceError {
    /// The service operation did not complete within the allotted time
    #[error("Service operation timed out after {0}s")]
    Timeout(u64),

    /// The service command could not be run or exited abnormally
    #[error("Service command failed: {0}")]
    CommandFailed(String),
}

/// Errors that can occur while driving the translation pipeline
#[derive(Error, Debug)]
pub enum PipelineError {
    /// A slice could not be translated; carries a truncated preview of its content
    #[error("Failed to translate slice: {source}. Slice content: {preview}...")]
    SliceFailed {
        /// First characters of the failing slice, for debugging
        preview: String,
        /// The client error that aborted the run
        #[source]
        source: ClientError,
    },

    /// Writing to the output sink failed
    #[error("Output write failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from the inference client
    #[error("Client error: {0}")]
    Client(#[from] ClientError),

    /// Error from service management
    #[error("Service error: {0}")]
    Service(#[from] ServiceError),

    /// Error from the translation pipeline
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
