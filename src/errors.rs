/*!
 * Error types for the xlation application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

// Allow dead code - error types are for library consumers
#![allow(dead_code)]

use std::time::Duration;
use thiserror::Error;

use crate::document::model::CellRef;

/// Errors that can occur when talking to a translation provider API
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails before a response arrives
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// The provider signalled that requests are arriving too fast
    #[error("Rate limit exceeded{}", retry_after.map(|d| format!(" (retry after {}s)", d.as_secs())).unwrap_or_default())]
    RateLimited {
        /// Server-specified delay before the next attempt, if any
        retry_after: Option<Duration>,
    },

    /// The response arrived but could not be used (wrong item count, empty payload)
    #[error("Malformed provider response: {0}")]
    MalformedResponse(String),

    /// Error with authentication (invalid or missing credential)
    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    /// The account's translation quota is exhausted
    #[error("Quota exhausted: {0}")]
    QuotaExhausted(String),
}

impl ProviderError {
    /// Whether the translation client may retry after this error.
    ///
    /// Authentication and quota failures are terminal for the whole job;
    /// everything else is worth another attempt after a backoff. API errors
    /// are retryable only for timeout, rate-limit and server-side statuses.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::RequestFailed(_) | Self::ConnectionError(_) => true,
            Self::RateLimited { .. } | Self::MalformedResponse(_) => true,
            Self::ApiError { status_code, .. } => {
                *status_code == 408 || *status_code == 429 || *status_code >= 500
            }
            Self::AuthenticationError(_) | Self::QuotaExhausted(_) => false,
        }
    }

    /// Server-specified delay to honor before the next attempt, if any
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimited { retry_after } => *retry_after,
            _ => None,
        }
    }
}

/// Errors that can occur while loading or saving a workbook
#[derive(Error, Debug)]
pub enum DocumentError {
    /// The file does not exist or cannot be opened for reading
    #[error("Cannot read file: {0}")]
    UnreadableFile(String),

    /// The file extension is not a supported spreadsheet format
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// The file exists but its contents could not be parsed
    #[error("Corrupted workbook: {0}")]
    Corrupted(String),

    /// The document was built in memory and has no backing workbook to patch
    #[error("Document has no backing workbook file")]
    NoBackingWorkbook,

    /// Writing the output file was denied by the filesystem
    #[error("Write permission denied: {0}")]
    WritePermission(String),

    /// The output device ran out of space
    #[error("Disk full while writing: {0}")]
    DiskFull(String),

    /// Any other I/O failure
    #[error("I/O error: {0}")]
    Io(String),
}

impl DocumentError {
    /// Map an I/O error to the closest taxonomy entry
    pub fn from_io(err: &std::io::Error, path: &str) -> Self {
        match err.kind() {
            std::io::ErrorKind::PermissionDenied => Self::WritePermission(path.to_string()),
            std::io::ErrorKind::StorageFull => Self::DiskFull(path.to_string()),
            std::io::ErrorKind::NotFound => Self::UnreadableFile(path.to_string()),
            _ => Self::Io(format!("{}: {}", path, err)),
        }
    }
}

/// Errors that can occur while writing translations back into the document
#[derive(Error, Debug)]
pub enum MergeError {
    /// A unit's recorded address no longer resolves to a text cell.
    /// This indicates an internal inconsistency and is never retried.
    #[error("Address {address} no longer resolves to a translatable cell")]
    AddressResolution {
        /// The offending address
        address: CellRef,
    },

    /// The translated batch does not line up with the recorded units
    #[error("Translated batch length {translated} does not match unit count {expected}")]
    LengthMismatch {
        /// Units recorded in the batch
        expected: usize,
        /// Strings received for it
        translated: usize,
    },
}

/// Terminal failure of a translation job
#[derive(Error, Debug)]
pub enum JobError {
    /// A provider call failed fatally or exhausted its retries
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Writing results back into the document failed
    #[error("Merge error: {0}")]
    Merge(#[from] MergeError),

    /// Loading or saving the workbook failed
    #[error("Document error: {0}")]
    Document(#[from] DocumentError),
}

impl JobError {
    /// Coarse failure class for user-facing messages
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Provider(ProviderError::AuthenticationError(_)) => ErrorCategory::Authentication,
            Self::Provider(ProviderError::QuotaExhausted(_)) => ErrorCategory::Quota,
            Self::Provider(_) => ErrorCategory::Network,
            Self::Merge(_) => ErrorCategory::Internal,
            Self::Document(_) => ErrorCategory::Internal,
        }
    }
}

/// User-facing failure classes, used to pick an actionable message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Credential problems - fix the API key
    Authentication,
    /// Quota exhausted - wait or upgrade the plan
    Quota,
    /// Network or provider trouble - usually worth retrying the job
    Network,
    /// Internal inconsistency - report a bug
    Internal,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Authentication => write!(f, "authentication"),
            Self::Quota => write!(f, "quota"),
            Self::Network => write!(f, "network"),
            Self::Internal => write!(f, "internal"),
        }
    }
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from a provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from workbook loading or saving
    #[error("Document error: {0}")]
    Document(#[from] DocumentError),

    /// Error from a translation job
    #[error("Job error: {0}")]
    Job(#[from] JobError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

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
