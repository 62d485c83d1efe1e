/*!
 * Error types for the subtran application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Errors that can occur when talking to the model backend
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// The requested model is neither installed nor pullable
    #[error("Model '{model}' is not available: {reason}")]
    ModelUnavailable {
        /// Model identifier
        model: String,
        /// Why the model could not be made available
        reason: String,
    },
}

/// Errors that can occur while loading or saving subtitle files
#[derive(Error, Debug)]
pub enum SubtitleError {
    /// The subtitle file does not exist
    #[error("Subtitle file not found: {0}")]
    NotFound(PathBuf),

    /// The subtitle file could not be read or written
    #[error("I/O error on {path}: {source}")]
    Io {
        /// File being accessed
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The content is neither SRT nor SSA
    #[error("Unrecognized subtitle format: {0}")]
    UnknownFormat(PathBuf),

    /// The content looked like a known format but could not be parsed
    #[error("Malformed subtitle content at line {line}: {message}")]
    Malformed {
        /// 1-based line number
        line: usize,
        /// What went wrong
        message: String,
    },
}

/// Per-attempt translation failures
///
/// These never escape the strategy ladder; they decide whether the next
/// strategy is tried.
#[derive(Error, Debug)]
pub enum TranslationError {
    /// Error from the provider API
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// The model answered but the translation field was missing or blank
    #[error("Empty translation response")]
    EmptyResponse,

    /// The response could not be mapped onto any caption
    #[error("No valid translations in response")]
    NoAlignedLines,

    /// The model call exceeded its per-call timeout
    #[error("Model call timed out after {0:?}")]
    Timeout(Duration),
}

/// Main application error type covering every fatal condition
#[derive(Error, Debug)]
pub enum AppError {
    /// The source subtitle file does not exist
    #[error("Source file {0} does not exist")]
    SourceNotFound(PathBuf),

    /// The source file loaded but holds no captions
    #[error("Not enough lines in subtitle file: {0}")]
    NoCaptions(PathBuf),

    /// The model could not be checked or pulled
    #[error("Error initializing model: {0}")]
    ModelUnavailable(#[source] ProviderError),

    /// The source file could not be loaded
    #[error("Error loading subtitle file: {0}")]
    Load(#[source] SubtitleError),

    /// The translated file could not be written
    #[error("Error saving translated subtitles: {0}")]
    Save(#[source] SubtitleError),

    /// The whole run exceeded its time budget
    #[error("Translation run exceeded {0:?}, nothing was saved")]
    Timeout(Duration),

    /// The run was interrupted
    #[error("Translation cancelled, nothing was saved")]
    Cancelled,

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl AppError {
    /// Process exit status for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::SourceNotFound(_) => 3,
            Self::NoCaptions(_) => 4,
            Self::ModelUnavailable(_) => 5,
            Self::Load(_) => 6,
            Self::Save(_) => 7,
            Self::Timeout(_) => 8,
            Self::Config(_) => 9,
            Self::Cancelled => 130,
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Config(error.to_string())
    }
}
