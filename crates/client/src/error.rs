// crates/client/src/error.rs
use std::path::PathBuf;

use reqwest::StatusCode;
use thiserror::Error;

/// Transport-level failures talking to the backend or storage.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Failed to build HTTP client: {source}")]
    Client {
        #[source]
        source: reqwest::Error,
    },

    /// The request never produced a response (connect failure, timeout,
    /// interrupted body).
    #[error("Request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The endpoint answered with a non-success status.
    #[error("{url} returned {status}")]
    Status { url: String, status: StatusCode },

    /// The response body did not parse as the expected shape.
    #[error("Malformed response from {url}: {source}")]
    Body {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

impl ApiError {
    pub fn request(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Request {
            url: url.into(),
            source,
        }
    }

    pub fn body(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Body {
            url: url.into(),
            source,
        }
    }

    /// HTTP status of the failing response, when one arrived at all.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Local source-file problems, all detected before any network call.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("Unsupported file type: {path} (expected MPEG audio / .mp3)")]
    UnsupportedType { path: PathBuf },

    #[error("Not a regular file: {path}")]
    NotAFile { path: PathBuf },

    #[error("Source file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("Permission denied reading source file: {path}")]
    PermissionDenied { path: PathBuf },

    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl MediaError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound { path },
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            _ => Self::Io { path, source },
        }
    }
}

/// Submission failures, one variant per handoff step so callers can tell
/// which step went wrong.
#[derive(Debug, Error)]
pub enum SubmitError {
    /// The file failed the local type check; the backend was never contacted.
    #[error("Invalid file type: {path} (expected MPEG audio / .mp3)")]
    InvalidFileType { path: PathBuf },

    /// The source file could not be read.
    #[error(transparent)]
    Source(MediaError),

    /// Step 1 (presigned-URL acquisition) failed.
    #[error("Credential request failed: {source}")]
    CredentialRequestFailed {
        #[source]
        source: ApiError,
    },

    /// Step 2 (byte transfer to storage) failed.
    #[error("Upload transfer failed: {source}")]
    TransferFailed {
        #[source]
        source: ApiError,
    },

    /// Step 3 (job registration) failed.
    #[error("Job registration failed: {source}")]
    RegistrationFailed {
        #[source]
        source: ApiError,
    },

    /// The session was reset (or a new file selected) while this submission
    /// was in flight; its outcome was discarded.
    #[error("Submission superseded by a reset")]
    Superseded,

    /// Submit was called without a selected file.
    #[error("No file selected")]
    NoFileSelected,
}

impl From<MediaError> for SubmitError {
    fn from(err: MediaError) -> Self {
        match err {
            MediaError::UnsupportedType { path } => SubmitError::InvalidFileType { path },
            other => SubmitError::Source(other),
        }
    }
}
