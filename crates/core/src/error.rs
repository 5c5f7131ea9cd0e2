//! Unified error types for cfpdf.
//!
//! Fetch misses and extraction anomalies never show up here: they are
//! absorbed by the pipeline. What remains are input problems and faults.

/// Unified error types for the cfpdf crates.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid input parameters (e.g., non-numeric contest id).
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// Invalid URL.
    #[error("INVALID_URL: {0}")]
    InvalidUrl(String),

    /// HTTP client could not be constructed.
    #[error("HTTP_ERROR: {0}")]
    HttpError(String),

    /// Every candidate URL and identity was tried without success.
    #[error("FETCH_EXHAUSTED: {0}")]
    FetchExhausted(String),

    /// Reflow or PDF synthesis failed.
    #[error("RENDER_FAILED: {0}")]
    RenderFailed(String),

    /// Building the batch archive failed.
    #[error("ARCHIVE_FAILED: {0}")]
    ArchiveFailed(String),

    /// Writing to the output directory failed.
    #[error("IO_ERROR: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Stable code prefix, used by front ends that log or map errors.
    pub fn code(&self) -> &'static str {
        match self {
            Error::InvalidInput(_) => "INVALID_INPUT",
            Error::InvalidUrl(_) => "INVALID_URL",
            Error::HttpError(_) => "HTTP_ERROR",
            Error::FetchExhausted(_) => "FETCH_EXHAUSTED",
            Error::RenderFailed(_) => "RENDER_FAILED",
            Error::ArchiveFailed(_) => "ARCHIVE_FAILED",
            Error::Io(_) => "IO_ERROR",
        }
    }
}
