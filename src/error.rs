//! Error types for pagesnap operations.

use thiserror::Error;

/// Result type alias for pagesnap operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during the launch-and-capture flow.
#[derive(Error, Debug)]
pub enum Error {
    /// Browser process failed to launch or initialize in time.
    #[error("launch error: {0}")]
    Launch(String),

    /// No usable browser binary at the configured path or on the system.
    #[error("browser not found: {0}")]
    BrowserNotFound(String),

    /// Operation attempted on a closed session or one of its pages.
    #[error("session closed")]
    SessionClosed,

    /// Navigation failed (network failure, invalid URL, or timeout).
    #[error("navigation to {url} failed: {reason}")]
    Navigation {
        /// Target URL of the failed navigation.
        url: String,
        /// Failure reason.
        reason: String,
    },

    /// Page could not be rendered to an image.
    #[error("capture error: {0}")]
    Capture(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Returns true if this error is retryable.
    ///
    /// Navigation and launch failures are often transient (slow network,
    /// cold machine). Use-after-close, capture, and config errors are not.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Navigation { .. } | Error::Launch(_))
    }
}
