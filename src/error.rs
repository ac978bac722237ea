//! Error types for scangate.

/// Errors returned by scangate setup and I/O paths.
///
/// Verification failures never surface here: the verification client absorbs
/// transport and body errors into a `VerificationError` outcome, so a running
/// session always resolves every scan to a displayable result.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Network error.
    #[error("Network error: {0}")]
    Network(String),
}

/// Result type for scangate operations.
pub type Result<T> = std::result::Result<T, Error>;
