//! Stdio transport error types.

use pinhub_domain::error::PinHubError;

/// Errors specific to the stdio transport.
#[derive(Debug, thiserror::Error)]
pub enum StdioError {
    /// Reading from or writing to the stream failed.
    #[error("stream IO error")]
    Io(#[from] std::io::Error),

    /// An outbound message could not be encoded.
    #[error("failed to encode outbound message")]
    Encode(#[from] serde_json::Error),

    /// A domain-level error (validation, storage, etc.).
    #[error("domain error")]
    Domain(#[from] PinHubError),
}

impl StdioError {
    /// Convert into a [`PinHubError`] for propagation across port boundaries.
    pub fn into_domain(self) -> PinHubError {
        match self {
            Self::Domain(err) => err,
            other => PinHubError::Storage(Box::new(other)),
        }
    }
}

impl From<StdioError> for PinHubError {
    fn from(err: StdioError) -> Self {
        err.into_domain()
    }
}
