//! Error kinds for the remote spreadsheet and the record stores.
//!
//! Remote failures are returned as values so the store adapter can inspect
//! the kind and decide to fall back to the local file.

use reqwest::StatusCode;

/// Failure talking to the remote spreadsheet service (or its token endpoint).
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    /// Credentials were rejected or could not be turned into a token.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// The request never produced an HTTP response.
    #[error("network error: {0}")]
    Network(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// The service answered, but not with what we expected.
    #[error("unexpected response: {0}")]
    Protocol(String),
}

impl RemoteError {
    /// Maps a non-success HTTP status and its body to an error kind.
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let detail = format!("status {}: {}", status.as_u16(), body.trim());
        match status {
            StatusCode::UNAUTHORIZED => RemoteError::Auth(detail),
            StatusCode::FORBIDDEN => RemoteError::PermissionDenied(detail),
            StatusCode::NOT_FOUND => RemoteError::NotFound(detail),
            _ => RemoteError::Protocol(detail),
        }
    }
}

impl From<reqwest::Error> for RemoteError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            RemoteError::Protocol(e.to_string())
        } else {
            RemoteError::Network(e.to_string())
        }
    }
}

/// Failure of a [`RecordStore`](crate::store::RecordStore) operation.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error("local store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("local store CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Invalid(#[from] crate::reading::ValidationError),
}
