//! Error types for backend API calls.

/// Result type alias for API operations.
pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Errors surfaced by backend API calls.
///
/// Transport failures (network, non-2xx status, unreadable bodies) are kept
/// distinct from API-level rejections (`success: false` with a server
/// message) so callers can tell the two apart.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// No session token is available. Checked before any network call.
    #[error("no session token available")]
    AuthMissing,

    /// A client-side precondition failed; the request was never sent.
    #[error("invalid selection: {0}")]
    InvalidSelection(String),

    /// The HTTP layer failed: connection error, non-2xx status, or a body
    /// that could not be decoded.
    #[error("transport failure: {0}")]
    Transport(String),

    /// The backend answered `success: false`. Display is the server-supplied
    /// message, verbatim.
    #[error("{0}")]
    Rejected(String),
}

impl ApiError {
    /// Returns true if a manual retry of the same call could succeed.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ApiError::Transport(_) | ApiError::Rejected(_))
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Transport(err.to_string())
    }
}
