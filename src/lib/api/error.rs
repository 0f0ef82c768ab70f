use reqwest::StatusCode;
use thiserror::Error;

/// Everything that can go wrong while talking to the backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// No response was received at all.
    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("request rejected ({status}): {message}")]
    Validation { status: StatusCode, message: String },
    #[error("server error ({status}): {message}")]
    Server { status: StatusCode, message: String },
    /// The token has already been dropped when this is returned.
    #[error("session expired, please log in again")]
    Unauthorized,
    #[error("{message}")]
    Rejected { message: String },
    #[error("response carried no data")]
    MissingData,
    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized)
    }
}
