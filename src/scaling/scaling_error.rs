use reqwest::StatusCode;
use serde_json::Error as JsonError;

#[derive(thiserror::Error, Debug)]
pub enum ScalingError {
    #[error("Credential error: {0}")]
    Credential(String),

    #[error("Identity resolution error: {0}")]
    IdentityResolution(String),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("JSON decode error: {0}")]
    Decode(#[from] JsonError),

    // GET 非 2xx
    #[error("Cloud Run API fetch failed ({0}): {1}")]
    FetchRejected(StatusCode, String),

    #[error("Cloud Run API response code: {}", .status.as_u16())]
    UpdateRejected { status: StatusCode, body: String },

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

#[derive(thiserror::Error, Debug)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("request cancelled")]
    Cancelled,
}

impl ScalingError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ScalingError::Transport(TransportError::Cancelled))
    }

    /// Status code observed on a rejected GET or PUT, if any.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ScalingError::FetchRejected(status, _) => Some(*status),
            ScalingError::UpdateRejected { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ScalingError {
    fn from(err: reqwest::Error) -> Self {
        ScalingError::Transport(TransportError::Request(err))
    }
}
