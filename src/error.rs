use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP request error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The token endpoint answered without a usable `access_token`.
    #[error("Token endpoint returned no access token ({status}): {body}")]
    MissingToken { status: StatusCode, body: String },

    /// Non-success status from a resource or mutation endpoint, body kept verbatim.
    #[error("Spotify API error ({status}): {body}")]
    Provider { status: StatusCode, body: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ApiError {
    /// HTTP status attached to the error, if the failure got as far as a response.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::MissingToken { status, .. } | ApiError::Provider { status, .. } => {
                Some(*status)
            }
            ApiError::Transport(e) => e.status(),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
