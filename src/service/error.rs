use thiserror::Error;

use crate::service::client::Endpoint;

pub const ANALYZE_FAILED: &str = "Failed to analyze question";
pub const GENERATE_FAILED: &str = "Failed to generate test";

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{endpoint} request failed: {source}")]
    Transport {
        endpoint: Endpoint,
        #[source]
        source: reqwest::Error,
    },

    #[error("{endpoint} returned HTTP {status}: {message}")]
    Status {
        endpoint: Endpoint,
        status: u16,
        message: String,
    },

    #[error("{endpoint} sent an unreadable body: {source}")]
    Decode {
        endpoint: Endpoint,
        #[source]
        source: serde_json::Error,
    },

    #[error("{endpoint} reported an error: {message}")]
    Rejected { endpoint: Endpoint, message: String },
}

impl ServiceError {
    pub fn endpoint(&self) -> Endpoint {
        match self {
            ServiceError::Transport { endpoint, .. }
            | ServiceError::Status { endpoint, .. }
            | ServiceError::Decode { endpoint, .. }
            | ServiceError::Rejected { endpoint, .. } => *endpoint,
        }
    }

    /// Short text suitable for a one-line status display.
    pub fn user_message(&self) -> String {
        match self {
            ServiceError::Transport { .. } => "service unreachable".to_string(),
            ServiceError::Status { message, .. } | ServiceError::Rejected { message, .. } => {
                message.clone()
            }
            ServiceError::Decode { .. } => "unexpected response from service".to_string(),
        }
    }
}
