// ABOUTME: Typed error enum for backend calls.
// ABOUTME: Transport, status, and decode failures all surface to the user the same way.

use thiserror::Error;

/// Errors from talking to the bot backend.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("HTTP status {code}: {body}")]
    Status { code: u16, body: String },
    #[error("unexpected response from {endpoint}: {source}")]
    Decode {
        endpoint: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("client initialization failed: {0}")]
    ClientInit(String),
}
