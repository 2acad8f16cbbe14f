use reqwest::StatusCode;
use thiserror::Error;

use crate::sync::gateway::Endpoint;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Login rejected ({status}): {reason}")]
    Auth { status: StatusCode, reason: String },

    #[error("{endpoint} failed with status {status}")]
    Remote { endpoint: Endpoint, status: StatusCode },

    #[error("{endpoint} request failed: {source}")]
    Transport {
        endpoint: Endpoint,
        #[source]
        source: BoxError,
    },

    #[error("Unexpected {endpoint} payload: {source}")]
    Decode {
        endpoint: Endpoint,
        #[source]
        source: serde_json::Error,
    },

    #[error("Not logged in")]
    NotLoggedIn,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Keyring error: {0}")]
    Keyring(String),
}

pub type Result<T> = std::result::Result<T, Error>;
