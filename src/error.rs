//! Error taxonomy for the entitlement and content core.
//!
//! Only `CoreError::LocalStore` is fatal to a calling operation: it means the
//! on-device durability guarantee cannot be honored. Remote failures are a
//! separate type, caught at the replication/usage/subscription boundaries and
//! recovered to local fallbacks.

use thiserror::Error;

/// Errors surfaced to callers of the core.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The local durable store failed. The calling operation must be
    /// reported as failed; there is no fallback for local durability.
    #[error("local store failure: {0}")]
    LocalStore(String),

    /// A record could not be serialized or deserialized.
    #[error("serialization failure: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<rusqlite::Error> for CoreError {
    fn from(e: rusqlite::Error) -> Self {
        Self::LocalStore(e.to_string())
    }
}

/// Errors at the remote store boundary. Never escape the core: every caller
/// routes them to a cached/local/zeroed fallback.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// Network-level failure (unreachable host, TLS, timeout).
    #[error("remote unreachable: {0}")]
    Unreachable(String),

    /// The remote answered with a non-success status.
    #[error("remote error: HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The remote answered but the payload did not decode.
    #[error("remote decode failure: {0}")]
    Decode(String),

    /// The remote store is not configured for this installation.
    #[error("remote store not configured")]
    NotConfigured,
}

impl From<reqwest::Error> for RemoteError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            Self::Decode(e.to_string())
        } else {
            Self::Unreachable(e.to_string())
        }
    }
}
