//! Server errors.

use thiserror::Error;

/// Errors raised while setting up or running the server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The listener could not be bound.
    #[error("cannot bind {addr}: {reason}")]
    Bind {
        /// The configured address.
        addr: String,
        /// Why binding failed.
        reason: String,
    },

    /// A redirect target is not an absolute `http`/`https` URL.
    #[error("invalid redirect base url {url:?}: {reason}")]
    InvalidBaseUrl {
        /// The rejected URL.
        url: String,
        /// Why it was rejected.
        reason: String,
    },

    /// An I/O error while serving.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
