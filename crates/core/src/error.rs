//! Error type shared by the transport, the account session and the entity proxies.

use thiserror::Error;

/// Errors raised while talking to the Buy Me a Pie API.
#[derive(Debug, Error)]
pub enum Error {
    /// The HTTP request could not be performed at all.
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// A configured header value cannot be sent over HTTP.
    #[error("invalid value for header {name}")]
    Header {
        /// Header name.
        name: &'static str,
        /// Underlying header error.
        #[source]
        source: reqwest::header::InvalidHeaderValue,
    },

    /// A request body could not be serialised.
    #[error("failed to encode request body for {endpoint}")]
    Encode {
        /// Endpoint the body was meant for.
        endpoint: String,
        /// Underlying serde error.
        #[source]
        source: serde_json::Error,
    },

    /// The server answered with something that is not JSON.
    #[error("could not parse JSON for {url}")]
    Decode {
        /// Effective request URL.
        url: String,
        /// Raw response body.
        body: String,
        /// Underlying serde error.
        #[source]
        source: serde_json::Error,
    },

    /// The server answered with JSON of an unexpected shape.
    #[error("unexpected payload from {url}")]
    Payload {
        /// Effective request URL.
        url: String,
        /// Underlying serde error.
        #[source]
        source: serde_json::Error,
    },

    /// No list with the given id (or name) is known to the session.
    #[error("no list matching {0}")]
    UnknownList(String),

    /// No item with the given id exists in the list.
    #[error("no item {item} in list {list}")]
    UnknownItem {
        /// Owning list id.
        list: String,
        /// Item id.
        item: String,
    },
}

/// Convenience alias used across the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;
