use roomlink_core::{CodecError, RoomState};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("HTTP request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP {status} from {url}: {body}")]
    Status {
        url: String,
        status: u16,
        body: String,
    },

    #[error("request to {0} timed out")]
    Timeout(String),

    #[error("WebSocket connect to {url} failed: {reason}")]
    Connect { url: String, reason: String },

    #[error("WebSocket writer is gone")]
    SocketGone,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("operation requires room state {expected:?}, found {actual:?}")]
    InvalidState {
        expected: RoomState,
        actual: RoomState,
    },

    #[error("session task has shut down")]
    Closed,

    #[error("timed out waiting for the socket to close")]
    LeaveTimeout,

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Codec(#[from] CodecError),
}
