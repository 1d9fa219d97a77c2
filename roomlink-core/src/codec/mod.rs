//! JSON shapes spoken with the room server and over the signaling socket.

mod join;
mod wire;

pub use join::{decode_ice_servers, decode_join_response, decode_post_result};
pub use wire::{decode_message, decode_socket_frame, encode_command, encode_message};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("malformed {context} JSON: {source}. Text: {raw}")]
    Json {
        context: &'static str,
        raw: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("room join rejected: {0}")]
    JoinRejected(String),

    #[error("join response has no params: {0}")]
    MissingParams(String),

    #[error("unexpected message: {0}")]
    UnexpectedMessage(String),

    #[error("{0} messages are never sent on the wire")]
    Unencodable(&'static str),
}

impl CodecError {
    pub(crate) fn json(context: &'static str, raw: &str, source: serde_json::Error) -> Self {
        Self::Json {
            context,
            raw: raw.to_owned(),
            source,
        }
    }
}
