use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Serialize, Deserialize, Clone, Hash, Eq, PartialEq)]
#[serde(transparent)]
pub struct RoomId(pub String);

impl RoomId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RoomId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle of the room membership.
///
/// `Error` is sticky: only a fresh session starts over at `New`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomState {
    New,
    Connected,
    Closed,
    Error,
}

/// What the caller supplies to join a room. Immutable for the whole call attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionParameters {
    pub room_url: String,
    pub room_id: RoomId,
    pub loopback: bool,
    pub url_parameters: Option<String>,
}

impl ConnectionParameters {
    pub fn new(room_url: impl Into<String>, room_id: impl Into<String>) -> Self {
        Self {
            room_url: room_url.into(),
            room_id: RoomId(room_id.into()),
            loopback: false,
            url_parameters: None,
        }
    }

    pub fn with_loopback(mut self, loopback: bool) -> Self {
        self.loopback = loopback;
        self
    }

    pub fn with_url_parameters(mut self, params: impl Into<String>) -> Self {
        self.url_parameters = Some(params.into());
        self
    }

    /// `{base}/join/{roomId}`, plus the extra query parameters if any.
    pub fn join_url(&self) -> String {
        let base = format!("{}/join/{}", self.room_url.trim_end_matches('/'), self.room_id);
        match self.url_parameters.as_deref() {
            Some(params) if !params.is_empty() => {
                format!("{}?{}", base, params.trim_start_matches('?'))
            }
            _ => base,
        }
    }

    pub fn message_url(&self, client_id: &str) -> String {
        format!(
            "{}/message/{}/{}",
            self.room_url.trim_end_matches('/'),
            self.room_id,
            client_id
        )
    }

    pub fn leave_url(&self, client_id: &str) -> String {
        format!(
            "{}/leave/{}/{}",
            self.room_url.trim_end_matches('/'),
            self.room_id,
            client_id
        )
    }
}
