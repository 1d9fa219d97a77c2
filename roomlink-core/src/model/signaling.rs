use crate::model::peer::ClientId;
use crate::model::room::RoomId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IceServerConfig {
    pub urls: Vec<String>,
    pub username: Option<String>,
    pub credential: Option<String>,
}

impl IceServerConfig {
    pub fn is_turn(&self) -> bool {
        self.urls.iter().any(|url| url.starts_with("turn:"))
    }
}

/// A trickled connectivity candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IceCandidate {
    pub sdp_mid: String,
    pub sdp_m_line_index: u16,
    pub sdp: String,
}

impl IceCandidate {
    pub fn new(sdp_mid: impl Into<String>, sdp_m_line_index: u16, sdp: impl Into<String>) -> Self {
        Self {
            sdp_mid: sdp_mid.into(),
            sdp_m_line_index,
            sdp: sdp.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SdpType {
    Offer,
    Answer,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionDescription {
    pub sdp_type: SdpType,
    pub sdp: String,
}

impl SessionDescription {
    pub fn offer(sdp: impl Into<String>) -> Self {
        Self {
            sdp_type: SdpType::Offer,
            sdp: sdp.into(),
        }
    }

    pub fn answer(sdp: impl Into<String>) -> Self {
        Self {
            sdp_type: SdpType::Answer,
            sdp: sdp.into(),
        }
    }
}

/// Everything exchanged with the peer over either signaling transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignalingMessage {
    Offer(SessionDescription),
    Answer(SessionDescription),
    Candidate(IceCandidate),
    RemoveCandidates(Vec<IceCandidate>),
    Bye,
    Error(String),
}

impl SignalingMessage {
    pub fn from_description(description: SessionDescription) -> Self {
        match description.sdp_type {
            SdpType::Offer => Self::Offer(description),
            SdpType::Answer => Self::Answer(description),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Offer(_) => "offer",
            Self::Answer(_) => "answer",
            Self::Candidate(_) => "candidate",
            Self::RemoveCandidates(_) => "remove-candidates",
            Self::Bye => "bye",
            Self::Error(_) => "error",
        }
    }
}

/// Socket-level commands. Only `Register` may precede registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Register { room_id: RoomId, client_id: ClientId },
    Send { message: String },
}

/// Result of a successful join. Read-only after parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignalingParameters {
    pub client_id: ClientId,
    pub wss_url: String,
    pub wss_post_url: String,
    pub ice_server_url: String,
    pub initiator: bool,
    pub offer: Option<SessionDescription>,
    pub candidates: Vec<IceCandidate>,
    pub ice_servers: Vec<IceServerConfig>,
}

impl SignalingParameters {
    /// `{wssPostUrl}/{roomId}/{clientId}`
    pub fn socket_post_url(&self, room_id: &RoomId) -> String {
        format!(
            "{}/{}/{}",
            self.wss_post_url.trim_end_matches('/'),
            room_id,
            self.client_id
        )
    }

    pub fn has_turn_server(&self) -> bool {
        self.ice_servers.iter().any(IceServerConfig::is_turn)
    }
}

/// Summary handed to the listener once the room is joined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomParameters {
    pub initiator: bool,
    pub ice_servers: Vec<IceServerConfig>,
}
