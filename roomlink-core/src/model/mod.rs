mod peer;
mod room;
mod signaling;
mod socket;

pub use peer::ClientId;
pub use room::{ConnectionParameters, RoomId, RoomState};
pub use signaling::{
    Command, IceCandidate, IceServerConfig, RoomParameters, SdpType, SessionDescription,
    SignalingMessage, SignalingParameters,
};
pub use socket::SocketState;
