use roomlink_core::codec::encode_message;
use roomlink_core::{ConnectionParameters, IceCandidate, SessionDescription, SignalingMessage};
use serde_json::json;

pub const ROOM_URL: &str = "https://room.test";
pub const ROOM_ID: &str = "room1";
pub const CLIENT_ID: &str = "client1";
pub const WSS_URL: &str = "wss://ws.test/ws";
pub const WSS_POST_URL: &str = "https://ws.test";
pub const RELAY_URL: &str = "https://relay.test/iceconfig";

pub fn connection() -> ConnectionParameters {
    ConnectionParameters::new(ROOM_URL, ROOM_ID)
}

pub fn candidate(n: u16) -> IceCandidate {
    IceCandidate::new("0", 0, format!("candidate:{} 1 udp 2122260223 10.0.0.1 {} typ host", n, 50000 + n))
}

pub fn wire(message: &SignalingMessage) -> String {
    encode_message(message).unwrap()
}

/// Join answer as the room server sends it.
pub fn join_response(initiator: bool, messages: Vec<SignalingMessage>) -> String {
    join_response_with(initiator, messages, "", json!({ "iceServers": [] }))
}

pub fn join_response_with(
    initiator: bool,
    messages: Vec<SignalingMessage>,
    ice_server_url: &str,
    pc_config: serde_json::Value,
) -> String {
    let messages: Vec<String> = messages.iter().map(wire).collect();
    json!({
        "result": "SUCCESS",
        "params": {
            "client_id": CLIENT_ID,
            "wss_url": WSS_URL,
            "wss_post_url": WSS_POST_URL,
            "ice_server_url": ice_server_url,
            "is_initiator": if initiator { "true" } else { "false" },
            "messages": messages,
            "pc_config": pc_config.to_string(),
        }
    })
    .to_string()
}

/// Inbound socket frame wrapping a peer message.
pub fn socket_frame(message: &SignalingMessage) -> String {
    json!({ "msg": wire(message), "error": "" }).to_string()
}

pub fn remote_offer() -> SessionDescription {
    SessionDescription::offer("v=0 remote-offer")
}

pub fn remote_answer() -> SessionDescription {
    SessionDescription::answer("v=0 remote-answer")
}

pub fn message_url() -> String {
    format!("{}/message/{}/{}", ROOM_URL, ROOM_ID, CLIENT_ID)
}

pub fn leave_url() -> String {
    format!("{}/leave/{}/{}", ROOM_URL, ROOM_ID, CLIENT_ID)
}

pub fn socket_post_url() -> String {
    format!("{}/{}/{}", WSS_POST_URL, ROOM_ID, CLIENT_ID)
}
