use crate::codec::CodecError;
use crate::model::{Command, IceCandidate, SessionDescription, SignalingMessage};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
enum WireMessage {
    Offer { sdp: String },
    Answer { sdp: String },
    Candidate(WireCandidate),
    RemoveCandidates { candidates: Vec<WireCandidate> },
    Bye,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireCandidate {
    label: u16,
    id: String,
    candidate: String,
}

impl From<&IceCandidate> for WireCandidate {
    fn from(c: &IceCandidate) -> Self {
        Self {
            label: c.sdp_m_line_index,
            id: c.sdp_mid.clone(),
            candidate: c.sdp.clone(),
        }
    }
}

impl From<WireCandidate> for IceCandidate {
    fn from(c: WireCandidate) -> Self {
        IceCandidate::new(c.id, c.label, c.candidate)
    }
}

#[derive(Debug, Serialize)]
#[serde(tag = "cmd", rename_all = "lowercase")]
enum WireCommand<'a> {
    Register { roomid: &'a str, clientid: &'a str },
    Send { msg: &'a str },
}

/// Inbound socket frames wrap the peer's message once more.
#[derive(Debug, Deserialize)]
struct SocketEnvelope {
    #[serde(default)]
    msg: String,
    #[serde(default)]
    error: String,
}

pub fn encode_message(message: &SignalingMessage) -> Result<String, CodecError> {
    let wire = match message {
        SignalingMessage::Offer(desc) => WireMessage::Offer {
            sdp: desc.sdp.clone(),
        },
        SignalingMessage::Answer(desc) => WireMessage::Answer {
            sdp: desc.sdp.clone(),
        },
        SignalingMessage::Candidate(c) => WireMessage::Candidate(c.into()),
        SignalingMessage::RemoveCandidates(cs) => WireMessage::RemoveCandidates {
            candidates: cs.iter().map(WireCandidate::from).collect(),
        },
        SignalingMessage::Bye => WireMessage::Bye,
        SignalingMessage::Error(_) => return Err(CodecError::Unencodable("error")),
    };

    serde_json::to_string(&wire).map_err(|e| CodecError::json("message", "", e))
}

pub fn encode_command(command: &Command) -> Result<String, CodecError> {
    let wire = match command {
        Command::Register { room_id, client_id } => WireCommand::Register {
            roomid: room_id.as_str(),
            clientid: client_id.as_str(),
        },
        Command::Send { message } => WireCommand::Send { msg: message },
    };

    serde_json::to_string(&wire).map_err(|e| CodecError::json("command", "", e))
}

/// Decodes a bare `{"type": ...}` message.
pub fn decode_message(text: &str) -> Result<SignalingMessage, CodecError> {
    let value: serde_json::Value =
        serde_json::from_str(text).map_err(|e| CodecError::json("message", text, e))?;

    let wire: WireMessage = serde_json::from_value(value)
        .map_err(|_| CodecError::UnexpectedMessage(text.to_owned()))?;

    Ok(match wire {
        WireMessage::Offer { sdp } => SignalingMessage::Offer(SessionDescription::offer(sdp)),
        WireMessage::Answer { sdp } => SignalingMessage::Answer(SessionDescription::answer(sdp)),
        WireMessage::Candidate(c) => SignalingMessage::Candidate(c.into()),
        WireMessage::RemoveCandidates { candidates } => {
            SignalingMessage::RemoveCandidates(candidates.into_iter().map(Into::into).collect())
        }
        WireMessage::Bye => SignalingMessage::Bye,
    })
}

/// Decodes a `{"msg": ..., "error": ...}` socket frame.
///
/// A frame with an empty `msg` and a non-empty `error` becomes
/// [`SignalingMessage::Error`]. Anything else that cannot be understood is a
/// [`CodecError`] quoting the whole frame.
pub fn decode_socket_frame(text: &str) -> Result<SignalingMessage, CodecError> {
    let envelope: SocketEnvelope =
        serde_json::from_str(text).map_err(|e| CodecError::json("socket frame", text, e))?;

    if !envelope.msg.is_empty() {
        return decode_message(&envelope.msg).map_err(|e| match e {
            CodecError::Json { context, source, .. } => CodecError::Json {
                context,
                raw: text.to_owned(),
                source,
            },
            _ => CodecError::UnexpectedMessage(text.to_owned()),
        });
    }

    if !envelope.error.is_empty() {
        return Ok(SignalingMessage::Error(envelope.error));
    }

    Err(CodecError::UnexpectedMessage(text.to_owned()))
}
