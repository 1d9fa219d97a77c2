use crate::codec::{CodecError, decode_message};
use crate::model::{ClientId, IceServerConfig, SignalingMessage, SignalingParameters};
use serde::Deserialize;

const SUCCESS: &str = "SUCCESS";

#[derive(Debug, Deserialize)]
struct JoinResponse {
    result: String,
    params: Option<JoinParams>,
}

#[derive(Debug, Deserialize)]
struct JoinParams {
    client_id: String,
    wss_url: String,
    wss_post_url: String,
    #[serde(default)]
    ice_server_url: String,
    is_initiator: Flag,
    #[serde(default)]
    messages: Vec<String>,
    #[serde(default)]
    pc_config: Option<String>,
}

/// The room server sends booleans as `"true"`/`"false"` strings.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Flag {
    Bool(bool),
    Text(String),
}

impl Flag {
    fn is_set(&self) -> bool {
        match self {
            Flag::Bool(b) => *b,
            Flag::Text(s) => s.eq_ignore_ascii_case("true"),
        }
    }
}

#[derive(Debug, Deserialize)]
struct PeerConnectionConfig {
    #[serde(rename = "iceServers", default)]
    ice_servers: Option<Vec<WireIceServer>>,
}

#[derive(Debug, Deserialize)]
struct WireIceServer {
    urls: Urls,
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    credential: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Urls {
    One(String),
    Many(Vec<String>),
}

impl From<WireIceServer> for IceServerConfig {
    fn from(server: WireIceServer) -> Self {
        let urls = match server.urls {
            Urls::One(url) => vec![url],
            Urls::Many(urls) => urls,
        };
        Self {
            urls,
            username: server.username.filter(|s| !s.is_empty()),
            credential: server.credential.filter(|s| !s.is_empty()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct PostResponse {
    result: String,
}

/// Parses the answer to `POST {base}/join/{roomId}`.
///
/// Any `result` other than `SUCCESS` is a rejection. For receivers the
/// embedded `messages` carry the initiator's offer and early candidates.
pub fn decode_join_response(text: &str) -> Result<SignalingParameters, CodecError> {
    let response: JoinResponse =
        serde_json::from_str(text).map_err(|e| CodecError::json("join response", text, e))?;

    if response.result != SUCCESS {
        return Err(CodecError::JoinRejected(response.result));
    }
    let params = response
        .params
        .ok_or_else(|| CodecError::MissingParams(text.to_owned()))?;

    let initiator = params.is_initiator.is_set();
    let mut offer = None;
    let mut candidates = Vec::new();

    if !initiator {
        for raw in &params.messages {
            match decode_message(raw)? {
                SignalingMessage::Offer(desc) => offer = Some(desc),
                SignalingMessage::Candidate(c) => candidates.push(c),
                _ => {}
            }
        }
    }

    let ice_servers = match params.pc_config.as_deref() {
        Some(config) if !config.trim().is_empty() => decode_ice_servers(config)?,
        _ => Vec::new(),
    };

    Ok(SignalingParameters {
        client_id: ClientId(params.client_id),
        wss_url: params.wss_url,
        wss_post_url: params.wss_post_url,
        ice_server_url: params.ice_server_url,
        initiator,
        offer,
        candidates,
        ice_servers,
    })
}

/// Parses `{"iceServers": [...]}`; a missing list is an empty one.
pub fn decode_ice_servers(text: &str) -> Result<Vec<IceServerConfig>, CodecError> {
    let config: PeerConnectionConfig =
        serde_json::from_str(text).map_err(|e| CodecError::json("ice servers", text, e))?;

    Ok(config
        .ice_servers
        .unwrap_or_default()
        .into_iter()
        .map(IceServerConfig::from)
        .collect())
}

/// Extracts `result` from the answer to a `message` post.
pub fn decode_post_result(text: &str) -> Result<String, CodecError> {
    let response: PostResponse =
        serde_json::from_str(text).map_err(|e| CodecError::json("post response", text, e))?;
    Ok(response.result)
}
