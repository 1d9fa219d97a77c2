use roomlink_core::IceServerConfig;
use std::time::Duration;

pub const DEFAULT_STUN_SERVER: &str = "stun:stun.l.google.com:19302";
pub const DEFAULT_REFERER: &str = "https://appr.tc";

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub command_capacity: usize,
    pub event_capacity: usize,
    /// Bound on the relay-server list request issued after joining.
    pub relay_timeout: Duration,
    /// Bound on the socket DELETE issued while leaving a registered socket.
    pub unregister_timeout: Duration,
    /// How long `leave_room` waits for the socket to close.
    pub leave_close_timeout: Duration,
    /// Used when the room hands out no ICE servers at all.
    pub fallback_ice_servers: Vec<IceServerConfig>,
    /// Sent as `Referer` on HTTP requests and `Origin` on the socket handshake.
    pub referer: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            command_capacity: 100,
            event_capacity: 256,
            relay_timeout: Duration::from_secs(5),
            unregister_timeout: Duration::from_secs(1),
            leave_close_timeout: Duration::from_secs(2),
            fallback_ice_servers: vec![IceServerConfig {
                urls: vec![DEFAULT_STUN_SERVER.to_owned()],
                username: None,
                credential: None,
            }],
            referer: DEFAULT_REFERER.to_owned(),
        }
    }
}
