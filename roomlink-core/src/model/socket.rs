/// Lifecycle of the persistent signaling socket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SocketState {
    New,
    Connected,
    Registered,
    Closed,
    Error,
}

impl SocketState {
    /// Outgoing session messages are buffered in these states.
    pub fn accepts_queueing(self) -> bool {
        matches!(self, SocketState::New | SocketState::Connected)
    }
}
