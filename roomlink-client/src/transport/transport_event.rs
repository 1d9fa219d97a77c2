use tokio::sync::oneshot;

/// What the orchestrator hands to a socket writer, in transmission order.
#[derive(Debug)]
pub enum SocketFrame {
    /// Register command; a successful write is reported as [`SocketEvent::Registered`].
    Register(String),
    Text(String),
    /// Close the connection after everything queued before it was written.
    Close(oneshot::Sender<()>),
}

/// Lifecycle and traffic of one socket connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SocketEvent {
    Registered,
    Message(String),
    Closed,
    Error(String),
}
