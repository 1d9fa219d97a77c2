use crate::error::TransportError;
use crate::transport::{SocketEvent, SocketFrame};
use async_trait::async_trait;
use tokio::sync::mpsc;

/// Write half of an open socket. Frames are written strictly in send order.
#[derive(Debug, Clone)]
pub struct SocketLink {
    frames: mpsc::UnboundedSender<SocketFrame>,
}

impl SocketLink {
    pub fn new(frames: mpsc::UnboundedSender<SocketFrame>) -> Self {
        Self { frames }
    }

    pub fn send(&self, frame: SocketFrame) -> Result<(), TransportError> {
        self.frames
            .send(frame)
            .map_err(|_| TransportError::SocketGone)
    }
}

/// Opens the persistent signaling connection.
///
/// Everything the connection observes after `connect` returns is delivered
/// on `events`; the returned link is the only way to write to it.
#[async_trait]
pub trait SocketConnector: Send + Sync + 'static {
    async fn connect(
        &self,
        url: &str,
        events: mpsc::Sender<SocketEvent>,
    ) -> Result<SocketLink, TransportError>;
}
