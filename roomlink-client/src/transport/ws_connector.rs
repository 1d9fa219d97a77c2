use crate::error::TransportError;
use crate::transport::{SocketConnector, SocketEvent, SocketFrame, SocketLink};
use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::http::header::ORIGIN;
use tracing::{debug, info, warn};

/// WebSocket transport on `tokio-tungstenite`.
pub struct WsConnector {
    origin: String,
}

impl WsConnector {
    pub fn new(origin: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
        }
    }
}

#[async_trait]
impl SocketConnector for WsConnector {
    async fn connect(
        &self,
        url: &str,
        events: mpsc::Sender<SocketEvent>,
    ) -> Result<SocketLink, TransportError> {
        let connect_error = |reason: String| TransportError::Connect {
            url: url.to_owned(),
            reason,
        };

        let mut request = url
            .into_client_request()
            .map_err(|e| connect_error(e.to_string()))?;
        if let Ok(origin) = HeaderValue::from_str(&self.origin) {
            request.headers_mut().insert(ORIGIN, origin);
        }

        let (stream, _) = connect_async(request)
            .await
            .map_err(|e| connect_error(e.to_string()))?;
        info!("WebSocket connection opened: {}", url);

        let (mut sender, mut receiver) = stream.split();
        let (frame_tx, mut frame_rx) = mpsc::unbounded_channel::<SocketFrame>();

        let writer_events = events.clone();
        tokio::spawn(async move {
            while let Some(frame) = frame_rx.recv().await {
                match frame {
                    SocketFrame::Register(text) => {
                        let event = match sender.send(Message::Text(text)).await {
                            Ok(()) => SocketEvent::Registered,
                            Err(e) => SocketEvent::Error(format!("register failed: {}", e)),
                        };
                        if writer_events.send(event).await.is_err() {
                            break;
                        }
                    }
                    SocketFrame::Text(text) => {
                        if let Err(e) = sender.send(Message::Text(text)).await {
                            let _ = writer_events
                                .send(SocketEvent::Error(format!("send failed: {}", e)))
                                .await;
                        }
                    }
                    SocketFrame::Close(done) => {
                        if let Err(e) = sender.close().await {
                            warn!("WebSocket close failed: {}", e);
                        }
                        let _ = done.send(());
                        break;
                    }
                }
            }
            debug!("WebSocket writer finished");
        });

        tokio::spawn(async move {
            while let Some(msg) = receiver.next().await {
                match msg {
                    Ok(Message::Text(text)) => {
                        if events.send(SocketEvent::Message(text)).await.is_err() {
                            return;
                        }
                    }
                    Ok(Message::Close(_)) => break,
                    Ok(_) => {}
                    Err(e) => {
                        let _ = events.send(SocketEvent::Error(e.to_string())).await;
                        break;
                    }
                }
            }
            let _ = events.send(SocketEvent::Closed).await;
            debug!("WebSocket reader finished");
        });

        Ok(SocketLink::new(frame_tx))
    }
}
