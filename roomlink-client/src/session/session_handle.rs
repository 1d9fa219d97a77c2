use crate::error::SessionError;
use crate::negotiation::NegotiationEngine;
use crate::session::{Session, SessionCommand, SessionConfig, SessionListener, SessionSnapshot};
use crate::transport::{RoomHttpClient, SocketConnector};
use roomlink_core::ConnectionParameters;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tracing::{info, warn};

/// Cloneable front door to a running [`Session`].
#[derive(Clone)]
pub struct SessionHandle {
    commands: mpsc::Sender<SessionCommand>,
    close_timeout: Duration,
}

impl SessionHandle {
    /// Starts the session task. The session stops once every handle is dropped.
    pub fn spawn(
        config: SessionConfig,
        http_client: Arc<dyn RoomHttpClient>,
        connector: Arc<dyn SocketConnector>,
        engine: Arc<dyn NegotiationEngine>,
        listener: Arc<dyn SessionListener>,
    ) -> Self {
        info!("Creating new session");
        let (tx, rx) = mpsc::channel(config.command_capacity);
        let close_timeout = config.leave_close_timeout;

        let session = Session::new(config, http_client, connector, engine, listener, rx);
        tokio::spawn(session.run());

        Self {
            commands: tx,
            close_timeout,
        }
    }

    /// Starts joining the room. Progress and failures reach the listener.
    pub async fn join_room(&self, connection: ConnectionParameters) -> Result<(), SessionError> {
        let (reply, response) = oneshot::channel();
        self.request(SessionCommand::JoinRoom { connection, reply }, response)
            .await?
    }

    /// Leaves the room and waits, bounded, for the socket to close.
    pub async fn leave_room(&self) -> Result<(), SessionError> {
        let (reply, response) = oneshot::channel();
        let Some(closed) = self
            .request(SessionCommand::LeaveRoom { reply }, response)
            .await?
        else {
            return Ok(());
        };

        // A dropped sender means the writer is already gone.
        match tokio::time::timeout(self.close_timeout, closed).await {
            Ok(_) => Ok(()),
            Err(_) => {
                warn!("WebSocket did not close within {:?}", self.close_timeout);
                Err(SessionError::LeaveTimeout)
            }
        }
    }

    pub async fn snapshot(&self) -> Result<SessionSnapshot, SessionError> {
        let (reply, response) = oneshot::channel();
        self.request(SessionCommand::Snapshot { reply }, response)
            .await
    }

    async fn request<T>(
        &self,
        command: SessionCommand,
        response: oneshot::Receiver<T>,
    ) -> Result<T, SessionError> {
        self.commands
            .send(command)
            .await
            .map_err(|_| SessionError::Closed)?;
        response.await.map_err(|_| SessionError::Closed)
    }
}
