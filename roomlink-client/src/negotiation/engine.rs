use async_trait::async_trait;
use roomlink_core::{IceCandidate, IceServerConfig, SessionDescription};
use thiserror::Error;
use tokio::sync::mpsc;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("peer connection is not configured")]
    NotConfigured,

    #[error("{0}")]
    Failed(String),
}

/// Things the engine discovers on its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    CandidateDiscovered(IceCandidate),
    CandidatesRemoved(Vec<IceCandidate>),
    ConnectionStateChanged(String),
}

/// The media/negotiation engine the session drives.
///
/// Calls are issued one at a time, never concurrently.
#[async_trait]
pub trait NegotiationEngine: Send + Sync + 'static {
    async fn configure(
        &self,
        ice_servers: Vec<IceServerConfig>,
        events: mpsc::Sender<EngineEvent>,
    ) -> Result<(), EngineError>;

    async fn create_offer(&self) -> Result<SessionDescription, EngineError>;

    async fn create_answer(&self) -> Result<SessionDescription, EngineError>;

    async fn set_local_description(&self, description: SessionDescription) -> Result<(), EngineError>;

    async fn set_remote_description(&self, description: SessionDescription) -> Result<(), EngineError>;

    async fn add_candidate(&self, candidate: IceCandidate) -> Result<(), EngineError>;

    async fn remove_candidates(&self, candidates: Vec<IceCandidate>) -> Result<(), EngineError>;

    async fn close(&self) -> Result<(), EngineError>;
}
