use crate::error::{SessionError, TransportError};
use crate::negotiation::EngineOutcome;
use crate::transport::{HttpOutcome, SocketLink};
use roomlink_core::SignalingParameters;

/// Completions of background work, handed back into the session task.
#[derive(Debug)]
pub enum SessionEvent {
    JoinCompleted(Result<SignalingParameters, SessionError>),
    SocketConnected(Result<SocketLink, TransportError>),
    Http(HttpOutcome),
    Engine(EngineOutcome),
}
