use crate::error::SessionError;
use crate::signaling::{CandidateRouter, OutgoingQueue, Role};
use roomlink_core::{
    ConnectionParameters, RoomState, SignalingMessage, SignalingParameters, SocketState,
};
use std::sync::Arc;
use tracing::warn;

/// What `send` does with a message in the current socket state.
#[derive(Debug, PartialEq, Eq)]
pub enum SendDecision {
    Queued,
    Dropped(SignalingMessage),
    Transmit(SignalingMessage),
}

/// Room and socket lifecycles plus everything that is only valid while joined.
///
/// Owned by the session task; never shared.
#[derive(Debug)]
pub struct SignalingState {
    socket_state: SocketState,
    room_state: RoomState,
    outgoing: OutgoingQueue,
    connection: Option<Arc<ConnectionParameters>>,
    params: Option<Arc<SignalingParameters>>,
    router: Option<CandidateRouter>,
}

impl Default for SignalingState {
    fn default() -> Self {
        Self::new()
    }
}

impl SignalingState {
    pub fn new() -> Self {
        Self {
            socket_state: SocketState::New,
            room_state: RoomState::New,
            outgoing: OutgoingQueue::new(),
            connection: None,
            params: None,
            router: None,
        }
    }

    pub fn socket_state(&self) -> SocketState {
        self.socket_state
    }

    pub fn room_state(&self) -> RoomState {
        self.room_state
    }

    pub fn connection(&self) -> Option<&Arc<ConnectionParameters>> {
        self.connection.as_ref()
    }

    pub fn params(&self) -> Option<&Arc<SignalingParameters>> {
        self.params.as_ref()
    }

    pub fn router(&self) -> Option<&CandidateRouter> {
        self.router.as_ref()
    }

    pub fn role(&self) -> Option<Role> {
        self.router.map(|r| r.role())
    }

    pub fn outgoing_len(&self) -> usize {
        self.outgoing.len()
    }

    /// Accepts a join attempt. Only a fresh room may be joined.
    pub fn begin_join(&mut self, connection: ConnectionParameters) -> Result<(), SessionError> {
        if self.room_state != RoomState::New || self.connection.is_some() {
            return Err(SessionError::InvalidState {
                expected: RoomState::New,
                actual: self.room_state,
            });
        }
        self.connection = Some(Arc::new(connection));
        Ok(())
    }

    /// Stores the join result and marks the room connected.
    pub fn room_joined(&mut self, params: SignalingParameters) -> Arc<SignalingParameters> {
        let loopback = self.connection.as_ref().is_some_and(|c| c.loopback);
        let params = Arc::new(params);

        self.router = Some(CandidateRouter::new(
            Role::from_initiator(params.initiator),
            loopback,
        ));
        self.params = Some(params.clone());
        self.room_state = RoomState::Connected;
        params
    }

    /// Keeps the join result without entering the room (busy loopback room).
    pub fn keep_params(&mut self, params: SignalingParameters) {
        self.params = Some(Arc::new(params));
    }

    pub fn close_room(&mut self) {
        self.room_state = RoomState::Closed;
    }

    /// Moves the room to `Error`. Returns `true` only on the first call since
    /// leaving a non-error state, which is when the listener must hear of it.
    pub fn enter_error(&mut self) -> bool {
        if self.room_state == RoomState::Error {
            return false;
        }
        self.room_state = RoomState::Error;
        true
    }

    pub fn send(&mut self, message: SignalingMessage) -> SendDecision {
        if self.socket_state.accepts_queueing() {
            self.outgoing.enqueue(message);
            return SendDecision::Queued;
        }
        match self.socket_state {
            SocketState::Registered => SendDecision::Transmit(message),
            _ => SendDecision::Dropped(message),
        }
    }

    /// `New -> Connected`. Returns `false` if the socket was not fresh.
    pub fn socket_opened(&mut self) -> bool {
        if self.socket_state != SocketState::New {
            return false;
        }
        self.socket_state = SocketState::Connected;
        true
    }

    /// `Connected -> Registered`, handing back the backlog to replay.
    pub fn socket_registered(&mut self) -> Option<OutgoingQueue> {
        if self.socket_state != SocketState::Connected {
            return None;
        }
        self.socket_state = SocketState::Registered;
        Some(std::mem::take(&mut self.outgoing))
    }

    /// Returns `true` if this close was not already known.
    pub fn socket_closed(&mut self) -> bool {
        if self.socket_state == SocketState::Closed {
            return false;
        }
        self.socket_state = SocketState::Closed;
        self.discard_backlog();
        true
    }

    pub fn socket_failed(&mut self) {
        if self.socket_state != SocketState::Closed {
            self.socket_state = SocketState::Error;
        }
        self.discard_backlog();
    }

    pub fn set_socket_state(&mut self, state: SocketState) {
        self.socket_state = state;
        if !state.accepts_queueing() && state != SocketState::Registered {
            self.discard_backlog();
        }
    }

    /// The backlog only lives while the socket can still register.
    fn discard_backlog(&mut self) {
        if self.outgoing.is_empty() {
            return;
        }
        warn!(
            "Socket {:?} before registering, dropping {} queued messages",
            self.socket_state,
            self.outgoing.len()
        );
        self.outgoing.clear();
    }

    pub fn clear_outgoing(&mut self) {
        self.outgoing.clear();
    }
}
