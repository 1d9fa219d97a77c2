use crate::error::SessionError;
use roomlink_core::{ConnectionParameters, RoomState, SocketState};
use tokio::sync::oneshot;

/// Requests the [`SessionHandle`](crate::session::SessionHandle) sends into the session task.
#[derive(Debug)]
pub enum SessionCommand {
    /// Start joining; the reply only says whether the attempt was accepted.
    JoinRoom {
        connection: ConnectionParameters,
        reply: oneshot::Sender<Result<(), SessionError>>,
    },

    /// Leave the room. The reply carries the socket close signal, if a socket
    /// was being closed.
    LeaveRoom {
        reply: oneshot::Sender<Option<oneshot::Receiver<()>>>,
    },

    Snapshot {
        reply: oneshot::Sender<SessionSnapshot>,
    },
}

/// Point-in-time view of the session state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub socket_state: SocketState,
    pub room_state: RoomState,
    pub initiator: Option<bool>,
    pub outgoing_len: usize,
    pub queued_candidates: usize,
    pub local_description_set: bool,
    pub remote_description_set: bool,
    pub candidates_drained: bool,
}
