use async_trait::async_trait;
use roomlink_core::{IceCandidate, RoomParameters, SessionDescription};

/// Receives the session's lifecycle notifications.
///
/// Every call comes from the session task, one at a time.
#[async_trait]
pub trait SessionListener: Send + Sync + 'static {
    async fn on_room_joined(&self, params: &RoomParameters);

    async fn on_remote_description(&self, description: &SessionDescription);

    async fn on_remote_candidate(&self, candidate: &IceCandidate);

    async fn on_remote_candidates_removed(&self, candidates: &[IceCandidate]);

    /// Room-level failure. Called once per failure episode.
    async fn on_error(&self, description: &str);

    async fn on_room_left(&self);

    /// A single inbound message could not be understood. The session goes on.
    async fn on_message_error(&self, _description: &str) {}
}
