use async_trait::async_trait;
use colored::*;
use roomlink::client::SessionListener;
use roomlink::model::{IceCandidate, RoomParameters, SessionDescription};
use tokio::sync::mpsc;

#[derive(Debug)]
pub enum SessionEnd {
    RoomLeft,
    Failed(String),
}

/// Prints session progress and signals when the call is over.
pub struct CliListener {
    end: mpsc::UnboundedSender<SessionEnd>,
}

impl CliListener {
    pub fn new(end: mpsc::UnboundedSender<SessionEnd>) -> Self {
        Self { end }
    }
}

#[async_trait]
impl SessionListener for CliListener {
    async fn on_room_joined(&self, params: &RoomParameters) {
        let role = if params.initiator { "initiator" } else { "receiver" };
        println!(
            "{} as {} ({} ICE servers)",
            "✅ Joined".green().bold(),
            role.bold(),
            params.ice_servers.len()
        );
    }

    async fn on_remote_description(&self, description: &SessionDescription) {
        println!("{} {:?}", "📨 Remote description:".cyan(), description.sdp_type);
    }

    async fn on_remote_candidate(&self, candidate: &IceCandidate) {
        println!("{} {}", "🧊 Remote candidate:".cyan(), candidate.sdp.dimmed());
    }

    async fn on_remote_candidates_removed(&self, candidates: &[IceCandidate]) {
        println!("{} {}", "🧊 Remote candidates removed:".cyan(), candidates.len());
    }

    async fn on_error(&self, description: &str) {
        eprintln!("{} {}", "❌ Error:".red().bold(), description);
        let _ = self.end.send(SessionEnd::Failed(description.to_owned()));
    }

    async fn on_room_left(&self) {
        println!("{}", "🚪 Peer left the room".yellow());
        let _ = self.end.send(SessionEnd::RoomLeft);
    }

    async fn on_message_error(&self, description: &str) {
        eprintln!("{} {}", "⚠ Ignored message:".yellow(), description);
    }
}
