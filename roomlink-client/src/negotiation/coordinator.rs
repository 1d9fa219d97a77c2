use crate::signaling::Role;
use roomlink_core::{IceCandidate, SdpType, SignalingMessage};

#[derive(Debug, PartialEq, Eq)]
pub enum CandidateAction {
    Queued,
    Apply(IceCandidate),
}

/// Remote candidates held back until both descriptions are applied.
#[derive(Debug, Default)]
struct CandidateQueue {
    pending: Vec<IceCandidate>,
    drained: bool,
}

/// Gates remote candidates on the negotiation progress.
///
/// Candidates that arrive before both the local and the remote description
/// are applied are queued and released exactly once, in arrival order, the
/// moment the second description lands. Later candidates pass straight through.
///
/// Locally gathered candidates are held the same way until the local
/// description is applied, so the peer always sees the offer or answer first.
#[derive(Debug, Default)]
pub struct NegotiationCoordinator {
    local_description_set: bool,
    remote_description_set: bool,
    queue: CandidateQueue,
    held_local: Vec<SignalingMessage>,
}

impl NegotiationCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn local_description_set(&self) -> bool {
        self.local_description_set
    }

    pub fn remote_description_set(&self) -> bool {
        self.remote_description_set
    }

    pub fn is_negotiated(&self) -> bool {
        self.local_description_set && self.remote_description_set
    }

    pub fn is_drained(&self) -> bool {
        self.queue.drained
    }

    pub fn queued_candidates(&self) -> usize {
        self.queue.pending.len()
    }

    pub fn add_remote_candidate(&mut self, candidate: IceCandidate) -> CandidateAction {
        if self.is_negotiated() {
            CandidateAction::Apply(candidate)
        } else {
            self.queue.pending.push(candidate);
            CandidateAction::Queued
        }
    }

    /// Returns the backlog to apply if this completed the negotiation.
    pub fn local_description_applied(&mut self) -> Vec<IceCandidate> {
        self.local_description_set = true;
        self.try_drain()
    }

    /// Returns the backlog to apply if this completed the negotiation.
    pub fn remote_description_applied(&mut self) -> Vec<IceCandidate> {
        self.remote_description_set = true;
        self.try_drain()
    }

    /// Hands `message` back if it may go out now, else keeps it until
    /// [`take_held_local`](Self::take_held_local).
    pub fn hold_local(&mut self, message: SignalingMessage) -> Option<SignalingMessage> {
        if self.local_description_set {
            return Some(message);
        }
        self.held_local.push(message);
        None
    }

    pub fn held_local(&self) -> usize {
        self.held_local.len()
    }

    pub fn take_held_local(&mut self) -> Vec<SignalingMessage> {
        std::mem::take(&mut self.held_local)
    }

    /// A receiver answers every accepted remote offer.
    pub fn should_answer(sdp_type: SdpType, role: Role) -> bool {
        sdp_type == SdpType::Offer && role == Role::Receiver
    }

    /// Drops queued candidates the peer withdrew. Returns `true` when the
    /// removal has to reach the engine because candidates were already applied.
    pub fn remove_candidates(&mut self, removed: &[IceCandidate]) -> bool {
        self.queue.pending.retain(|c| !removed.contains(c));
        self.queue.drained
    }

    /// Forgets queued candidates on teardown.
    pub fn reset(&mut self) {
        self.queue.pending.clear();
        self.held_local.clear();
    }

    fn try_drain(&mut self) -> Vec<IceCandidate> {
        if !self.is_negotiated() || self.queue.drained {
            return Vec::new();
        }
        self.queue.drained = true;
        std::mem::take(&mut self.queue.pending)
    }
}
