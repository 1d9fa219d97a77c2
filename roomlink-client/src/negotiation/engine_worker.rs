use crate::negotiation::{EngineError, EngineEvent, NegotiationEngine};
use crate::session::SessionEvent;
use roomlink_core::{IceCandidate, IceServerConfig, SdpType, SessionDescription};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::debug;

#[derive(Debug)]
pub enum EngineOp {
    Configure(Vec<IceServerConfig>),
    CreateOffer,
    CreateAnswer,
    SetLocalDescription(SessionDescription),
    SetRemoteDescription(SessionDescription),
    AddCandidate(IceCandidate),
    RemoveCandidates(Vec<IceCandidate>),
    Close,
}

#[derive(Debug)]
pub enum EngineOutcome {
    Configured(Result<(), EngineError>),
    DescriptionCreated(Result<SessionDescription, EngineError>),
    LocalDescriptionSet(SessionDescription, Result<(), EngineError>),
    RemoteDescriptionSet(SdpType, Result<(), EngineError>),
    CandidateAdded(Result<(), EngineError>),
    CandidatesRemoved(Result<(), EngineError>),
    Closed(Result<(), EngineError>),
}

/// Feeds engine calls one by one, so candidates reach the engine in the order
/// the session released them. Each completion is posted back to the session.
#[derive(Clone)]
pub struct EngineWorker {
    ops: mpsc::UnboundedSender<EngineOp>,
}

impl EngineWorker {
    pub fn spawn(
        engine: Arc<dyn NegotiationEngine>,
        engine_events: mpsc::Sender<EngineEvent>,
        outcomes: mpsc::Sender<SessionEvent>,
    ) -> Self {
        let (ops, mut op_rx) = mpsc::unbounded_channel::<EngineOp>();

        tokio::spawn(async move {
            while let Some(op) = op_rx.recv().await {
                debug!("Engine op: {:?}", op);

                let outcome = match op {
                    EngineOp::Configure(ice_servers) => EngineOutcome::Configured(
                        engine.configure(ice_servers, engine_events.clone()).await,
                    ),
                    EngineOp::CreateOffer => {
                        EngineOutcome::DescriptionCreated(engine.create_offer().await)
                    }
                    EngineOp::CreateAnswer => {
                        EngineOutcome::DescriptionCreated(engine.create_answer().await)
                    }
                    EngineOp::SetLocalDescription(description) => {
                        let result = engine.set_local_description(description.clone()).await;
                        EngineOutcome::LocalDescriptionSet(description, result)
                    }
                    EngineOp::SetRemoteDescription(description) => {
                        let sdp_type = description.sdp_type;
                        let result = engine.set_remote_description(description).await;
                        EngineOutcome::RemoteDescriptionSet(sdp_type, result)
                    }
                    EngineOp::AddCandidate(candidate) => {
                        EngineOutcome::CandidateAdded(engine.add_candidate(candidate).await)
                    }
                    EngineOp::RemoveCandidates(candidates) => {
                        EngineOutcome::CandidatesRemoved(engine.remove_candidates(candidates).await)
                    }
                    EngineOp::Close => EngineOutcome::Closed(engine.close().await),
                };

                if outcomes.send(SessionEvent::Engine(outcome)).await.is_err() {
                    break;
                }
            }
            debug!("Engine worker stopped");
        });

        Self { ops }
    }

    pub fn submit(&self, op: EngineOp) {
        if let Err(e) = self.ops.send(op) {
            tracing::error!("Engine worker is gone, dropping {:?}", e.0);
        }
    }
}
