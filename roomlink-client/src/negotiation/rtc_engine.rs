use crate::negotiation::{EngineError, EngineEvent, NegotiationEngine};
use anyhow::Context;
use async_trait::async_trait;
use roomlink_core::{IceCandidate, IceServerConfig, SessionDescription};
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};
use tracing::{debug, info};
use webrtc::api::APIBuilder;
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::MediaEngine;
use webrtc::data_channel::RTCDataChannel;
use webrtc::data_channel::data_channel_init::RTCDataChannelInit;
use webrtc::ice_transport::ice_candidate::{RTCIceCandidate, RTCIceCandidateInit};
use webrtc::ice_transport::ice_server::RTCIceServer;
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;

const DATA_CHANNEL_LABEL: &str = "data";
const DATA_CHANNEL_PROTOCOL: &str = "roomlink";

impl From<webrtc::Error> for EngineError {
    fn from(e: webrtc::Error) -> Self {
        EngineError::Failed(e.to_string())
    }
}

/// [`NegotiationEngine`] backed by a `webrtc` peer connection.
#[derive(Default)]
pub struct RtcEngine {
    peer_connection: Mutex<Option<Arc<RTCPeerConnection>>>,
    data_channel: Mutex<Option<Arc<RTCDataChannel>>>,
}

impl RtcEngine {
    pub fn new() -> Self {
        Self::default()
    }

    async fn connection(&self) -> Result<Arc<RTCPeerConnection>, EngineError> {
        self.peer_connection
            .lock()
            .await
            .clone()
            .ok_or(EngineError::NotConfigured)
    }
}

async fn build_peer_connection(ice_servers: Vec<IceServerConfig>) -> anyhow::Result<RTCPeerConnection> {
    let mut m = MediaEngine::default();
    m.register_default_codecs()
        .context("Failed to register default codecs")?;
    let registry = register_default_interceptors(Registry::new(), &mut m)
        .context("Failed to register interceptors")?;

    let api = APIBuilder::new()
        .with_media_engine(m)
        .with_interceptor_registry(registry)
        .build();

    let rtc_config = RTCConfiguration {
        ice_servers: ice_servers
            .into_iter()
            .map(|server| RTCIceServer {
                urls: server.urls,
                username: server.username.unwrap_or_default(),
                credential: server.credential.unwrap_or_default(),
                ..Default::default()
            })
            .collect(),
        ..Default::default()
    };

    api.new_peer_connection(rtc_config)
        .await
        .context("Failed to create peer connection")
}

fn to_rtc_description(description: SessionDescription) -> Result<RTCSessionDescription, EngineError> {
    let desc = match description.sdp_type {
        roomlink_core::SdpType::Offer => RTCSessionDescription::offer(description.sdp)?,
        roomlink_core::SdpType::Answer => RTCSessionDescription::answer(description.sdp)?,
    };
    Ok(desc)
}

#[async_trait]
impl NegotiationEngine for RtcEngine {
    async fn configure(
        &self,
        ice_servers: Vec<IceServerConfig>,
        events: mpsc::Sender<EngineEvent>,
    ) -> Result<(), EngineError> {
        let peer_connection = Arc::new(
            build_peer_connection(ice_servers)
                .await
                .map_err(|e| EngineError::Failed(format!("{:#}", e)))?,
        );

        let state_tx = events.clone();
        peer_connection.on_peer_connection_state_change(Box::new(
            move |s: RTCPeerConnectionState| {
                let tx = state_tx.clone();
                Box::pin(async move {
                    info!("Peer connection state changed: {}", s);
                    let _ = tx.send(EngineEvent::ConnectionStateChanged(s.to_string())).await;
                })
            },
        ));

        let ice_tx = events;
        peer_connection.on_ice_candidate(Box::new(move |c: Option<RTCIceCandidate>| {
            let tx = ice_tx.clone();
            Box::pin(async move {
                let Some(candidate) = c else { return };
                let Ok(init) = candidate.to_json() else {
                    return;
                };
                let candidate = IceCandidate::new(
                    init.sdp_mid.unwrap_or_default(),
                    init.sdp_mline_index.unwrap_or_default(),
                    init.candidate,
                );
                let _ = tx.send(EngineEvent::CandidateDiscovered(candidate)).await;
            })
        }));

        if let Some(previous) = self.peer_connection.lock().await.replace(peer_connection) {
            let _ = previous.close().await;
        }
        Ok(())
    }

    async fn create_offer(&self) -> Result<SessionDescription, EngineError> {
        let pc = self.connection().await?;

        // An offer without any m-line gathers no candidates.
        let mut data_channel = self.data_channel.lock().await;
        if data_channel.is_none() {
            let init = RTCDataChannelInit {
                protocol: Some(DATA_CHANNEL_PROTOCOL.to_owned()),
                ..Default::default()
            };
            *data_channel = Some(pc.create_data_channel(DATA_CHANNEL_LABEL, Some(init)).await?);
        }

        let offer = pc.create_offer(None).await?;
        Ok(SessionDescription::offer(offer.sdp))
    }

    async fn create_answer(&self) -> Result<SessionDescription, EngineError> {
        let answer = self.connection().await?.create_answer(None).await?;
        Ok(SessionDescription::answer(answer.sdp))
    }

    async fn set_local_description(&self, description: SessionDescription) -> Result<(), EngineError> {
        let pc = self.connection().await?;
        pc.set_local_description(to_rtc_description(description)?).await?;
        Ok(())
    }

    async fn set_remote_description(&self, description: SessionDescription) -> Result<(), EngineError> {
        let pc = self.connection().await?;
        pc.set_remote_description(to_rtc_description(description)?).await?;
        Ok(())
    }

    async fn add_candidate(&self, candidate: IceCandidate) -> Result<(), EngineError> {
        let init = RTCIceCandidateInit {
            candidate: candidate.sdp,
            sdp_mid: Some(candidate.sdp_mid),
            sdp_mline_index: Some(candidate.sdp_m_line_index),
            ..Default::default()
        };
        self.connection().await?.add_ice_candidate(init).await?;
        Ok(())
    }

    async fn remove_candidates(&self, candidates: Vec<IceCandidate>) -> Result<(), EngineError> {
        // webrtc has no candidate removal; the ICE agent prunes on its own.
        debug!("Ignoring removal of {} remote candidates", candidates.len());
        Ok(())
    }

    async fn close(&self) -> Result<(), EngineError> {
        self.data_channel.lock().await.take();
        if let Some(pc) = self.peer_connection.lock().await.take() {
            pc.close().await?;
        }
        Ok(())
    }
}
