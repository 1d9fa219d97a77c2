use crate::error::{SessionError, TransportError};
use crate::negotiation::{
    CandidateAction, EngineEvent, EngineOp, EngineOutcome, EngineWorker, NegotiationCoordinator,
    NegotiationEngine,
};
use crate::session::join::join_room;
use crate::session::{
    SessionCommand, SessionConfig, SessionEvent, SessionListener, SessionSnapshot,
};
use crate::signaling::{Role, Route, SendDecision, SignalingState};
use crate::transport::{
    HttpOutbox, HttpOutcome, HttpPurpose, HttpRequest, RoomHttpClient, SocketConnector,
    SocketEvent, SocketFrame, SocketLink,
};
use roomlink_core::codec::{decode_post_result, decode_socket_frame, encode_command, encode_message};
use roomlink_core::{
    Command, ConnectionParameters, IceCandidate, RoomParameters, RoomState, SessionDescription,
    SignalingMessage, SignalingParameters, SocketState,
};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, warn};

const POST_SUCCESS: &str = "SUCCESS";

/// The signaling and negotiation orchestrator.
///
/// Every input (handle commands, HTTP completions, socket events, engine
/// completions and engine discoveries) is funnelled into [`Session::run`], so
/// all state below is touched by exactly one task.
pub struct Session {
    config: SessionConfig,
    listener: Arc<dyn SessionListener>,
    http_client: Arc<dyn RoomHttpClient>,
    http: HttpOutbox,
    connector: Arc<dyn SocketConnector>,
    engine: EngineWorker,
    signaling: SignalingState,
    negotiation: NegotiationCoordinator,
    socket: Option<SocketLink>,
    command_rx: mpsc::Receiver<SessionCommand>,
    event_tx: mpsc::Sender<SessionEvent>,
    event_rx: mpsc::Receiver<SessionEvent>,
    socket_tx: mpsc::Sender<SocketEvent>,
    socket_rx: mpsc::Receiver<SocketEvent>,
    engine_rx: mpsc::Receiver<EngineEvent>,
}

impl Session {
    /// Must be called inside a tokio runtime; the HTTP and engine workers start here.
    pub fn new(
        config: SessionConfig,
        http_client: Arc<dyn RoomHttpClient>,
        connector: Arc<dyn SocketConnector>,
        engine: Arc<dyn NegotiationEngine>,
        listener: Arc<dyn SessionListener>,
        command_rx: mpsc::Receiver<SessionCommand>,
    ) -> Self {
        let (event_tx, event_rx) = mpsc::channel(config.event_capacity);
        let (socket_tx, socket_rx) = mpsc::channel(config.event_capacity);
        let (engine_tx, engine_rx) = mpsc::channel(config.event_capacity);

        let http = HttpOutbox::spawn(http_client.clone(), event_tx.clone());
        let engine = EngineWorker::spawn(engine, engine_tx, event_tx.clone());

        Self {
            config,
            listener,
            http_client,
            http,
            connector,
            engine,
            signaling: SignalingState::new(),
            negotiation: NegotiationCoordinator::new(),
            socket: None,
            command_rx,
            event_tx,
            event_rx,
            socket_tx,
            socket_rx,
            engine_rx,
        }
    }

    pub async fn run(mut self) {
        info!("Session event loop started");

        loop {
            tokio::select! {
                cmd = self.command_rx.recv() => {
                    match cmd {
                        Some(c) => self.handle_command(c).await,
                        None => {
                            info!("Command channel closed. Shutting down session.");
                            break;
                        }
                    }
                }

                Some(evt) = self.event_rx.recv() => self.handle_event(evt).await,

                Some(evt) = self.socket_rx.recv() => self.handle_socket_event(evt).await,

                Some(evt) = self.engine_rx.recv() => self.handle_engine_event(evt).await,
            }
        }

        if self.signaling.room_state() == RoomState::Connected {
            let _ = self.leave_room();
        }
        info!("Session event loop finished");
    }

    async fn handle_command(&mut self, cmd: SessionCommand) {
        match cmd {
            SessionCommand::JoinRoom { connection, reply } => {
                let result = self.begin_join(connection);
                let _ = reply.send(result);
            }

            SessionCommand::LeaveRoom { reply } => {
                let closed = self.leave_room();
                let _ = reply.send(closed);
            }

            SessionCommand::Snapshot { reply } => {
                let _ = reply.send(self.snapshot());
            }
        }
    }

    fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            socket_state: self.signaling.socket_state(),
            room_state: self.signaling.room_state(),
            initiator: self.signaling.params().map(|p| p.initiator),
            outgoing_len: self.signaling.outgoing_len(),
            queued_candidates: self.negotiation.queued_candidates(),
            local_description_set: self.negotiation.local_description_set(),
            remote_description_set: self.negotiation.remote_description_set(),
            candidates_drained: self.negotiation.is_drained(),
        }
    }

    fn begin_join(&mut self, connection: ConnectionParameters) -> Result<(), SessionError> {
        info!(
            "Connecting to room {} at {}, loopback: {}",
            connection.room_id, connection.room_url, connection.loopback
        );
        self.signaling.begin_join(connection)?;
        let Some(connection) = self.signaling.connection().cloned() else {
            return Ok(());
        };

        let client = self.http_client.clone();
        let events = self.event_tx.clone();
        let relay_timeout = self.config.relay_timeout;
        tokio::spawn(async move {
            let result = join_room(client.as_ref(), &connection, relay_timeout).await;
            let _ = events.send(SessionEvent::JoinCompleted(result)).await;
        });
        Ok(())
    }

    async fn handle_event(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::JoinCompleted(result) => self.on_join_completed(result).await,
            SessionEvent::SocketConnected(result) => self.on_socket_connected(result).await,
            SessionEvent::Http(outcome) => self.on_http_outcome(outcome).await,
            SessionEvent::Engine(outcome) => self.on_engine_outcome(outcome).await,
        }
    }

    async fn on_join_completed(&mut self, result: Result<SignalingParameters, SessionError>) {
        if self.signaling.room_state() != RoomState::New {
            debug!(
                "Join finished in room state {:?}, ignoring",
                self.signaling.room_state()
            );
            return;
        }

        let params = match result {
            Ok(params) => params,
            Err(e) => {
                self.report_error(format!("Failed to join room: {}", e)).await;
                return;
            }
        };

        let loopback = self.signaling.connection().is_some_and(|c| c.loopback);
        if loopback && (!params.initiator || params.offer.is_some()) {
            self.signaling.keep_params(params);
            self.report_error("Loopback room is busy").await;
            return;
        }

        let params = self.signaling.room_joined(params);
        info!(
            "Joined room as client {} (initiator: {})",
            params.client_id, params.initiator
        );

        self.connect_socket(&params);

        let room = RoomParameters {
            initiator: params.initiator,
            ice_servers: params.ice_servers.clone(),
        };
        self.listener.on_room_joined(&room).await;

        let ice_servers = if params.ice_servers.is_empty() {
            self.config.fallback_ice_servers.clone()
        } else {
            params.ice_servers.clone()
        };
        self.engine.submit(EngineOp::Configure(ice_servers));

        if params.initiator {
            self.engine.submit(EngineOp::CreateOffer);
            return;
        }

        if let Some(offer) = params.offer.clone() {
            self.handle_remote(SignalingMessage::Offer(offer)).await;
        }
        for candidate in params.candidates.iter().cloned() {
            self.handle_remote(SignalingMessage::Candidate(candidate)).await;
        }
    }

    fn connect_socket(&self, params: &SignalingParameters) {
        let connector = self.connector.clone();
        let socket_events = self.socket_tx.clone();
        let events = self.event_tx.clone();
        let url = params.wss_url.clone();

        info!("Connecting WebSocket to {}", url);
        tokio::spawn(async move {
            let result = connector.connect(&url, socket_events).await;
            let _ = events.send(SessionEvent::SocketConnected(result)).await;
        });
    }

    async fn on_socket_connected(&mut self, result: Result<SocketLink, TransportError>) {
        let link = match result {
            Ok(link) => link,
            Err(e) => {
                self.signaling.socket_failed();
                self.report_error(format!("WebSocket connection error: {}", e))
                    .await;
                return;
            }
        };

        if self.signaling.room_state() == RoomState::Closed {
            info!("WebSocket opened after leaving, closing it");
            let (done_tx, _) = oneshot::channel();
            let _ = link.send(SocketFrame::Close(done_tx));
            self.signaling.set_socket_state(SocketState::Closed);
            return;
        }

        if !self.signaling.socket_opened() {
            warn!(
                "WebSocket opened in state {:?}",
                self.signaling.socket_state()
            );
            return;
        }
        self.socket = Some(link);

        if let Err(e) = self.register() {
            self.report_error(format!("WebSocket register error: {}", e))
                .await;
        }
    }

    fn register(&self) -> Result<(), SessionError> {
        let (Some(connection), Some(params), Some(link)) = (
            self.signaling.connection(),
            self.signaling.params(),
            self.socket.as_ref(),
        ) else {
            return Ok(());
        };

        let command = Command::Register {
            room_id: connection.room_id.clone(),
            client_id: params.client_id.clone(),
        };
        let text = encode_command(&command)?;
        info!("C->WSS: {}", text);
        link.send(SocketFrame::Register(text))?;
        Ok(())
    }

    async fn handle_socket_event(&mut self, event: SocketEvent) {
        match event {
            SocketEvent::Registered => {
                let Some(mut backlog) = self.signaling.socket_registered() else {
                    debug!(
                        "Registration acknowledged in state {:?}",
                        self.signaling.socket_state()
                    );
                    return;
                };
                info!("Registered, flushing {} queued messages", backlog.len());

                let mut failure = None;
                let mut abandoned = 0usize;
                backlog.drain_with(|_, message| {
                    if failure.is_some() {
                        abandoned += 1;
                        return;
                    }
                    if let Err(e) = self.transmit(&message) {
                        failure = Some(e);
                    }
                });
                if let Some(e) = failure {
                    if abandoned > 0 {
                        warn!(
                            "Abandoning {} queued messages after a failed write",
                            abandoned
                        );
                    }
                    self.report_error(format!("WebSocket send error: {}", e))
                        .await;
                }
            }

            SocketEvent::Message(text) => {
                info!("WSS->C: {}", text);
                if self.signaling.socket_state() != SocketState::Registered {
                    error!("Got WebSocket message in non registered state");
                    return;
                }
                match decode_socket_frame(&text) {
                    Ok(message) => self.handle_remote(message).await,
                    Err(e) => {
                        warn!("Dropping socket message: {}", e);
                        self.listener.on_message_error(&e.to_string()).await;
                    }
                }
            }

            SocketEvent::Closed => {
                self.socket = None;
                if self.signaling.socket_closed() {
                    info!("WebSocket closed by the server");
                    self.listener.on_room_left().await;
                }
            }

            SocketEvent::Error(e) => {
                if self.signaling.room_state() == RoomState::Closed {
                    warn!("WebSocket error after leaving: {}", e);
                    return;
                }
                self.signaling.socket_failed();
                self.report_error(format!("WebSocket error: {}", e)).await;
            }
        }
    }

    async fn handle_engine_event(&mut self, event: EngineEvent) {
        match event {
            EngineEvent::CandidateDiscovered(candidate) => {
                self.dispatch_gathered(SignalingMessage::Candidate(candidate))
                    .await;
            }
            EngineEvent::CandidatesRemoved(candidates) => {
                self.dispatch_gathered(SignalingMessage::RemoveCandidates(candidates))
                    .await;
            }
            EngineEvent::ConnectionStateChanged(state) => {
                info!("Peer connection state: {}", state);
            }
        }
    }

    async fn on_engine_outcome(&mut self, outcome: EngineOutcome) {
        match outcome {
            EngineOutcome::Configured(Ok(())) => debug!("Negotiation engine configured"),
            EngineOutcome::Configured(Err(e)) => {
                self.report_error(format!("Failed to create peer connection: {}", e))
                    .await;
            }

            EngineOutcome::DescriptionCreated(Ok(description)) => {
                debug!("Created {:?} description", description.sdp_type);
                self.engine.submit(EngineOp::SetLocalDescription(description));
            }
            EngineOutcome::DescriptionCreated(Err(e)) => {
                error!("Failed to create session description: {}", e);
            }

            EngineOutcome::LocalDescriptionSet(description, Ok(())) => {
                let backlog = self.negotiation.local_description_applied();
                self.apply_candidates(backlog);
                self.dispatch_local(SignalingMessage::from_description(description))
                    .await;
                for message in self.negotiation.take_held_local() {
                    self.dispatch_local(message).await;
                }
            }
            EngineOutcome::LocalDescriptionSet(description, Err(e)) => {
                error!(
                    "Failed to set local {:?} description: {}",
                    description.sdp_type, e
                );
            }

            EngineOutcome::RemoteDescriptionSet(sdp_type, Ok(())) => {
                let backlog = self.negotiation.remote_description_applied();
                self.apply_candidates(backlog);

                let Some(role) = self.signaling.role() else {
                    return;
                };
                if NegotiationCoordinator::should_answer(sdp_type, role)
                    && self.signaling.room_state() != RoomState::Closed
                {
                    info!("Remote offer applied, creating answer");
                    self.engine.submit(EngineOp::CreateAnswer);
                }
            }
            EngineOutcome::RemoteDescriptionSet(sdp_type, Err(e)) => {
                error!("Failed to set remote {:?} description: {}", sdp_type, e);
            }

            EngineOutcome::CandidateAdded(Err(e)) => warn!("Failed to add ICE candidate: {}", e),
            EngineOutcome::CandidatesRemoved(Err(e)) => {
                warn!("Failed to remove ICE candidates: {}", e)
            }
            EngineOutcome::Closed(Err(e)) => warn!("Failed to close peer connection: {}", e),
            EngineOutcome::CandidateAdded(Ok(()))
            | EngineOutcome::CandidatesRemoved(Ok(()))
            | EngineOutcome::Closed(Ok(())) => {}
        }
    }

    fn apply_candidates(&self, candidates: Vec<IceCandidate>) {
        if candidates.is_empty() {
            return;
        }
        info!("Applying {} queued remote candidates", candidates.len());
        for candidate in candidates {
            self.engine.submit(EngineOp::AddCandidate(candidate));
        }
    }

    /// Engine discoveries can overtake the completion of the call that
    /// triggered them, so they wait for the local description to go out first.
    async fn dispatch_gathered(&mut self, message: SignalingMessage) {
        match self.negotiation.hold_local(message) {
            Some(message) => self.dispatch_local(message).await,
            None => debug!(
                "Local description not set, holding {} gathered messages",
                self.negotiation.held_local()
            ),
        }
    }

    /// Sends a locally produced message to the peer on the route its role allows.
    async fn dispatch_local(&mut self, message: SignalingMessage) {
        let room_state = self.signaling.room_state();
        if room_state == RoomState::Closed {
            debug!("Room closed, dropping local {}", message.kind());
            return;
        }
        let Some(router) = self.signaling.router().copied() else {
            warn!("No room joined, dropping local {}", message.kind());
            return;
        };

        let plan = match router.route(&message, room_state) {
            Ok(plan) => plan,
            Err(e) => {
                self.report_error(e.to_string()).await;
                return;
            }
        };

        match plan.route {
            Route::RoomServer => {
                if let Err(e) = self.post_message(&message) {
                    self.report_error(e.to_string()).await;
                }
            }
            Route::Socket => self.send(message).await,
        }

        if let Some(echo) = plan.echo {
            self.handle_remote(echo).await;
        }
    }

    fn post_message(&self, message: &SignalingMessage) -> Result<(), SessionError> {
        let (Some(connection), Some(params)) =
            (self.signaling.connection(), self.signaling.params())
        else {
            return Ok(());
        };

        let url = connection.message_url(params.client_id.as_str());
        let body = encode_message(message)?;
        info!("C->ROOM: {}", body);
        self.http
            .submit(HttpPurpose::Message, HttpRequest::post(url, Some(body)));
        Ok(())
    }

    async fn send(&mut self, message: SignalingMessage) {
        match self.signaling.send(message) {
            SendDecision::Queued => debug!(
                "WebSocket not registered, queued ({} pending)",
                self.signaling.outgoing_len()
            ),
            SendDecision::Dropped(message) => error!(
                "WebSocket send() in {:?} state, dropping {}",
                self.signaling.socket_state(),
                message.kind()
            ),
            SendDecision::Transmit(message) => {
                if let Err(e) = self.transmit(&message) {
                    self.report_error(format!("WebSocket send error: {}", e))
                        .await;
                }
            }
        }
    }

    fn transmit(&self, message: &SignalingMessage) -> Result<(), SessionError> {
        let link = self.socket.as_ref().ok_or(TransportError::SocketGone)?;
        write_message(link, message)
    }

    /// Handles a message that came from the peer, whichever way it arrived.
    async fn handle_remote(&mut self, message: SignalingMessage) {
        let Some(role) = self.signaling.role() else {
            warn!("No room joined, dropping remote {}", message.kind());
            return;
        };

        match message {
            SignalingMessage::Candidate(candidate) => {
                self.listener.on_remote_candidate(&candidate).await;
                match self.negotiation.add_remote_candidate(candidate) {
                    CandidateAction::Queued => debug!(
                        "Queued remote candidate ({} pending)",
                        self.negotiation.queued_candidates()
                    ),
                    CandidateAction::Apply(candidate) => {
                        self.engine.submit(EngineOp::AddCandidate(candidate))
                    }
                }
            }

            SignalingMessage::RemoveCandidates(candidates) => {
                self.listener.on_remote_candidates_removed(&candidates).await;
                if self.negotiation.remove_candidates(&candidates) {
                    self.engine.submit(EngineOp::RemoveCandidates(candidates));
                }
            }

            SignalingMessage::Answer(description) => {
                if role != Role::Initiator {
                    self.report_error(format!(
                        "Received answer for call receiver: {}",
                        description.sdp
                    ))
                    .await;
                    return;
                }
                self.apply_remote_description(description).await;
            }

            SignalingMessage::Offer(description) => {
                if role != Role::Receiver {
                    self.report_error(format!(
                        "Received offer for call initiator: {}",
                        description.sdp
                    ))
                    .await;
                    return;
                }
                self.apply_remote_description(description).await;
            }

            SignalingMessage::Bye => {
                info!("Remote end hung up");
                self.listener.on_room_left().await;
            }

            SignalingMessage::Error(text) => {
                self.report_error(format!("WebSocket error message: {}", text))
                    .await;
            }
        }
    }

    async fn apply_remote_description(&mut self, description: SessionDescription) {
        self.listener.on_remote_description(&description).await;
        self.engine
            .submit(EngineOp::SetRemoteDescription(description));
    }

    async fn on_http_outcome(&mut self, outcome: HttpOutcome) {
        let HttpOutcome {
            purpose,
            url,
            result,
        } = outcome;

        let failure = match (purpose, result) {
            (HttpPurpose::Message, Ok(body)) => match decode_post_result(&body) {
                Ok(result) if result == POST_SUCCESS => return,
                Ok(result) => format!("Room server POST error: {}", result),
                Err(e) => format!("Room server POST error: {}", e),
            },
            (_, Ok(_)) => {
                debug!("{:?} request to {} done", purpose, url);
                return;
            }
            (_, Err(e)) => format!("{:?} request to {} failed: {}", purpose, url, e),
        };

        if self.signaling.room_state() == RoomState::Closed {
            warn!("{} (after leaving)", failure);
            return;
        }
        self.report_error(failure).await;
    }

    /// Room-level failure. Only the first report of an episode reaches the listener.
    async fn report_error(&mut self, message: impl Into<String>) {
        let message = message.into();
        error!("{}", message);
        if self.signaling.enter_error() {
            self.listener.on_error(&message).await;
        }
    }

    /// Tears the session down. Every step runs regardless of what failed before it.
    fn leave_room(&mut self) -> Option<oneshot::Receiver<()>> {
        info!("Disconnect. Room state: {:?}", self.signaling.room_state());
        let connection = self.signaling.connection().cloned();
        let params = self.signaling.params().cloned();

        if self.signaling.room_state() == RoomState::Connected
            && let (Some(connection), Some(params)) = (&connection, &params)
        {
            let url = connection.leave_url(params.client_id.as_str());
            info!("C->ROOM: POST {}", url);
            self.http
                .submit(HttpPurpose::Leave, HttpRequest::post(url, None));
        }
        self.signaling.close_room();

        let closed = match self.socket.take() {
            Some(link) => self.close_socket(link, connection.as_deref(), params.as_deref()),
            None => {
                if self.signaling.socket_state() == SocketState::Error {
                    self.signaling.set_socket_state(SocketState::Closed);
                }
                None
            }
        };

        self.negotiation.reset();
        self.signaling.clear_outgoing();
        self.engine.submit(EngineOp::Close);
        closed
    }

    fn close_socket(
        &mut self,
        link: SocketLink,
        connection: Option<&ConnectionParameters>,
        params: Option<&SignalingParameters>,
    ) -> Option<oneshot::Receiver<()>> {
        let mut unregistered = None;

        if self.signaling.socket_state() == SocketState::Registered {
            if let Err(e) = write_message(&link, &SignalingMessage::Bye) {
                warn!("Failed to send bye: {}", e);
            }
            self.signaling.set_socket_state(SocketState::Connected);

            if let (Some(connection), Some(params)) = (connection, params) {
                let url = params.socket_post_url(&connection.room_id);
                info!("C->WSS: DELETE {}", url);
                let request = HttpRequest::delete(url).with_timeout(self.config.unregister_timeout);
                unregistered = Some(self.http.submit_tracked(HttpPurpose::Unregister, request));
            }
        }

        if !matches!(
            self.signaling.socket_state(),
            SocketState::Connected | SocketState::Error
        ) {
            return None;
        }

        let (done_tx, done_rx) = oneshot::channel();
        match unregistered {
            Some(deleted) => {
                let wait = self.config.unregister_timeout;
                tokio::spawn(async move {
                    if tokio::time::timeout(wait, deleted).await.is_err() {
                        warn!("Socket DELETE still pending, closing anyway");
                    }
                    let _ = link.send(SocketFrame::Close(done_tx));
                });
            }
            None => {
                if let Err(e) = link.send(SocketFrame::Close(done_tx)) {
                    warn!("Failed to close WebSocket: {}", e);
                }
            }
        }
        self.signaling.set_socket_state(SocketState::Closed);
        Some(done_rx)
    }
}

/// Wraps a peer message in a `send` command and writes it.
fn write_message(link: &SocketLink, message: &SignalingMessage) -> Result<(), SessionError> {
    let command = Command::Send {
        message: encode_message(message)?,
    };
    let text = encode_command(&command)?;
    info!("C->WSS: {}", text);
    link.send(SocketFrame::Text(text))?;
    Ok(())
}
