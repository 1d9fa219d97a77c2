use roomlink_core::{RoomState, SessionDescription, SignalingMessage};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Initiator,
    Receiver,
}

impl Role {
    pub fn from_initiator(initiator: bool) -> Self {
        if initiator {
            Role::Initiator
        } else {
            Role::Receiver
        }
    }
}

/// Which transport a local message travels on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// `POST {base}/message/{roomId}/{clientId}`
    RoomServer,
    /// `send` command over the registered socket.
    Socket,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePlan {
    pub route: Route,
    /// Loopback copy to feed back as if it came from the peer.
    pub echo: Option<SignalingMessage>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    #[error("Sending {0} in non connected state")]
    NotConnected(&'static str),

    #[error("Sending answer in loopback mode")]
    AnswerInLoopback,

    #[error("Sending offer as call receiver")]
    OfferFromReceiver,

    #[error("{0} messages are not routed to the peer")]
    NotRoutable(&'static str),
}

/// Picks the transport for locally produced offers, answers and candidates.
#[derive(Debug, Clone, Copy)]
pub struct CandidateRouter {
    role: Role,
    loopback: bool,
}

impl CandidateRouter {
    pub fn new(role: Role, loopback: bool) -> Self {
        Self { role, loopback }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn route(
        &self,
        message: &SignalingMessage,
        room_state: RoomState,
    ) -> Result<RoutePlan, RouteError> {
        match message {
            SignalingMessage::Offer(desc) => {
                if self.role == Role::Receiver {
                    return Err(RouteError::OfferFromReceiver);
                }
                self.require_connected(room_state, "offer SDP")?;
                let echo = self
                    .loopback
                    .then(|| SignalingMessage::Answer(SessionDescription::answer(desc.sdp.clone())));
                Ok(RoutePlan {
                    route: Route::RoomServer,
                    echo,
                })
            }
            SignalingMessage::Answer(_) => {
                if self.loopback {
                    return Err(RouteError::AnswerInLoopback);
                }
                Ok(RoutePlan {
                    route: Route::Socket,
                    echo: None,
                })
            }
            SignalingMessage::Candidate(_) => self.route_candidates(message, room_state, "ICE candidate"),
            SignalingMessage::RemoveCandidates(_) => {
                self.route_candidates(message, room_state, "ICE candidate removals")
            }
            SignalingMessage::Bye | SignalingMessage::Error(_) => {
                Err(RouteError::NotRoutable(message.kind()))
            }
        }
    }

    // Initiators reach the room server until the peer registers; receivers
    // only ever talk through the socket.
    fn route_candidates(
        &self,
        message: &SignalingMessage,
        room_state: RoomState,
        what: &'static str,
    ) -> Result<RoutePlan, RouteError> {
        match self.role {
            Role::Initiator => {
                self.require_connected(room_state, what)?;
                Ok(RoutePlan {
                    route: Route::RoomServer,
                    echo: self.loopback.then(|| message.clone()),
                })
            }
            Role::Receiver => Ok(RoutePlan {
                route: Route::Socket,
                echo: None,
            }),
        }
    }

    fn require_connected(&self, room_state: RoomState, what: &'static str) -> Result<(), RouteError> {
        if room_state == RoomState::Connected {
            Ok(())
        } else {
            Err(RouteError::NotConnected(what))
        }
    }
}
