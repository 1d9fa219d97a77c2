pub use roomlink_core::model::{ConnectionParameters, RoomState, SignalingMessage, SocketState};

pub mod model {
    pub use roomlink_core::model::*;
}

pub mod codec {
    pub use roomlink_core::codec::*;
}

#[cfg(feature = "client")]
pub mod client {
    pub use roomlink_client::*;
}
