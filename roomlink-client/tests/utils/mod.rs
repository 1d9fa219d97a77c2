pub mod room_helpers;

pub use event_log::*;
pub use mock_engine::*;
pub use mock_room_server::*;
pub use mock_socket::*;
pub use recording_listener::*;
pub use room_helpers::*;
