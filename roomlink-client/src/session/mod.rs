mod join;
mod session;
mod session_command;
mod session_config;
mod session_event;
mod session_handle;
mod session_listener;

pub use session::*;
pub use session_command::*;
pub use session_config::*;
pub use session_event::*;
pub use session_handle::*;
pub use session_listener::*;
