mod http_client;
mod http_outbox;
mod socket;
mod transport_event;
mod ws_connector;

pub use http_client::*;
pub use http_outbox::*;
pub use socket::*;
pub use transport_event::*;
pub use ws_connector::*;
