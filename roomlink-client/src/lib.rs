mod error;
pub mod negotiation;
pub mod session;
pub mod signaling;
pub mod transport;

pub use error::*;
pub use negotiation::*;
pub use session::*;
pub use signaling::*;
pub use transport::*;
