mod candidate_router;
mod outgoing_queue;
mod signaling_state;

pub use candidate_router::*;
pub use outgoing_queue::*;
pub use signaling_state::*;
