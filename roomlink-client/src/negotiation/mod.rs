mod coordinator;
mod engine;
mod engine_worker;
mod rtc_engine;

pub use coordinator::*;
pub use engine::*;
pub use engine_worker::*;
pub use rtc_engine::*;
