pub mod codec;
pub mod model;

pub use codec::CodecError;
pub use model::*;
