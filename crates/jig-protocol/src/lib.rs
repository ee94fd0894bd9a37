pub mod codec;
pub mod fragment;
pub mod frame;
pub mod parser;

pub use codec::JigCodec;
pub use fragment::ResultFragment;
pub use frame::WireFrame;
pub use parser::{Decoded, decode_wire};
