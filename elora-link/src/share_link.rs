mod decode;
mod encode;
mod vless;

pub use decode::{decode_share_link, DecodeError, DecodeResult};
pub use encode::encode_share_link;
