mod b64_links;
mod userinfo;

use serde::Serialize;
use thiserror::Error;

pub use b64_links::{decode_b64_links, encode_b64_links};
pub use userinfo::SubscriptionUserInfo;

use crate::proxy::ConnectionDescriptor;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("invalid UTF-8 or Base64 encoding")]
    InvalidEncoding,
    #[error("subscription contains no recognizable proxy")]
    NoProxy,
}

pub type DecodeResult<T> = Result<T, DecodeError>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Subscription {
    pub proxies: Vec<ConnectionDescriptor>,
}

impl Subscription {
    pub fn ensure_proxies(self) -> DecodeResult<Subscription> {
        if self.proxies.is_empty() {
            Err(DecodeError::NoProxy)
        } else {
            Ok(self)
        }
    }
}
