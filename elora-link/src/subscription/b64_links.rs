use std::str;

use base64::engine::general_purpose::STANDARD as base64;
use base64::prelude::*;
use log::debug;

use super::{DecodeError, DecodeResult, Subscription};
use crate::share_link::decode_share_link;

/// Subscription body: every link on its own line, Base64 encoded as a whole.
pub fn encode_b64_links<I, S>(links: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut body = String::new();
    for link in links {
        if !body.is_empty() {
            body.push('\n');
        }
        body.push_str(link.as_ref());
    }
    base64.encode(body)
}

pub fn decode_b64_links(data: &[u8]) -> DecodeResult<Subscription> {
    let data = str::from_utf8(data).map_err(|_| DecodeError::InvalidEncoding)?;
    let proxies = data
        .lines()
        .filter_map(|l| base64.decode(l.trim()).ok())
        .map(|l| String::from_utf8(l).unwrap_or_default())
        .flat_map(|l| {
            l.lines()
                .filter_map(|l| {
                    decode_share_link(l)
                        .map_err(|e| debug!("Skipping subscription line: {}", e))
                        .ok()
                })
                .collect::<Vec<_>>()
        })
        .collect();
    Ok(Subscription { proxies })
}
