use std::borrow::Cow;
use std::collections::BTreeMap;

use percent_encoding::percent_decode_str;
use thiserror::Error;
use url::{Host, Url};

use crate::proxy::ConnectionDescriptor;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("invalid URL")]
    InvalidUrl,
    #[error("invalid URL or UTF-8 encoding")]
    InvalidEncoding,
    #[error(r#""{0}" is required, but is missing"#)]
    MissingInfo(&'static str),
    #[error(r#"unknown value for field "{0}""#)]
    UnknownValue(&'static str),
    #[error("unknown URL scheme")]
    UnknownScheme,
    #[error(r#"extra parameter "{0}""#)]
    ExtraParameters(String),
}

pub type DecodeResult<T> = Result<T, DecodeError>;

pub(super) type QueryMap<'a> = BTreeMap<Cow<'a, str>, Cow<'a, str>>;

pub fn decode_share_link(link: &str) -> DecodeResult<ConnectionDescriptor> {
    let url = Url::parse(link.trim()).map_err(|_| DecodeError::InvalidUrl)?;
    let mut queries = url.query_pairs().collect::<QueryMap>();

    let descriptor = match url.scheme() {
        "vless" => ConnectionDescriptor::decode_share_link(&url, &mut queries)?,
        _ => return Err(DecodeError::UnknownScheme),
    };

    while let Some((extra_key, extra_value)) = queries.pop_first() {
        if !matches!(&*extra_value, "" | "none" | "false" | "off" | "original") {
            return Err(DecodeError::ExtraParameters(extra_key.into()));
        }
    }

    Ok(descriptor)
}

/// Falls back to `address:port` when the link carries no fragment. A literal
/// `+` means space unless the fragment already spells spaces out.
pub(super) fn extract_name_from_frag(url: &Url, address: &str, port: u16) -> DecodeResult<String> {
    let Some(frag) = url.fragment() else {
        return Ok(format!("{}:{}", address, port));
    };
    let frag = if frag.contains(' ') || frag.contains("%20") {
        Cow::Borrowed(frag)
    } else {
        Cow::Owned(frag.replace('+', "%20"))
    };
    percent_decode_str(&frag)
        .decode_utf8()
        .map(|s| s.into_owned())
        .map_err(|_| DecodeError::InvalidEncoding)
}

/// `vless` is not a ["special"](https://url.spec.whatwg.org/#is-special)
/// scheme, so IPv4 hosts come back as opaque domains and are kept verbatim.
/// IPv6 hosts keep their brackets so the address can be encoded again as is.
pub(super) fn parse_address(url: &Url) -> DecodeResult<String> {
    match url.host() {
        Some(Host::Domain(domain)) if !domain.is_empty() => percent_decode_str(domain)
            .decode_utf8()
            .map(|s| s.into_owned())
            .map_err(|_| DecodeError::InvalidEncoding),
        Some(Host::Ipv4(ip)) => Ok(ip.to_string()),
        Some(Host::Ipv6(ip)) => Ok(format!("[{}]", ip)),
        _ => Err(DecodeError::MissingInfo("address")),
    }
}

pub(super) fn take_non_empty(queries: &mut QueryMap, key: &str) -> Option<String> {
    queries
        .remove(key)
        .filter(|v| !v.is_empty())
        .map(|v| v.into_owned())
}
