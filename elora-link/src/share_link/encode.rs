use std::borrow::Cow;

use percent_encoding::{percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::proxy::ConnectionDescriptor;

/// Everything except RFC 3986 unreserved characters is escaped.
pub(super) const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

pub fn encode_share_link(descriptor: &ConnectionDescriptor) -> String {
    descriptor.encode_share_link()
}

pub(super) fn escape_component(s: &str) -> Cow<'_, str> {
    percent_encode(s.as_bytes(), URI_COMPONENT).into()
}
