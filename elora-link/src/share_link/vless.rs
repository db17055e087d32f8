use std::borrow::Cow;

use percent_encoding::percent_decode_str;
use url::Url;

use super::decode::{
    extract_name_from_frag, parse_address, take_non_empty, DecodeError, DecodeResult, QueryMap,
};
use super::encode::escape_component;
use crate::proxy::{
    ConnectionDescriptor, RealityParams, VlessSecurity, VlessTransport, XhttpParams,
};

fn non_empty(s: &Option<String>) -> Option<&str> {
    s.as_deref().filter(|s| !s.is_empty())
}

impl ConnectionDescriptor {
    pub(super) fn encode_share_link(&self) -> String {
        let mut queries: Vec<(&'static str, Cow<'_, str>)> = Vec::with_capacity(16);

        queries.push(("encryption", "none".into()));
        if let Some(flow) = non_empty(&self.flow) {
            queries.push(("flow", flow.into()));
        }
        queries.push(("security", self.security.mode_name().into()));
        if let Some(sni) = non_empty(&self.sni) {
            queries.push(("sni", sni.into()));
        }
        let alpn = self.alpn.join(",");
        if !alpn.is_empty() {
            queries.push(("alpn", escape_component(&alpn).into_owned().into()));
        }
        queries.push(("fp", self.fingerprint.as_str().into()));
        queries.push(("type", self.transport.network_name().into()));
        if let Some(host) = non_empty(&self.host) {
            queries.push(("host", host.into()));
            queries.push(("headerType", "http".into()));
        }
        queries.push(("path", escape_component(&self.path)));

        if let VlessSecurity::Reality(RealityParams {
            short_id,
            public_key,
            spider_x,
        }) = &self.security
        {
            if let Some(sid) = non_empty(short_id) {
                queries.push(("sid", sid.into()));
            }
            if let Some(pbk) = non_empty(public_key) {
                queries.push(("pbk", pbk.into()));
            }
            if let Some(spx) = non_empty(spider_x) {
                queries.push(("spx", escape_component(spx)));
            }
        }
        if let VlessTransport::Xhttp(XhttpParams { mode, extra }) = &self.transport {
            queries.push(("mode", mode.as_str().into()));
            if let Some(extra) = non_empty(extra) {
                queries.push(("extra", escape_component(extra)));
            }
        }

        let mut link = format!("vless://{}@{}:{}", self.user_id, self.address, self.port);
        for (idx, (key, value)) in queries.iter().enumerate() {
            link.push(if idx == 0 { '?' } else { '&' });
            link.push_str(key);
            link.push('=');
            link.push_str(value);
        }
        link.push('#');
        link.push_str(&escape_component(&self.remark));
        link
    }

    pub(super) fn decode_share_link(url: &Url, queries: &mut QueryMap) -> DecodeResult<Self> {
        let user_id = percent_decode_str(url.username())
            .decode_utf8()
            .map_err(|_| DecodeError::InvalidEncoding)?
            .into_owned();
        if user_id.is_empty() {
            return Err(DecodeError::MissingInfo("user_id"));
        }
        let address = parse_address(url)?;
        let port = url.port().ok_or(DecodeError::MissingInfo("port"))?;

        if let Some(encryption) = queries.remove("encryption") {
            if !matches!(&*encryption, "" | "none") {
                return Err(DecodeError::UnknownValue("encryption"));
            }
        }
        let flow = take_non_empty(queries, "flow");

        let security = match queries.remove("security").as_deref() {
            None | Some("") | Some("none") => VlessSecurity::None,
            Some("tls") => VlessSecurity::Tls,
            Some("reality") => VlessSecurity::Reality(RealityParams {
                short_id: take_non_empty(queries, "sid"),
                public_key: take_non_empty(queries, "pbk"),
                spider_x: take_non_empty(queries, "spx"),
            }),
            Some(_) => return Err(DecodeError::UnknownValue("security")),
        };
        let sni = take_non_empty(queries, "sni");
        let alpn = queries
            .remove("alpn")
            .filter(|s| !s.is_empty())
            .map(|s| s.split(',').map(|a| a.to_owned()).collect())
            .unwrap_or_default();
        let fingerprint = queries
            .remove("fp")
            .map(|s| s.into_owned())
            .unwrap_or_default();

        let transport = match queries.remove("type").as_deref() {
            None | Some("") | Some("tcp") => VlessTransport::Tcp,
            Some("ws") => VlessTransport::Ws,
            Some("grpc") => VlessTransport::Grpc,
            Some("httpupgrade") => VlessTransport::HttpUpgrade,
            Some("xhttp") => VlessTransport::Xhttp(XhttpParams {
                mode: queries
                    .remove("mode")
                    .map(|s| s.into_owned())
                    .unwrap_or_default(),
                extra: take_non_empty(queries, "extra"),
            }),
            Some(_) => return Err(DecodeError::UnknownValue("type")),
        };
        let host = take_non_empty(queries, "host");
        if let Some(header_type) = queries.remove("headerType") {
            if !matches!(&*header_type, "" | "none" | "http") {
                return Err(DecodeError::UnknownValue("headerType"));
            }
        }
        let path = queries
            .remove("path")
            .map(|s| s.into_owned())
            .unwrap_or_default();

        Ok(ConnectionDescriptor {
            remark: extract_name_from_frag(url, &address, port)?,
            address,
            port,
            user_id,
            flow,
            security,
            sni,
            alpn,
            fingerprint,
            transport,
            host,
            path,
        })
    }
}
