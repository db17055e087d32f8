use serde::{Deserialize, Serialize};

pub mod security;
pub mod transport;

pub use security::{RealityParams, VlessSecurity};
pub use transport::{VlessTransport, XhttpParams};

/// Everything needed to produce one `vless://` share link for one client of
/// one inbound.
///
/// Values that end up verbatim in the link (address, user id, host, SNI,
/// fingerprint, flow, Reality short id and public key, xhttp mode) are not
/// checked here. Build descriptors through
/// [`InboundConfig::to_descriptor`](crate::inbound::InboundConfig::to_descriptor)
/// to have them validated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionDescriptor {
    pub remark: String,
    pub address: String,
    pub port: u16,
    pub user_id: String,
    #[serde(default)]
    pub flow: Option<String>,
    #[serde(default)]
    pub security: VlessSecurity,
    #[serde(default)]
    pub sni: Option<String>,
    #[serde(default)]
    pub alpn: Vec<String>,
    #[serde(default)]
    pub fingerprint: String,
    #[serde(default)]
    pub transport: VlessTransport,
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub path: String,
}
