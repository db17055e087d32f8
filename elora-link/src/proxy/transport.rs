use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "network", rename_all = "lowercase")]
pub enum VlessTransport {
    Tcp,
    #[default]
    Ws,
    Grpc,
    HttpUpgrade,
    Xhttp(XhttpParams),
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct XhttpParams {
    /// Emitted even when empty.
    #[serde(default)]
    pub mode: String,
    #[serde(default)]
    pub extra: Option<String>,
}

impl VlessTransport {
    /// Value of the `type` query parameter.
    pub fn network_name(&self) -> &'static str {
        match self {
            VlessTransport::Tcp => "tcp",
            VlessTransport::Ws => "ws",
            VlessTransport::Grpc => "grpc",
            VlessTransport::HttpUpgrade => "httpupgrade",
            VlessTransport::Xhttp(_) => "xhttp",
        }
    }
}

impl Display for VlessTransport {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.network_name())
    }
}
