use std::net::Ipv6Addr;

use log::warn;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::proxy::{
    ConnectionDescriptor, RealityParams, VlessSecurity, VlessTransport, XhttpParams,
};

mod error;
mod load;

pub use error::{ConfigError, ConfigResult};
pub use load::{parse_inbounds, InboundFileFormat};

/// Widest `extra` payload an inbound record can store, in characters.
pub const MAX_EXTRA_LEN: usize = 2048;

fn default_path() -> String {
    "/".into()
}

fn default_security() -> String {
    "none".into()
}

fn default_network() -> String {
    "ws".into()
}

/// A stored inbound configuration, shared by every client of the inbound.
/// Enum-like fields are kept as text until [`InboundConfig::to_descriptor`]
/// validates them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundConfig {
    #[serde(default)]
    pub remark: String,
    pub address: String,
    pub port: u16,
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub sni: String,
    #[serde(default)]
    pub fingerprint: String,
    #[serde(default = "default_path")]
    pub path: String,
    #[serde(default = "default_security")]
    pub security: String,
    #[serde(default)]
    pub short_id: String,
    #[serde(default)]
    pub public_key: String,
    #[serde(default)]
    pub spider_x: String,
    #[serde(default)]
    pub flow: String,
    #[serde(default = "default_network", alias = "type")]
    pub network: String,
    #[serde(default)]
    pub alpn: Vec<String>,
    #[serde(default, alias = "mode")]
    pub config_mode: String,
    #[serde(default)]
    pub extra: String,
}

impl Default for InboundConfig {
    fn default() -> Self {
        Self {
            remark: String::new(),
            address: String::new(),
            port: 0,
            host: String::new(),
            sni: String::new(),
            fingerprint: String::new(),
            path: default_path(),
            security: default_security(),
            short_id: String::new(),
            public_key: String::new(),
            spider_x: String::new(),
            flow: String::new(),
            network: default_network(),
            alpn: vec![],
            config_mode: String::new(),
            extra: String::new(),
        }
    }
}

fn opt(s: &str) -> Option<String> {
    (!s.is_empty()).then(|| s.to_owned())
}

impl InboundConfig {
    /// Build the descriptor for one client. `remark` overrides the record's
    /// own remark.
    pub fn to_descriptor(
        &self,
        user_id: &Uuid,
        remark: Option<&str>,
    ) -> ConfigResult<ConnectionDescriptor> {
        if self.address.is_empty() {
            return Err(ConfigError::MissingField {
                inbound: self.remark.clone(),
                field: "address",
            });
        }
        if self.port == 0 {
            return Err(self.invalid("port"));
        }
        if self.address.contains(|c: char| matches!(c, '@' | '/')) {
            return Err(self.unsafe_char("address"));
        }
        for (field, value) in [
            ("address", &self.address),
            ("host", &self.host),
            ("sni", &self.sni),
            ("fingerprint", &self.fingerprint),
            ("flow", &self.flow),
            ("short_id", &self.short_id),
            ("public_key", &self.public_key),
            ("config_mode", &self.config_mode),
        ] {
            if !is_verbatim_safe(value) {
                return Err(self.unsafe_char(field));
            }
        }

        let security = match self.security.as_str() {
            "" | "none" => VlessSecurity::None,
            "tls" => VlessSecurity::Tls,
            "reality" => VlessSecurity::Reality(RealityParams {
                short_id: opt(&self.short_id),
                public_key: opt(&self.public_key),
                spider_x: opt(&self.spider_x),
            }),
            _ => return Err(self.unknown("security", &self.security)),
        };
        if !matches!(security, VlessSecurity::Reality(_))
            && [&self.short_id, &self.public_key, &self.spider_x]
                .iter()
                .any(|s| !s.is_empty())
        {
            warn!(
                r#"Inbound "{}": Reality settings are ignored with security "{}""#,
                self.remark, security
            );
        }

        let transport = match self.network.as_str() {
            "tcp" => VlessTransport::Tcp,
            "" | "ws" => VlessTransport::Ws,
            "grpc" => VlessTransport::Grpc,
            "httpupgrade" => VlessTransport::HttpUpgrade,
            "xhttp" => {
                if self.extra.chars().count() > MAX_EXTRA_LEN {
                    return Err(self.invalid("extra"));
                }
                VlessTransport::Xhttp(XhttpParams {
                    mode: self.config_mode.clone(),
                    extra: opt(&self.extra),
                })
            }
            _ => return Err(self.unknown("network", &self.network)),
        };
        if !matches!(transport, VlessTransport::Xhttp(_))
            && !(self.config_mode.is_empty() && self.extra.is_empty())
        {
            warn!(
                r#"Inbound "{}": xhttp settings are ignored with network "{}""#,
                self.remark, transport
            );
        }

        Ok(ConnectionDescriptor {
            remark: remark.unwrap_or(self.remark.as_str()).to_owned(),
            address: self.link_address(),
            port: self.port,
            user_id: user_id.to_string(),
            flow: opt(&self.flow),
            security,
            sni: opt(&self.sni),
            alpn: self.alpn.clone(),
            fingerprint: self.fingerprint.clone(),
            transport,
            host: opt(&self.host),
            path: self.path.clone(),
        })
    }

    /// Bare IPv6 literals are bracketed, keeping the record's spelling.
    fn link_address(&self) -> String {
        if self.address.parse::<Ipv6Addr>().is_ok() {
            format!("[{}]", self.address)
        } else {
            self.address.clone()
        }
    }

    fn invalid(&self, field: &'static str) -> ConfigError {
        ConfigError::InvalidParam {
            inbound: self.remark.clone(),
            field,
        }
    }

    fn unsafe_char(&self, field: &'static str) -> ConfigError {
        ConfigError::UnsafeCharacter {
            inbound: self.remark.clone(),
            field,
        }
    }

    fn unknown(&self, field: &'static str, value: &str) -> ConfigError {
        ConfigError::UnknownValue {
            inbound: self.remark.clone(),
            field,
            value: value.to_owned(),
        }
    }
}

/// Whether `value` can be placed in a share link without escaping.
fn is_verbatim_safe(value: &str) -> bool {
    !value
        .chars()
        .any(|c| c.is_whitespace() || c.is_control() || matches!(c, '&' | '#' | '?' | '%'))
}

#[cfg(test)]
mod tests {
    use uuid::uuid;

    use super::*;
    use crate::share_link::encode_share_link;

    const USER_ID: Uuid = uuid!("22222222-3333-4444-5555-666666666666");

    fn inbound() -> InboundConfig {
        InboundConfig {
            remark: "de-1".into(),
            address: "a.co".into(),
            port: 443,
            fingerprint: "chrome".into(),
            security: "tls".into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_to_descriptor() {
        let descriptor = inbound().to_descriptor(&USER_ID, None).unwrap();
        assert_eq!(
            descriptor,
            ConnectionDescriptor {
                remark: "de-1".into(),
                address: "a.co".into(),
                port: 443,
                user_id: "22222222-3333-4444-5555-666666666666".into(),
                flow: None,
                security: VlessSecurity::Tls,
                sni: None,
                alpn: vec![],
                fingerprint: "chrome".into(),
                transport: VlessTransport::Ws,
                host: None,
                path: "/".into(),
            }
        );
    }

    #[test]
    fn test_to_descriptor_remark_override() {
        let descriptor = inbound().to_descriptor(&USER_ID, Some("alice")).unwrap();
        assert_eq!(descriptor.remark, "alice");
    }

    #[test]
    fn test_to_descriptor_reality_xhttp() {
        let config = InboundConfig {
            security: "reality".into(),
            short_id: "ab".into(),
            public_key: "pk".into(),
            network: "xhttp".into(),
            config_mode: "packet-up".into(),
            ..inbound()
        };
        let descriptor = config.to_descriptor(&USER_ID, None).unwrap();
        assert_eq!(
            descriptor.security,
            VlessSecurity::Reality(RealityParams {
                short_id: Some("ab".into()),
                public_key: Some("pk".into()),
                spider_x: None,
            })
        );
        assert_eq!(
            descriptor.transport,
            VlessTransport::Xhttp(XhttpParams {
                mode: "packet-up".into(),
                extra: None,
            })
        );
        assert_eq!(
            encode_share_link(&descriptor),
            "vless://22222222-3333-4444-5555-666666666666@a.co:443?encryption=none&security=reality&fp=chrome&type=xhttp&path=%2F&sid=ab&pbk=pk&mode=packet-up#de-1"
        );
    }

    #[test]
    fn test_to_descriptor_drops_gated_fields() {
        let config = InboundConfig {
            short_id: "ab".into(),
            config_mode: "auto".into(),
            extra: "{}".into(),
            ..inbound()
        };
        let descriptor = config.to_descriptor(&USER_ID, None).unwrap();
        assert_eq!(descriptor.security, VlessSecurity::Tls);
        assert_eq!(descriptor.transport, VlessTransport::Ws);
    }

    #[test]
    fn test_to_descriptor_unknown_values() {
        let cases = [
            (
                InboundConfig {
                    security: "xtls".into(),
                    ..inbound()
                },
                "security",
                "xtls",
            ),
            (
                InboundConfig {
                    network: "kcp".into(),
                    ..inbound()
                },
                "network",
                "kcp",
            ),
        ];
        for (config, field, value) in cases {
            assert_eq!(
                config.to_descriptor(&USER_ID, None).unwrap_err(),
                ConfigError::UnknownValue {
                    inbound: "de-1".into(),
                    field,
                    value: value.into(),
                }
            );
        }
    }

    #[test]
    fn test_to_descriptor_missing_address() {
        let config = InboundConfig {
            address: "".into(),
            ..inbound()
        };
        assert_eq!(
            config.to_descriptor(&USER_ID, None).unwrap_err(),
            ConfigError::MissingField {
                inbound: "de-1".into(),
                field: "address",
            }
        );
    }

    #[test]
    fn test_to_descriptor_invalid_params() {
        let cases = [
            (
                InboundConfig {
                    port: 0,
                    ..inbound()
                },
                "port",
            ),
            (
                InboundConfig {
                    network: "xhttp".into(),
                    extra: "x".repeat(MAX_EXTRA_LEN + 1),
                    ..inbound()
                },
                "extra",
            ),
        ];
        for (config, field) in cases {
            assert_eq!(
                config.to_descriptor(&USER_ID, None).unwrap_err(),
                ConfigError::InvalidParam {
                    inbound: "de-1".into(),
                    field,
                }
            );
        }
    }

    #[test]
    fn test_to_descriptor_extra_at_limit() {
        let config = InboundConfig {
            network: "xhttp".into(),
            extra: "x".repeat(MAX_EXTRA_LEN),
            ..inbound()
        };
        assert!(config.to_descriptor(&USER_ID, None).is_ok());
    }

    #[test]
    fn test_to_descriptor_unsafe_characters() {
        let cases = [
            (
                InboundConfig {
                    address: "a.co/x".into(),
                    ..inbound()
                },
                "address",
            ),
            (
                InboundConfig {
                    address: "u@a.co".into(),
                    ..inbound()
                },
                "address",
            ),
            (
                InboundConfig {
                    host: "a.co&b=c".into(),
                    ..inbound()
                },
                "host",
            ),
            (
                InboundConfig {
                    sni: "a .co".into(),
                    ..inbound()
                },
                "sni",
            ),
            (
                InboundConfig {
                    public_key: "ab#c".into(),
                    ..inbound()
                },
                "public_key",
            ),
            (
                InboundConfig {
                    config_mode: "a%20".into(),
                    ..inbound()
                },
                "config_mode",
            ),
        ];
        for (config, field) in cases {
            assert_eq!(
                config.to_descriptor(&USER_ID, None).unwrap_err(),
                ConfigError::UnsafeCharacter {
                    inbound: "de-1".into(),
                    field,
                },
                "{field}"
            );
        }
    }

    #[test]
    fn test_to_descriptor_ipv6_address() {
        let cases: [(&str, &str); 4] = [
            ("2001:DB8:0:0::1", "[2001:DB8:0:0::1]"),
            ("::1", "[::1]"),
            ("[2001:db8::1]", "[2001:db8::1]"),
            ("1.2.3.4", "1.2.3.4"),
        ];
        for (address, link_address) in cases {
            let config = InboundConfig {
                address: address.into(),
                ..inbound()
            };
            let descriptor = config.to_descriptor(&USER_ID, None).unwrap();
            assert_eq!(descriptor.address, link_address);
            let link = encode_share_link(&descriptor);
            assert!(
                link.contains(&format!("@{}:443?", link_address)),
                "{link}"
            );
        }
    }

    #[test]
    fn test_to_descriptor_extra_counts_characters() {
        let config = InboundConfig {
            network: "xhttp".into(),
            extra: "节".repeat(MAX_EXTRA_LEN),
            ..inbound()
        };
        let descriptor = config.to_descriptor(&USER_ID, None).unwrap();
        assert!(matches!(
            descriptor.transport,
            VlessTransport::Xhttp(XhttpParams { extra: Some(_), .. })
        ));
    }

    #[test]
    fn test_to_descriptor_oversized_extra_off_xhttp() {
        let config = InboundConfig {
            network: "ws".into(),
            extra: "x".repeat(MAX_EXTRA_LEN + 1),
            ..inbound()
        };
        let descriptor = config.to_descriptor(&USER_ID, None).unwrap();
        assert_eq!(descriptor.transport, VlessTransport::Ws);
    }
}
