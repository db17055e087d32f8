use serde::Deserialize;

use super::{ConfigError, ConfigResult, InboundConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InboundFileFormat {
    Json,
    Toml,
}

impl InboundFileFormat {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "json" => Some(Self::Json),
            "toml" => Some(Self::Toml),
            _ => None,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum JsonInbounds {
    Many(Vec<InboundConfig>),
    One(InboundConfig),
}

#[derive(Deserialize)]
struct TomlInbounds {
    #[serde(rename = "inbound")]
    inbounds: Vec<InboundConfig>,
}

/// Parse inbound records. A JSON document is either one record or an array
/// of them; a TOML document holds them as an `[[inbound]]` array of tables.
pub fn parse_inbounds(text: &str, format: InboundFileFormat) -> ConfigResult<Vec<InboundConfig>> {
    match format {
        InboundFileFormat::Json => {
            match serde_json::from_str(text).map_err(|e| ConfigError::ParseFile(e.to_string()))? {
                JsonInbounds::Many(inbounds) => Ok(inbounds),
                JsonInbounds::One(inbound) => Ok(vec![inbound]),
            }
        }
        InboundFileFormat::Toml => toml_edit::de::from_str::<TomlInbounds>(text)
            .map(|doc| doc.inbounds)
            .map_err(|e| ConfigError::ParseFile(e.to_string())),
    }
}
