use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum VlessSecurity {
    #[default]
    None,
    Tls,
    Reality(RealityParams),
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RealityParams {
    #[serde(default)]
    pub short_id: Option<String>,
    #[serde(default)]
    pub public_key: Option<String>,
    #[serde(default)]
    pub spider_x: Option<String>,
}

impl VlessSecurity {
    /// Value of the `security` query parameter.
    pub fn mode_name(&self) -> &'static str {
        match self {
            VlessSecurity::None => "none",
            VlessSecurity::Tls => "tls",
            VlessSecurity::Reality(_) => "reality",
        }
    }
}

impl Display for VlessSecurity {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.mode_name())
    }
}
