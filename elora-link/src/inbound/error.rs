use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error(r#"inbound "{inbound:}" is missing required field "{field:}""#)]
    MissingField {
        inbound: String,
        field: &'static str,
    },
    #[error(r#"config field "{field:}" for inbound "{inbound:}" is not valid"#)]
    InvalidParam {
        inbound: String,
        field: &'static str,
    },
    #[error(r#"unknown value "{value:}" for field "{field:}" of inbound "{inbound:}""#)]
    UnknownValue {
        inbound: String,
        field: &'static str,
        value: String,
    },
    #[error(r#"field "{field:}" of inbound "{inbound:}" contains characters that cannot appear in a share link"#)]
    UnsafeCharacter {
        inbound: String,
        field: &'static str,
    },
    #[error("error parsing inbound file: {0}")]
    ParseFile(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;
