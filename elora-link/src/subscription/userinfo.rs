use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Traffic and expiry figures carried by the `Subscription-Userinfo`
/// response header.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionUserInfo {
    pub upload_bytes_used: Option<u64>,
    pub download_bytes_used: Option<u64>,
    pub bytes_total: Option<u64>,
    pub expires_at: Option<NaiveDateTime>,
}

impl SubscriptionUserInfo {
    pub fn encode_header(&self) -> String {
        let mut parts = vec![];
        if let Some(upload) = self.upload_bytes_used {
            parts.push(format!("upload={}", upload));
        }
        if let Some(download) = self.download_bytes_used {
            parts.push(format!("download={}", download));
        }
        if let Some(total) = self.bytes_total {
            parts.push(format!("total={}", total));
        }
        if let Some(expires_at) = self.expires_at {
            parts.push(format!("expire={}", expires_at.and_utc().timestamp()));
        }
        parts.join("; ")
    }

    pub fn decode_header(header: &str) -> Self {
        let mut ret = Self::default();
        for (key, value) in header.split(';').filter_map(|kv| kv.split_once('=')) {
            let value = value.trim();
            match key.trim() {
                "upload" => ret.upload_bytes_used = value.parse().ok(),
                "download" => ret.download_bytes_used = value.parse().ok(),
                "total" => ret.bytes_total = value.parse().ok(),
                "expire" => {
                    ret.expires_at = value
                        .parse()
                        .ok()
                        .and_then(|ts| DateTime::from_timestamp(ts, 0))
                        .map(|dt| dt.naive_utc())
                }
                _ => {}
            }
        }
        ret
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_header() {
        let info = SubscriptionUserInfo {
            upload_bytes_used: Some(455727941),
            download_bytes_used: Some(6174315083),
            bytes_total: Some(1073741824000),
            expires_at: DateTime::from_timestamp(1671815872, 0).map(|t| t.naive_utc()),
        };
        assert_eq!(
            info.encode_header(),
            "upload=455727941; download=6174315083; total=1073741824000; expire=1671815872"
        );
    }

    #[test]
    fn test_encode_header_partial() {
        let info = SubscriptionUserInfo {
            bytes_total: Some(1024),
            ..Default::default()
        };
        assert_eq!(info.encode_header(), "total=1024");
        assert_eq!(SubscriptionUserInfo::default().encode_header(), "");
    }

    #[test]
    fn test_decode_header() {
        let header =
            "upload=455727941; download=6174315083; total=1073741824000; expire=1671815872;";
        let info = SubscriptionUserInfo::decode_header(header);
        assert_eq!(
            info,
            SubscriptionUserInfo {
                upload_bytes_used: Some(455727941),
                download_bytes_used: Some(6174315083),
                bytes_total: Some(1073741824000),
                expires_at: DateTime::from_timestamp(1671815872, 0).map(|t| t.naive_utc()),
            }
        );
        assert_eq!(SubscriptionUserInfo::decode_header(&info.encode_header()), info);
    }

    #[test]
    fn test_decode_header_empty() {
        let info = SubscriptionUserInfo::decode_header("");
        assert_eq!(info, SubscriptionUserInfo::default());
    }

    #[test]
    fn test_decode_header_garbage_values() {
        let info = SubscriptionUserInfo::decode_header("upload=abc; total=12; foo=bar");
        assert_eq!(
            info,
            SubscriptionUserInfo {
                bytes_total: Some(12),
                ..Default::default()
            }
        );
    }
}
