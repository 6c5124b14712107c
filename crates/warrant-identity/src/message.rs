use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::IdentityError;

/// A DIDComm-style plaintext message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Message {
    pub id: String,
    #[serde(rename = "type")]
    pub message_type: String,
    pub from: String,
    #[serde(default)]
    pub to: Vec<String>,
    #[serde(default)]
    pub body: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_time: Option<DateTime<Utc>>,
}

/// Opaque packed envelope as it travels over the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackedMessage {
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnpackMetadata {
    pub packing: PackingMode,
}

/// Result of unpacking an envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnpackedMessage {
    pub message: Message,
    pub metadata: UnpackMetadata,
}

/// How a message is wrapped for transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackingMode {
    /// Plain JSON.
    None,
    /// Compact JWS signed by the sender.
    Jws,
}

impl PackingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Jws => "jws",
        }
    }
}

impl fmt::Display for PackingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PackingMode {
    type Err = IdentityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "jws" => Ok(Self::Jws),
            other => Err(IdentityError::MalformedEnvelope(format!(
                "unsupported packing {}",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_message_wire_shape() {
        let msg = Message {
            id: "m1".into(),
            message_type: "Company Credential Response".into(),
            from: "did:key:zA".into(),
            to: vec!["did:key:zB".into()],
            body: json!({"k": 1}),
            created_time: None,
        };
        let v = serde_json::to_value(&msg).unwrap();
        assert_eq!(v["type"], "Company Credential Response");
        assert_eq!(v["to"][0], "did:key:zB");
        assert!(v.get("created_time").is_none());
    }

    #[test]
    fn test_packing_mode_parse() {
        assert_eq!("JWS".parse::<PackingMode>().unwrap(), PackingMode::Jws);
        assert_eq!(PackingMode::None.to_string(), "none");
        assert!("authcrypt".parse::<PackingMode>().is_err());
    }
}
