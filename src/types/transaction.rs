//! Raw blockchain transaction record

use serde::{Deserialize, Deserializer, Serialize};

/// A single on-chain transaction as delivered by the upstream feed.
///
/// Immutable once ingested. Field aliases match the column names used by
/// the transaction source (`TxHash`, `From`, `To`, ...), so records can be
/// deserialized straight off the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique transaction hash
    #[serde(alias = "TxHash")]
    pub hash: String,

    /// Sender address
    #[serde(alias = "From")]
    pub from: String,

    /// Receiver address
    #[serde(alias = "To", default)]
    pub to: String,

    /// Transferred amount in native units (non-negative)
    #[serde(alias = "Value", default)]
    pub value: f64,

    /// Block height the transaction was included at
    #[serde(alias = "BlockHeight", default)]
    pub block_height: u64,

    /// Whether the transaction execution errored
    #[serde(
        alias = "isError",
        default,
        deserialize_with = "deserialize_flexible_bool"
    )]
    pub is_error: bool,

    /// Unix timestamp in seconds (logical time for windowing)
    #[serde(alias = "TimeStamp", default)]
    pub timestamp: i64,
}

impl Transaction {
    pub fn new(hash: impl Into<String>, from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            hash: hash.into(),
            from: from.into(),
            to: to.into(),
            value: 0.0,
            block_height: 0,
            is_error: false,
            timestamp: 0,
        }
    }

    pub fn with_value(mut self, value: f64) -> Self {
        self.value = value;
        self
    }

    pub fn with_error(mut self, is_error: bool) -> Self {
        self.is_error = is_error;
        self
    }

    pub fn with_timestamp(mut self, timestamp: i64) -> Self {
        self.timestamp = timestamp;
        self
    }
}

/// Accepts the error-flag spellings seen in real feeds: booleans, 0/1
/// integers, and strings like "1", "true", "yes", "error".
fn deserialize_flexible_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flexible {
        Bool(bool),
        Int(i64),
        Float(f64),
        Str(String),
    }

    Ok(match Flexible::deserialize(deserializer)? {
        Flexible::Bool(b) => b,
        Flexible::Int(i) => i != 0,
        Flexible::Float(f) => f != 0.0,
        Flexible::Str(s) => matches!(
            s.trim().to_lowercase().as_str(),
            "1" | "true" | "yes" | "error"
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_source_column_names() {
        let json = r#"{
            "TxHash": "0xabc",
            "From": "0x1111",
            "To": "0x2222",
            "Value": 1.5,
            "BlockHeight": 19000000,
            "isError": "1",
            "TimeStamp": 1700000000
        }"#;

        let tx: Transaction = serde_json::from_str(json).unwrap();
        assert_eq!(tx.hash, "0xabc");
        assert_eq!(tx.value, 1.5);
        assert!(tx.is_error);
        assert_eq!(tx.block_height, 19000000);
    }

    #[test]
    fn test_flexible_error_flag() {
        for (raw, expected) in [
            ("true", true),
            ("false", false),
            ("1", true),
            ("0", false),
            ("\"yes\"", true),
            ("\"no\"", false),
            ("\"error\"", true),
        ] {
            let json = format!(r#"{{"hash":"h","from":"a","isError":{}}}"#, raw);
            let tx: Transaction = serde_json::from_str(&json).unwrap();
            assert_eq!(tx.is_error, expected, "raw value {}", raw);
        }
    }

    #[test]
    fn test_missing_optional_fields_default() {
        let tx: Transaction = serde_json::from_str(r#"{"hash":"h","from":"a"}"#).unwrap();
        assert_eq!(tx.value, 0.0);
        assert_eq!(tx.timestamp, 0);
        assert!(!tx.is_error);
        assert!(tx.to.is_empty());
    }

    #[test]
    fn test_roundtrip() {
        let tx = Transaction::new("0xdead", "0xaaa", "0xbbb")
            .with_value(2.0)
            .with_timestamp(1700000000);
        let json = serde_json::to_string(&tx).unwrap();
        let back: Transaction = serde_json::from_str(&json).unwrap();
        assert_eq!(back.hash, tx.hash);
        assert_eq!(back.value, tx.value);
    }
}
