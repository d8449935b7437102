//! Wire shapes for the chat channel.

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Envelope discriminator on every relay reply.
pub const RESPONSE_KIND: &str = "ai_response";

/// Round-trip status marker. There are no partial or streaming statuses.
pub const STATUS_COMPLETE: &str = "complete";

/// One client message on the chat channel.
///
/// Unknown fields are ignored; an absent `data` field reads as empty text.
#[derive(Debug, Deserialize)]
pub struct InboundMessage {
    /// Free-text user query.
    #[serde(default)]
    pub data: String,
}

/// One relay reply for a finished message round trip.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutboundMessage {
    /// Always [`RESPONSE_KIND`].
    #[serde(rename = "type")]
    pub kind: String,
    /// RFC 3339 send time.
    pub timestamp: String,
    /// Echo of the originating user text.
    pub query: String,
    /// Generated reply, or an error-description string when the completion
    /// backend failed.
    pub data: String,
    /// Always [`STATUS_COMPLETE`].
    pub status: String,
}

impl OutboundMessage {
    /// Build the envelope for a finished round trip, stamped with the
    /// current time.
    #[must_use]
    pub fn complete(query: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            kind: RESPONSE_KIND.to_string(),
            timestamp: Utc::now().to_rfc3339(),
            query: query.into(),
            data: data.into(),
            status: STATUS_COMPLETE.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inbound_ignores_unknown_fields() {
        let inbound: InboundMessage =
            serde_json::from_str(r#"{"data":"hello","client_ts":12345,"extra":true}"#).unwrap();
        assert_eq!(inbound.data, "hello");
    }

    #[test]
    fn test_inbound_missing_data_reads_empty() {
        let inbound: InboundMessage = serde_json::from_str("{}").unwrap();
        assert_eq!(inbound.data, "");
    }

    #[test]
    fn test_inbound_rejects_wrong_shape() {
        assert!(serde_json::from_str::<InboundMessage>("not json").is_err());
        assert!(serde_json::from_str::<InboundMessage>(r#"["data"]"#).is_err());
        assert!(serde_json::from_str::<InboundMessage>(r#"{"data":5}"#).is_err());
    }

    #[test]
    fn test_outbound_envelope_shape() {
        let envelope = OutboundMessage::complete("What is my name?", "You are Ada.");
        let value = serde_json::to_value(&envelope).unwrap();

        assert_eq!(value["type"], "ai_response");
        assert_eq!(value["status"], "complete");
        assert_eq!(value["query"], "What is my name?");
        assert_eq!(value["data"], "You are Ada.");
        assert!(
            chrono::DateTime::parse_from_rfc3339(value["timestamp"].as_str().unwrap()).is_ok()
        );
    }
}
