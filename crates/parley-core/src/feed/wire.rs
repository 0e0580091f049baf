//! Feed protocol frame types
//!
//! JSON envelopes exchanged with the feed server over WebSocket.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::FeedError;
use crate::models::Message;

/// Frames sent to the feed server
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientFrame {
    /// Open a live subscription to a channel
    #[serde(rename = "subscribe")]
    Subscribe { channel: String },

    /// Append one message to a channel
    #[serde(rename = "append")]
    Append { channel: String, message: Message },

    /// Delete a message from a channel
    #[serde(rename = "delete")]
    Delete {
        channel: String,
        #[serde(rename = "messageId")]
        message_id: Uuid,
    },
}

/// Acknowledgement status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum AckStatus {
    #[serde(rename = "ok")]
    Ok,
    #[serde(rename = "error")]
    Error,
}

/// Frames received from the feed server
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerFrame {
    /// Full current list for a channel, newest first; sent on every change
    #[serde(rename = "snapshot")]
    Snapshot {
        channel: String,
        messages: Vec<Message>,
    },

    /// Response to an append/delete request
    #[serde(rename = "ack")]
    Ack {
        status: AckStatus,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        detail: Option<String>,
    },

    /// Out-of-band server error
    #[serde(rename = "error")]
    Error { message: String },
}

impl ClientFrame {
    /// Encode the frame as a JSON text payload
    pub fn encode(&self) -> Result<String, FeedError> {
        serde_json::to_string(self).map_err(|e| FeedError::Protocol(e.to_string()))
    }
}

impl ServerFrame {
    /// Decode a frame from a JSON text payload
    pub fn decode(text: &str) -> Result<Self, FeedError> {
        serde_json::from_str(text).map_err(|e| FeedError::Protocol(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Author, Draft};

    #[test]
    fn test_subscribe_frame_encoding() {
        let frame = ClientFrame::Subscribe {
            channel: "messages".to_string(),
        };
        let text = frame.encode().unwrap();

        assert!(text.contains(r#""type":"subscribe""#));
        assert!(text.contains(r#""channel":"messages""#));
    }

    #[test]
    fn test_append_frame_roundtrip() {
        let message = Draft::text("hi").into_message(Author::new("u1", "Alice"));
        let frame = ClientFrame::Append {
            channel: "messages".to_string(),
            message,
        };

        let text = frame.encode().unwrap();
        let back: ClientFrame = serde_json::from_str(&text).unwrap();
        assert_eq!(back, frame);
    }

    #[test]
    fn test_delete_frame_field_names() {
        let frame = ClientFrame::Delete {
            channel: "messages".to_string(),
            message_id: Uuid::nil(),
        };
        let text = frame.encode().unwrap();

        assert!(text.contains(r#""type":"delete""#));
        assert!(text.contains(r#""messageId""#));
    }

    #[test]
    fn test_snapshot_frame_decoding() {
        let text = r#"{"type":"snapshot","channel":"messages","messages":[]}"#;
        let frame = ServerFrame::decode(text).unwrap();

        match frame {
            ServerFrame::Snapshot { channel, messages } => {
                assert_eq!(channel, "messages");
                assert!(messages.is_empty());
            }
            other => panic!("expected snapshot, got {:?}", other),
        }
    }

    #[test]
    fn test_ack_frame_decoding() {
        let ok = ServerFrame::decode(r#"{"type":"ack","status":"ok"}"#).unwrap();
        assert_eq!(
            ok,
            ServerFrame::Ack {
                status: AckStatus::Ok,
                detail: None
            }
        );

        let rejected =
            ServerFrame::decode(r#"{"type":"ack","status":"error","detail":"empty payload"}"#)
                .unwrap();
        match rejected {
            ServerFrame::Ack { status, detail } => {
                assert_eq!(status, AckStatus::Error);
                assert_eq!(detail.as_deref(), Some("empty payload"));
            }
            other => panic!("expected ack, got {:?}", other),
        }
    }

    #[test]
    fn test_malformed_frame_is_protocol_error() {
        let err = ServerFrame::decode("{not json").unwrap_err();
        assert!(matches!(err, FeedError::Protocol(_)));
    }
}
