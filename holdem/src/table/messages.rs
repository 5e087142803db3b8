//! Wire envelope and table actor message types.

use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

use super::client::{ClientHandle, ClientId};
use crate::game::entities::HandView;

/// The `type` field of a [`GameMessage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    /// Outbound per-viewer hand snapshot.
    State,
    /// Outbound rejection of the last inbound message.
    Error,
    /// Inbound player action.
    Action,
    /// Anything else a client may send.
    #[serde(other)]
    Unknown,
}

/// The JSON envelope exchanged with clients: `{"type": ..., "data": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameMessage {
    #[serde(rename = "type")]
    pub kind: MessageKind,
    pub data: String,
}

impl GameMessage {
    /// A `state` envelope carrying the JSON-encoded view.
    pub fn state(view: &HandView) -> Result<Self, serde_json::Error> {
        Ok(Self {
            kind: MessageKind::State,
            data: serde_json::to_string(view)?,
        })
    }

    pub fn error(message: impl ToString) -> Self {
        Self {
            kind: MessageKind::Error,
            data: message.to_string(),
        }
    }

    pub fn action(action: impl ToString) -> Self {
        Self {
            kind: MessageKind::Action,
            data: action.to_string(),
        }
    }
}

/// Messages that can be sent to a TableActor
#[derive(Debug)]
pub enum TableMessage {
    /// A new connection for this table. `ack` gets the client back if the
    /// table retired before seating it.
    Register {
        client: ClientHandle,
        ack: oneshot::Sender<Result<(), ClientHandle>>,
    },

    /// The connection went away.
    Unregister { client_id: ClientId },

    /// An envelope read from a client.
    Inbound {
        client_id: ClientId,
        message: GameMessage,
    },

    /// The hand as `username` sees it.
    GetView {
        username: String,
        response: oneshot::Sender<HandView>,
    },

    /// Disconnect every client and retire the table.
    Close,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_field_names() {
        let json = serde_json::to_value(GameMessage::action("call")).unwrap();
        assert_eq!(json, serde_json::json!({"type": "action", "data": "call"}));
    }

    #[test]
    fn test_decode_inbound_action() {
        let message: GameMessage =
            serde_json::from_str(r#"{"type":"action","data":"raise"}"#).unwrap();
        assert_eq!(message.kind, MessageKind::Action);
        assert_eq!(message.data, "raise");
    }

    #[test]
    fn test_decode_unknown_kind() {
        let message: GameMessage =
            serde_json::from_str(r#"{"type":"chat","data":"hello"}"#).unwrap();
        assert_eq!(message.kind, MessageKind::Unknown);
    }

    #[test]
    fn test_decode_rejects_missing_fields() {
        assert!(serde_json::from_str::<GameMessage>(r#"{"type":"action"}"#).is_err());
    }
}
