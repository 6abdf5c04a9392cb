//! Message protocol definitions
//!
//! JSON-based bidirectional event protocol. Every frame is an object
//! `{"event": <name>, "data": <payload>}`, using Serde's adjacently
//! tagged enums for type-safe serialization/deserialization.

use serde::{Deserialize, Serialize};

use crate::chat::{PrivateMessage, RoomMessage};
use crate::error::AppError;
use crate::types::RoomName;

/// Client → Server event
#[derive(Debug, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ClientMessage {
    /// Establish a session in a room (or switch to another room)
    #[serde(rename = "join")]
    Join { username: String, room: String },
    /// Post to a room; defaults to the session's room
    #[serde(rename = "sendMessage")]
    SendMessage {
        message: String,
        #[serde(default)]
        room: Option<String>,
    },
    /// Direct message to another user
    #[serde(rename = "privateMessage")]
    PrivateMessage { to: String, message: String },
    /// Typing indicator; defaults to the session's room
    #[serde(rename = "typing")]
    Typing {
        #[serde(default)]
        room: Option<String>,
        typing: bool,
    },
}

/// Server → Client event
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", content = "data")]
pub enum ServerMessage {
    /// Handshake complete; lists the joinable rooms
    #[serde(rename = "connected")]
    Connected {
        connection_id: String,
        rooms: Vec<RoomName>,
    },
    /// Full room history, unicast on join
    #[serde(rename = "room_history")]
    RoomHistory {
        room: RoomName,
        messages: Vec<RoomMessage>,
    },
    /// Room message or system announcement
    #[serde(rename = "message")]
    Message(RoomMessage),
    /// Direct message delivered to the recipient
    #[serde(rename = "privateMessage")]
    PrivateMessage(PrivateMessage),
    /// Echo of a delivered direct message to its sender
    #[serde(rename = "privateMessageSent")]
    PrivateMessageSent(PrivateMessage),
    /// Another member started or stopped typing
    #[serde(rename = "userTyping")]
    UserTyping {
        room: RoomName,
        user: String,
        typing: bool,
    },
    /// Error occurred
    #[serde(rename = "error")]
    Error { code: ErrorCode, message: String },
}

/// Error codes for ServerMessage::Error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Join with an empty display name
    UsernameRequired,
    /// Room is not one of the configured rooms
    RoomNotFound,
    /// Event sent before joining
    Unauthenticated,
    /// Direct message recipient is not connected
    RecipientUnavailable,
    /// Username taken by another connection
    DuplicateUsername,
    /// Message text was blank
    EmptyMessage,
    /// Invalid message format
    InvalidMessage,
}

/// Convert AppError to ServerMessage for client notification
impl From<AppError> for ServerMessage {
    fn from(err: AppError) -> Self {
        let (code, message) = match &err {
            AppError::UsernameRequired => {
                (ErrorCode::UsernameRequired, "Username is required".to_string())
            }
            AppError::RoomNotFound(room) => {
                (ErrorCode::RoomNotFound, format!("Room '{}' not found", room))
            }
            AppError::Unauthenticated => {
                (ErrorCode::Unauthenticated, "Join a room first".to_string())
            }
            AppError::RecipientUnavailable(to) => {
                (ErrorCode::RecipientUnavailable, format!("User '{}' is not connected", to))
            }
            AppError::DuplicateUsername(name) => {
                (ErrorCode::DuplicateUsername, format!("Username '{}' is already in use", name))
            }
            AppError::EmptyMessage => {
                (ErrorCode::EmptyMessage, "Message is empty".to_string())
            }
            AppError::Json(e) => {
                (ErrorCode::InvalidMessage, format!("Invalid message format: {}", e))
            }
            // Fatal errors are not typically converted (connection closes)
            _ => (ErrorCode::InvalidMessage, "Internal error".to_string()),
        };
        ServerMessage::Error { code, message }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_deserialize() {
        let json = r#"{"event": "join", "data": {"username": "alice", "room": "general"}}"#;
        let msg: ClientMessage = serde_json::from_str(json).unwrap();
        match msg {
            ClientMessage::Join { username, room } => {
                assert_eq!(username, "alice");
                assert_eq!(room, "general");
            }
            _ => panic!("Wrong variant"),
        }
    }

    #[test]
    fn test_send_message_room_is_optional() {
        let json = r#"{"event": "sendMessage", "data": {"message": "hi"}}"#;
        let msg: ClientMessage = serde_json::from_str(json).unwrap();
        match msg {
            ClientMessage::SendMessage { message, room } => {
                assert_eq!(message, "hi");
                assert!(room.is_none());
            }
            _ => panic!("Wrong variant"),
        }
    }

    #[test]
    fn test_typing_deserialize() {
        let json = r#"{"event": "typing", "data": {"room": "tech", "typing": false}}"#;
        let msg: ClientMessage = serde_json::from_str(json).unwrap();
        match msg {
            ClientMessage::Typing { room, typing } => {
                assert_eq!(room.as_deref(), Some("tech"));
                assert!(!typing);
            }
            _ => panic!("Wrong variant"),
        }
    }

    #[test]
    fn test_unknown_event_rejected() {
        let json = r#"{"event": "leaveRoom", "data": {}}"#;
        assert!(serde_json::from_str::<ClientMessage>(json).is_err());
    }

    #[test]
    fn test_server_message_event_names() {
        let msg = ServerMessage::UserTyping {
            room: "general".into(),
            user: "alice".to_string(),
            typing: true,
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["event"], "userTyping");
        assert_eq!(json["data"]["user"], "alice");
        assert_eq!(json["data"]["typing"], true);

        let msg = ServerMessage::RoomHistory {
            room: "general".into(),
            messages: Vec::new(),
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["event"], "room_history");
        assert!(json["data"]["messages"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_error_code_serialize() {
        let msg: ServerMessage = AppError::RecipientUnavailable("carol".to_string()).into();
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("\"event\":\"error\""));
        assert!(json.contains("\"code\":\"recipient_unavailable\""));
    }
}
