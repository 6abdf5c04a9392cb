//! Stored chat records
//!
//! Room and private messages are immutable once created. Ids and
//! timestamps are assigned by the server.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::types::{MessageId, RoomName};

/// Author name used for join/leave announcements
pub const SYSTEM_USER: &str = "System";

/// A message posted to a room
///
/// System announcements carry no id and are never stored in history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoomMessage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<MessageId>,
    pub user: String,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    pub room: RoomName,
}

impl RoomMessage {
    /// Create a user message with a fresh id and the current time
    pub fn new(room: RoomName, user: String, text: String) -> Self {
        Self {
            id: Some(MessageId::room()),
            user,
            text,
            timestamp: Utc::now(),
            room,
        }
    }

    /// Create a system announcement for a room
    pub fn system(room: RoomName, text: String) -> Self {
        Self {
            id: None,
            user: SYSTEM_USER.to_string(),
            text,
            timestamp: Utc::now(),
            room,
        }
    }
}

/// A direct message between two users
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrivateMessage {
    pub id: MessageId,
    pub from: String,
    pub to: String,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl PrivateMessage {
    pub fn new(from: String, to: String, text: String) -> Self {
        Self {
            id: MessageId::private(),
            from,
            to,
            text,
            timestamp: Utc::now(),
        }
    }
}
