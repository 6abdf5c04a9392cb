//! Typing indicator propagation
//!
//! Typing signals are never stored. The broadcaster only remembers who
//! last reported `typing: true`, so a stale indicator can be cleared when
//! that user posts or disconnects. Expiry itself is left to receivers.

use std::collections::HashMap;
use std::time::Duration;

use crate::message::ServerMessage;
use crate::types::{ConnectionId, RoomName};

/// How long a receiver shows an indicator after the last `typing: true`
pub const TYPING_EXPIRY: Duration = Duration::from_secs(3);

/// Input inactivity after which a sender reports `typing: false`
pub const TYPING_IDLE: Duration = Duration::from_secs(2);

/// Tracks active typing flags per connection
#[derive(Debug, Default)]
pub struct TypingBroadcaster {
    /// ConnectionId -> room it is typing in
    active: HashMap<ConnectionId, RoomName>,
}

impl TypingBroadcaster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a typing signal and build the event for the other members
    ///
    /// Repeated `typing: true` signals are all forwarded so receivers can
    /// refresh their expiry.
    pub fn signal(
        &mut self,
        connection_id: ConnectionId,
        room: RoomName,
        user: &str,
        typing: bool,
    ) -> ServerMessage {
        if typing {
            self.active.insert(connection_id, room.clone());
        } else {
            self.active.remove(&connection_id);
        }
        Self::event(room, user, typing)
    }

    /// Drop the connection's flag
    ///
    /// Returns the `typing: false` event to broadcast if it was typing.
    pub fn clear(
        &mut self,
        connection_id: ConnectionId,
        user: &str,
    ) -> Option<(RoomName, ServerMessage)> {
        let room = self.active.remove(&connection_id)?;
        let event = Self::event(room.clone(), user, false);
        Some((room, event))
    }

    pub fn is_typing(&self, connection_id: ConnectionId) -> bool {
        self.active.contains_key(&connection_id)
    }

    fn event(room: RoomName, user: &str, typing: bool) -> ServerMessage {
        ServerMessage::UserTyping {
            room,
            user: user.to_string(),
            typing,
        }
    }
}
