//! Room and room store definitions
//!
//! Rooms are pre-declared at startup; each keeps its member set and an
//! append-only message history for the lifetime of the process.

use std::collections::{HashMap, HashSet};

use tracing::trace;

use crate::chat::RoomMessage;
use crate::client::Client;
use crate::error::AppError;
use crate::message::ServerMessage;
use crate::types::{ConnectionId, RoomName};

/// Named broadcast group
#[derive(Debug)]
pub struct Room {
    /// Room name for identification
    pub name: RoomName,
    /// Connections currently joined
    pub members: HashSet<ConnectionId>,
    /// Stored messages, oldest first. Grows without bound.
    pub history: Vec<RoomMessage>,
}

impl Room {
    pub fn new(name: RoomName) -> Self {
        Self {
            name,
            members: HashSet::new(),
            history: Vec::new(),
        }
    }

    /// Check if a connection is in this room
    pub fn contains(&self, connection_id: ConnectionId) -> bool {
        self.members.contains(&connection_id)
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }
}

/// The fixed set of rooms
#[derive(Debug)]
pub struct RoomStore {
    rooms: HashMap<RoomName, Room>,
    /// Configured order, used when listing rooms
    order: Vec<RoomName>,
}

impl RoomStore {
    /// Create the store with the given room names. Duplicates are ignored.
    pub fn new<I>(names: I) -> Self
    where
        I: IntoIterator<Item = RoomName>,
    {
        let mut rooms = HashMap::new();
        let mut order = Vec::new();
        for name in names {
            if rooms.contains_key(&name) {
                continue;
            }
            order.push(name.clone());
            rooms.insert(name.clone(), Room::new(name));
        }
        Self { rooms, order }
    }

    /// Room names in configured order
    pub fn names(&self) -> &[RoomName] {
        &self.order
    }

    pub fn contains(&self, room: &RoomName) -> bool {
        self.rooms.contains_key(room)
    }

    pub fn get(&self, room: &RoomName) -> Option<&Room> {
        self.rooms.get(room)
    }

    /// Add a connection to a room
    ///
    /// Idempotent; returns false if it was already a member.
    pub fn join(
        &mut self,
        room: &RoomName,
        connection_id: ConnectionId,
    ) -> Result<bool, AppError> {
        let room = self.room_mut(room)?;
        Ok(room.members.insert(connection_id))
    }

    /// Remove a connection from a room. Unknown rooms are ignored.
    pub fn leave(&mut self, room: &RoomName, connection_id: ConnectionId) -> bool {
        self.rooms
            .get_mut(room)
            .is_some_and(|r| r.members.remove(&connection_id))
    }

    /// Append a user message, returning the stored copy
    pub fn append_message(
        &mut self,
        room: &RoomName,
        user: String,
        text: String,
    ) -> Result<RoomMessage, AppError> {
        let room = self.room_mut(room)?;
        let message = RoomMessage::new(room.name.clone(), user, text);
        room.history.push(message.clone());
        Ok(message)
    }

    /// Full history of a room, oldest first
    pub fn history(&self, room: &RoomName) -> Result<&[RoomMessage], AppError> {
        self.rooms
            .get(room)
            .map(|r| r.history.as_slice())
            .ok_or_else(|| AppError::RoomNotFound(room.to_string()))
    }

    /// Deliver `msg` to every member except `exclude`
    ///
    /// Members without a live client are skipped. Returns the number of
    /// successful deliveries.
    pub fn broadcast(
        &self,
        room: &RoomName,
        msg: &ServerMessage,
        exclude: Option<ConnectionId>,
        clients: &HashMap<ConnectionId, Client>,
    ) -> usize {
        let Some(room) = self.rooms.get(room) else {
            return 0;
        };

        let mut delivered = 0;
        for member in room.members.iter().filter(|id| Some(**id) != exclude) {
            match clients.get(member) {
                Some(client) if client.send(msg.clone()).is_ok() => delivered += 1,
                _ => trace!("Skipping departed member {} of {}", member, room.name),
            }
        }
        delivered
    }

    fn room_mut(&mut self, room: &RoomName) -> Result<&mut Room, AppError> {
        self.rooms
            .get_mut(room)
            .ok_or_else(|| AppError::RoomNotFound(room.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn store() -> RoomStore {
        RoomStore::new(["general", "random", "tech"].map(RoomName::from))
    }

    #[test]
    fn test_store_creation() {
        let store = store();
        assert_eq!(store.names().len(), 3);
        assert_eq!(store.names()[0], RoomName::from("general"));
        assert!(store.contains(&"tech".into()));
        assert!(!store.contains(&"lobby".into()));
    }

    #[test]
    fn test_join_is_idempotent() {
        let mut store = store();
        let conn = ConnectionId::new();
        let general = RoomName::from("general");

        assert!(store.join(&general, conn).unwrap());
        assert!(!store.join(&general, conn).unwrap());
        assert_eq!(store.get(&general).unwrap().member_count(), 1);
    }

    #[test]
    fn test_join_unknown_room() {
        let mut store = store();
        let result = store.join(&"lobby".into(), ConnectionId::new());
        assert!(matches!(result, Err(AppError::RoomNotFound(name)) if name == "lobby"));
    }

    #[test]
    fn test_leave() {
        let mut store = store();
        let conn = ConnectionId::new();
        let general = RoomName::from("general");
        store.join(&general, conn).unwrap();

        assert!(store.leave(&general, conn));
        assert!(!store.get(&general).unwrap().contains(conn));
        assert!(!store.leave(&general, conn));
    }

    #[test]
    fn test_append_and_history() {
        let mut store = store();
        let general = RoomName::from("general");

        let first = store
            .append_message(&general, "alice".to_string(), "hi".to_string())
            .unwrap();
        let second = store
            .append_message(&general, "bob".to_string(), "hey".to_string())
            .unwrap();

        let history = store.history(&general).unwrap();
        assert_eq!(history, &[first.clone(), second.clone()]);
        assert_ne!(first.id, second.id);
        assert!(store.history(&"random".into()).unwrap().is_empty());
    }

    #[test]
    fn test_append_unknown_room() {
        let mut store = store();
        let result = store.append_message(&"lobby".into(), "alice".to_string(), "hi".to_string());
        assert!(matches!(result, Err(AppError::RoomNotFound(_))));
        assert!(store.history(&"lobby".into()).is_err());
    }

    #[test]
    fn test_broadcast_excludes_sender() {
        let mut store = store();
        let general = RoomName::from("general");
        let mut clients = HashMap::new();
        let mut receivers = Vec::new();

        for _ in 0..3 {
            let (tx, rx) = mpsc::unbounded_channel();
            let client = Client::new(ConnectionId::new(), tx);
            store.join(&general, client.id).unwrap();
            receivers.push((client.id, rx));
            clients.insert(client.id, client);
        }

        let sender = receivers[0].0;
        let msg = ServerMessage::UserTyping {
            room: general.clone(),
            user: "alice".to_string(),
            typing: true,
        };
        assert_eq!(store.broadcast(&general, &msg, Some(sender), &clients), 2);

        assert!(receivers[0].1.try_recv().is_err());
        assert!(receivers[1].1.try_recv().is_ok());
        assert!(receivers[2].1.try_recv().is_ok());
    }

    #[test]
    fn test_broadcast_skips_departed_member() {
        let mut store = store();
        let general = RoomName::from("general");
        store.join(&general, ConnectionId::new()).unwrap();

        let msg = ServerMessage::Message(RoomMessage::system(general.clone(), "x".to_string()));
        assert_eq!(store.broadcast(&general, &msg, None, &HashMap::new()), 0);
    }
}
