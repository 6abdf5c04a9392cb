//! Session registry
//!
//! Binds live connections to a user identity and current room, and
//! resolves usernames back to their active connection.

use std::collections::HashMap;

use crate::types::{ConnectionId, RoomName};

/// Live binding between a connection and a user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub connection_id: ConnectionId,
    pub username: String,
    pub room: RoomName,
}

/// Connection ↔ username bookkeeping
///
/// Username routing is last-write-wins: registering a name that is
/// already bound silently takes the route over from the older connection.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    /// ConnectionId -> Session
    sessions: HashMap<ConnectionId, Session>,
    /// Username -> active ConnectionId
    usernames: HashMap<String, ConnectionId>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record (or replace) the session for a connection
    ///
    /// Returns the connection that previously owned `username`, if it was
    /// a different one.
    pub fn register(
        &mut self,
        connection_id: ConnectionId,
        username: String,
        room: RoomName,
    ) -> Option<ConnectionId> {
        // A connection re-joining under a new name releases its old one
        if let Some(old) = self.sessions.get(&connection_id) {
            if old.username != username {
                let old_name = old.username.clone();
                self.release_username(&old_name, connection_id);
            }
        }

        let displaced = self
            .usernames
            .insert(username.clone(), connection_id)
            .filter(|prev| *prev != connection_id);

        self.sessions.insert(
            connection_id,
            Session {
                connection_id,
                username,
                room,
            },
        );

        displaced
    }

    pub fn lookup_by_connection(&self, connection_id: ConnectionId) -> Option<&Session> {
        self.sessions.get(&connection_id)
    }

    pub fn lookup_by_username(&self, username: &str) -> Option<ConnectionId> {
        self.usernames.get(username).copied()
    }

    /// Remove a connection's session
    ///
    /// The username route is only dropped while it still points at this
    /// connection, so a newer session under the same name survives.
    pub fn unregister(&mut self, connection_id: ConnectionId) -> Option<Session> {
        let session = self.sessions.remove(&connection_id)?;
        self.release_username(&session.username, connection_id);
        Some(session)
    }

    /// Number of live sessions
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    fn release_username(&mut self, username: &str, connection_id: ConnectionId) {
        if self.usernames.get(username) == Some(&connection_id) {
            self.usernames.remove(username);
        }
    }
}
