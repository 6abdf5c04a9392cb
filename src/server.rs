//! ChatServer Actor implementation
//!
//! The central actor that routes every connection event. It owns the
//! session registry, the room store, the private conversation store and
//! the typing broadcaster, so all state is mutated from a single task.

use std::collections::HashMap;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::chat::RoomMessage;
use crate::client::Client;
use crate::config::{Config, ErrorPolicy};
use crate::conversation::ConversationStore;
use crate::error::AppError;
use crate::message::ServerMessage;
use crate::registry::{Session, SessionRegistry};
use crate::room::RoomStore;
use crate::typing::TypingBroadcaster;
use crate::types::{ConnectionId, RoomName};

/// Commands sent from handlers to the ChatServer actor
#[derive(Debug)]
pub enum ServerCommand {
    /// New connection registered by the transport
    Connect {
        connection_id: ConnectionId,
        sender: mpsc::UnboundedSender<ServerMessage>,
    },
    /// Connection closed (gracefully or not)
    Disconnect { connection_id: ConnectionId },
    /// Join a room under a display name
    Join {
        connection_id: ConnectionId,
        username: String,
        room: String,
    },
    /// Post to a room
    SendMessage {
        connection_id: ConnectionId,
        text: String,
        room: Option<String>,
    },
    /// Direct message another user
    PrivateMessage {
        connection_id: ConnectionId,
        to: String,
        text: String,
    },
    /// Typing indicator update
    Typing {
        connection_id: ConnectionId,
        room: Option<String>,
        typing: bool,
    },
    /// Frame that could not be decoded
    Invalid {
        connection_id: ConnectionId,
        error: serde_json::Error,
    },
}

/// The main ChatServer actor (message router)
pub struct ChatServer {
    /// All live connections: ConnectionId -> Client
    clients: HashMap<ConnectionId, Client>,
    /// Joined sessions and username routes
    registry: SessionRegistry,
    /// Fixed rooms with members and history
    rooms: RoomStore,
    /// Direct-message histories
    conversations: ConversationStore,
    /// Active typing flags
    typing: TypingBroadcaster,
    /// Reply to rejected events or drop them silently
    error_policy: ErrorPolicy,
    /// Command receiver channel
    receiver: mpsc::Receiver<ServerCommand>,
}

impl ChatServer {
    /// Create a new ChatServer with the given command receiver
    pub fn new(receiver: mpsc::Receiver<ServerCommand>, config: &Config) -> Self {
        Self {
            clients: HashMap::new(),
            registry: SessionRegistry::new(),
            rooms: RoomStore::new(config.rooms.iter().cloned()),
            conversations: ConversationStore::new(),
            typing: TypingBroadcaster::new(),
            error_policy: config.error_policy,
            receiver,
        }
    }

    /// Run the ChatServer event loop
    ///
    /// Continuously receives and processes commands until all senders are dropped.
    pub async fn run(mut self) {
        info!("ChatServer started with rooms {:?}", self.rooms.names());

        while let Some(cmd) = self.receiver.recv().await {
            self.handle_command(cmd);
        }

        info!("ChatServer shutting down");
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    pub fn rooms(&self) -> &RoomStore {
        &self.rooms
    }

    pub fn conversations(&self) -> &ConversationStore {
        &self.conversations
    }

    /// Process a single command
    pub fn handle_command(&mut self, cmd: ServerCommand) {
        let (connection_id, result) = match cmd {
            ServerCommand::Connect {
                connection_id,
                sender,
            } => {
                self.handle_connect(connection_id, sender);
                return;
            }
            ServerCommand::Disconnect { connection_id } => {
                self.handle_disconnect(connection_id);
                return;
            }
            ServerCommand::Join {
                connection_id,
                username,
                room,
            } => (connection_id, self.handle_join(connection_id, username, room)),
            ServerCommand::SendMessage {
                connection_id,
                text,
                room,
            } => (connection_id, self.handle_send_message(connection_id, text, room)),
            ServerCommand::PrivateMessage {
                connection_id,
                to,
                text,
            } => (connection_id, self.handle_private_message(connection_id, to, text)),
            ServerCommand::Typing {
                connection_id,
                room,
                typing,
            } => (connection_id, self.handle_typing(connection_id, room, typing)),
            ServerCommand::Invalid {
                connection_id,
                error,
            } => (connection_id, Err(AppError::Json(error))),
        };

        if let Err(err) = result {
            self.reject(connection_id, err);
        }
    }

    /// Handle new connection
    fn handle_connect(
        &mut self,
        connection_id: ConnectionId,
        sender: mpsc::UnboundedSender<ServerMessage>,
    ) {
        let client = Client::new(connection_id, sender);
        let _ = client.send(ServerMessage::Connected {
            connection_id: connection_id.to_string(),
            rooms: self.rooms.names().to_vec(),
        });
        self.clients.insert(connection_id, client);

        debug!(
            "Total connections: {}, Total sessions: {}",
            self.clients.len(),
            self.registry.len()
        );
    }

    /// Handle connection teardown
    ///
    /// Always runs to completion so no membership or route outlives the
    /// connection.
    fn handle_disconnect(&mut self, connection_id: ConnectionId) {
        if let Some(client) = self.clients.remove(&connection_id) {
            debug!(
                "Connection {} closed after {:?}",
                connection_id,
                client.connected_at.elapsed()
            );
        }

        if let Some(session) = self.registry.unregister(connection_id) {
            self.clear_typing(&session);
            self.rooms.leave(&session.room, connection_id);

            info!("{} left {}", session.username, session.room);
            let notice = RoomMessage::system(
                session.room.clone(),
                format!("{} has left the chat.", session.username),
            );
            self.broadcast(&session.room, ServerMessage::Message(notice), None);
        }

        debug!(
            "Total connections: {}, Total sessions: {}",
            self.clients.len(),
            self.registry.len()
        );
    }

    /// Handle join (or switch to another room)
    fn handle_join(
        &mut self,
        connection_id: ConnectionId,
        username: String,
        room: String,
    ) -> Result<(), AppError> {
        let username = username.trim().to_string();
        if username.is_empty() {
            return Err(AppError::UsernameRequired);
        }

        let room = RoomName::new(room);
        if !self.rooms.contains(&room) {
            return Err(AppError::RoomNotFound(room.to_string()));
        }

        // Keep at most one room per connection
        if let Some(previous) = self.registry.lookup_by_connection(connection_id).cloned() {
            self.clear_typing(&previous);
            if previous.room != room {
                self.rooms.leave(&previous.room, connection_id);
                debug!("{} switched from {} to {}", previous.username, previous.room, room);
            }
        }

        if let Some(displaced) = self
            .registry
            .register(connection_id, username.clone(), room.clone())
        {
            warn!(
                "Username '{}' taken over by {} (was {})",
                username, connection_id, displaced
            );
        }
        self.rooms.join(&room, connection_id)?;

        info!("{} ({}) joined {}", username, connection_id, room);
        if let Some(joined) = self.rooms.get(&room) {
            debug!("{} now has {} members", room, joined.member_count());
        }

        let messages = self.rooms.history(&room)?.to_vec();
        self.unicast(
            connection_id,
            ServerMessage::RoomHistory {
                room: room.clone(),
                messages,
            },
        );

        let notice = RoomMessage::system(room.clone(), format!("{} joined {}", username, room));
        self.broadcast(&room, ServerMessage::Message(notice), None);

        Ok(())
    }

    /// Handle room message
    fn handle_send_message(
        &mut self,
        connection_id: ConnectionId,
        text: String,
        room: Option<String>,
    ) -> Result<(), AppError> {
        let session = self.session(connection_id)?;
        if text.trim().is_empty() {
            return Err(AppError::EmptyMessage);
        }

        let room = room.map(RoomName::new).unwrap_or_else(|| session.room.clone());
        let message = self
            .rooms
            .append_message(&room, session.username.clone(), text)?;

        // Posting ends any pending indicator
        self.clear_typing(&session);

        debug!("{} posted to {}", session.username, room);
        self.broadcast(&room, ServerMessage::Message(message), None);

        Ok(())
    }

    /// Handle direct message
    ///
    /// The message is stored even if the recipient is offline, but the
    /// sender only gets the `privateMessageSent` echo on live delivery.
    fn handle_private_message(
        &mut self,
        connection_id: ConnectionId,
        to: String,
        text: String,
    ) -> Result<(), AppError> {
        let session = self.session(connection_id)?;
        let to = to.trim().to_string();
        if to.is_empty() {
            return Err(AppError::UsernameRequired);
        }
        if text.trim().is_empty() {
            return Err(AppError::EmptyMessage);
        }

        let message = self
            .conversations
            .append_message(&session.username, &to, text);

        let delivered = self
            .registry
            .lookup_by_username(&to)
            .and_then(|id| self.clients.get(&id))
            .is_some_and(|recipient| {
                recipient
                    .send(ServerMessage::PrivateMessage(message.clone()))
                    .is_ok()
            });

        if !delivered {
            return Err(AppError::RecipientUnavailable(to));
        }

        debug!("{} -> {}: {}", session.username, to, message.id);
        self.unicast(connection_id, ServerMessage::PrivateMessageSent(message));
        Ok(())
    }

    /// Handle typing indicator
    fn handle_typing(
        &mut self,
        connection_id: ConnectionId,
        room: Option<String>,
        typing: bool,
    ) -> Result<(), AppError> {
        let session = self.session(connection_id)?;

        let room = room.map(RoomName::new).unwrap_or_else(|| session.room.clone());
        if !self.rooms.contains(&room) {
            return Err(AppError::RoomNotFound(room.to_string()));
        }

        // Nothing to retract
        if !typing && !self.typing.is_typing(connection_id) {
            return Ok(());
        }

        let event = self
            .typing
            .signal(connection_id, room.clone(), &session.username, typing);
        self.broadcast(&room, event, Some(connection_id));

        Ok(())
    }

    /// Helper: Look up the joined session or fail as unauthenticated
    fn session(&self, connection_id: ConnectionId) -> Result<Session, AppError> {
        self.registry
            .lookup_by_connection(connection_id)
            .cloned()
            .ok_or(AppError::Unauthenticated)
    }

    /// Helper: Tell the room a user stopped typing, if they were
    fn clear_typing(&mut self, session: &Session) {
        if let Some((room, event)) = self.typing.clear(session.connection_id, &session.username) {
            self.broadcast(&room, event, Some(session.connection_id));
        }
    }

    /// Helper: Report a rejected event according to the error policy
    fn reject(&self, connection_id: ConnectionId, err: AppError) {
        warn!("Rejected event from {}: {}", connection_id, err);
        if self.error_policy == ErrorPolicy::Reply {
            self.unicast(connection_id, err.into());
        }
    }

    /// Helper: Deliver to exactly one connection
    fn unicast(&self, connection_id: ConnectionId, msg: ServerMessage) {
        if let Some(client) = self.clients.get(&connection_id) {
            if client.send(msg).is_err() {
                debug!("Dropped message for closed connection {}", connection_id);
            }
        }
    }

    /// Helper: Deliver to a room
    fn broadcast(
        &self,
        room: &RoomName,
        msg: ServerMessage,
        exclude: Option<ConnectionId>,
    ) -> usize {
        self.rooms.broadcast(room, &msg, exclude, &self.clients)
    }
}
