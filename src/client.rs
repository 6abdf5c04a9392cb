//! Client struct definition
//!
//! Outbound side of one live connection, as seen by the router.

use std::time::Instant;

use tokio::sync::mpsc;

use crate::error::SendError;
use crate::message::ServerMessage;
use crate::types::ConnectionId;

/// Connected client handle
///
/// Delivery is fire-and-forget: the channel is unbounded, so a slow
/// reader never stalls the router (its queue grows instead).
#[derive(Debug, Clone)]
pub struct Client {
    /// Unique identifier for this connection
    pub id: ConnectionId,
    /// Server → Client message channel
    pub sender: mpsc::UnboundedSender<ServerMessage>,
    /// Time the transport registered the connection
    pub connected_at: Instant,
}

impl Client {
    /// Create a new client with the given ID and sender channel
    pub fn new(id: ConnectionId, sender: mpsc::UnboundedSender<ServerMessage>) -> Self {
        Self {
            id,
            sender,
            connected_at: Instant::now(),
        }
    }

    /// Send a message to this client
    ///
    /// Returns an error if the channel is closed (client disconnected).
    pub fn send(&self, msg: ServerMessage) -> Result<(), SendError> {
        self.sender.send(msg).map_err(|_| SendError::ChannelClosed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    #[test]
    fn test_client_send() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let client = Client::new(ConnectionId::new(), tx);

        assert!(client.send(AppError::Unauthenticated.into()).is_ok());
        assert!(matches!(rx.try_recv(), Ok(ServerMessage::Error { .. })));
    }

    #[test]
    fn test_client_send_after_close() {
        let (tx, rx) = mpsc::unbounded_channel();
        let client = Client::new(ConnectionId::new(), tx);
        drop(rx);

        assert!(matches!(
            client.send(AppError::Unauthenticated.into()),
            Err(SendError::ChannelClosed)
        ));
    }
}
