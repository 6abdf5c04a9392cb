//! WebSocket Chat Relay Library
//!
//! A real-time chat relay built with tokio-tungstenite using the Actor
//! pattern for state management.
//!
//! # Features
//! - Fixed set of named rooms with process-lifetime history
//! - Room broadcast and direct (private) messages
//! - Typing indicators (ephemeral, never stored)
//! - Guaranteed cleanup on disconnect
//!
//! # Architecture
//! Uses the Actor pattern with `mpsc` channels:
//! - `ChatServer` is the central actor routing every event; it owns the
//!   session registry, room store, conversation store and typing state
//! - Each connection has a `handler` task communicating with the server
//! - No locks needed - all state access goes through message passing
//!
//! # Example
//! ```ignore
//! use tokio::net::TcpListener;
//! use chat_relay::{serve, Config};
//!
//! #[tokio::main]
//! async fn main() -> std::io::Result<()> {
//!     let config = Config::from_env();
//!     let listener = TcpListener::bind(&config.addr).await?;
//!     serve(listener, config).await
//! }
//! ```

use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tracing::{error, info};

pub mod chat;
pub mod client;
pub mod config;
pub mod conversation;
pub mod error;
pub mod handler;
pub mod message;
pub mod registry;
pub mod room;
pub mod server;
pub mod typing;
pub mod types;

// Re-export main types for convenience
pub use chat::{PrivateMessage, RoomMessage};
pub use client::Client;
pub use config::{Config, ErrorPolicy};
pub use conversation::{conversation_key, ConversationStore};
pub use error::{AppError, SendError};
pub use handler::handle_connection;
pub use message::{ClientMessage, ErrorCode, ServerMessage};
pub use registry::{Session, SessionRegistry};
pub use room::{Room, RoomStore};
pub use server::{ChatServer, ServerCommand};
pub use typing::{TypingBroadcaster, TYPING_EXPIRY, TYPING_IDLE};
pub use types::{ConnectionId, MessageId, RoomName};

/// Channel buffer size for server commands
pub const CHANNEL_BUFFER_SIZE: usize = 256;

/// Start the ChatServer actor and accept connections forever
pub async fn serve(listener: TcpListener, config: Config) -> std::io::Result<()> {
    let (cmd_tx, cmd_rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);
    tokio::spawn(ChatServer::new(cmd_rx, &config).run());

    info!("Chat relay listening on {}", listener.local_addr()?);

    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                info!("New connection from {}", addr);
                let cmd_tx = cmd_tx.clone();

                // Spawn handler task for each connection
                tokio::spawn(async move {
                    if let Err(e) = handle_connection(stream, cmd_tx).await {
                        error!("Connection handler error: {}", e);
                    }
                });
            }
            Err(e) => {
                error!("Failed to accept connection: {}", e);
            }
        }
    }
}
