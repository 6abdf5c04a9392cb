//! Error types for the chat relay
//!
//! Defines application-level errors and message send errors.
//! Uses thiserror for ergonomic error definitions.

use thiserror::Error;

/// Application-level errors
///
/// Covers both fatal errors (connection termination) and
/// routing errors (reported back to the originating connection).
#[derive(Debug, Error)]
pub enum AppError {
    /// WebSocket protocol error (fatal)
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// JSON serialization/deserialization error
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// Channel send error (fatal - internal channel broken)
    #[error("Channel send error")]
    ChannelSend,

    /// Room is not part of the configured room set
    #[error("Room not found: {0}")]
    RoomNotFound(String),

    /// Join without a display name
    #[error("Username required")]
    UsernameRequired,

    /// Event received before the connection joined
    #[error("Connection has not joined")]
    Unauthenticated,

    /// Private message to a user with no active connection
    #[error("Recipient unavailable: {0}")]
    RecipientUnavailable(String),

    /// Username already bound to another connection.
    ///
    /// Advisory only: registration is last-write-wins.
    #[error("Username already in use: {0}")]
    DuplicateUsername(String),

    /// Message text is empty after trimming
    #[error("Empty message")]
    EmptyMessage,
}

/// Message send errors
///
/// Occurs when attempting to send messages through closed channels.
#[derive(Debug, Error)]
pub enum SendError {
    /// The receiving end of the channel has been closed
    #[error("Channel closed")]
    ChannelClosed,
}
