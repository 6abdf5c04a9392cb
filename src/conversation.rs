//! Private conversation store
//!
//! Direct-message histories keyed by an unordered pair of usernames.

use std::collections::HashMap;

use crate::chat::PrivateMessage;

/// Canonical key for the conversation between two users
///
/// The pair is sorted, so `(a, b)` and `(b, a)` resolve to the same key.
pub fn conversation_key(user_a: &str, user_b: &str) -> String {
    if user_a <= user_b {
        format!("{}_{}", user_a, user_b)
    } else {
        format!("{}_{}", user_b, user_a)
    }
}

/// Append-only direct-message histories
#[derive(Debug, Default)]
pub struct ConversationStore {
    conversations: HashMap<String, Vec<PrivateMessage>>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a new message from `from` to `to`, returning the stored copy
    ///
    /// The conversation is created on its first message.
    pub fn append_message(&mut self, from: &str, to: &str, text: String) -> PrivateMessage {
        let message = PrivateMessage::new(from.to_string(), to.to_string(), text);
        self.conversations
            .entry(conversation_key(from, to))
            .or_default()
            .push(message.clone());
        message
    }

    /// History between two users, oldest first
    pub fn history(&self, user_a: &str, user_b: &str) -> &[PrivateMessage] {
        self.conversations
            .get(&conversation_key(user_a, user_b))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Number of conversations with at least one message
    pub fn len(&self) -> usize {
        self.conversations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conversations.is_empty()
    }
}
