//! Message log for the open conversation.
//!
//! DESIGN
//! ======
//! Messages arrive from two places: the initial `select`, and realtime
//! INSERT events (which also echo the user's own sends). The log keys on
//! message id, so whichever copy lands second is dropped.

#[cfg(test)]
#[path = "chat_test.rs"]
mod chat_test;

use std::collections::HashSet;

use backend::realtime::{ChangeKind, RowChange};
use backend::rows::ChatMessage;

/// Realtime connection state shown in the chat header.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ChannelStatus {
    #[default]
    Connecting,
    Live,
    Offline,
}

impl ChannelStatus {
    pub fn label(self) -> &'static str {
        match self {
            Self::Connecting => "Connecting…",
            Self::Live => "Live",
            Self::Offline => "Reconnecting…",
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct ChatLog {
    conversation_id: String,
    messages: Vec<ChatMessage>,
    seen: HashSet<String>,
}

impl ChatLog {
    pub fn new(conversation_id: impl Into<String>) -> Self {
        Self { conversation_id: conversation_id.into(), ..Self::default() }
    }

    pub fn conversation_id(&self) -> &str {
        &self.conversation_id
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Replace the log with a fresh load, keeping realtime arrivals the load
    /// did not include.
    pub fn load(&mut self, loaded: Vec<ChatMessage>) {
        let extra: Vec<ChatMessage> = std::mem::take(&mut self.messages);
        self.seen.clear();
        for message in loaded.into_iter().chain(extra) {
            self.push(message);
        }
    }

    /// Append unless already present or for another conversation.
    pub fn push(&mut self, message: ChatMessage) -> bool {
        if message.conversation_id != self.conversation_id || !self.seen.insert(message.id.clone()) {
            return false;
        }
        self.messages.push(message);
        true
    }

    /// Apply a realtime change. Only inserts are shown.
    pub fn apply(&mut self, change: &RowChange) -> bool {
        if change.kind != ChangeKind::Insert {
            return false;
        }
        match change.decode::<ChatMessage>() {
            Ok(message) => self.push(message),
            Err(_) => false,
        }
    }
}
