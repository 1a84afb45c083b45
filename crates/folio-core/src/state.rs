//! UI-agnostic conversation state
//!
//! This module contains the data a chat front-end renders: the ordered
//! message log, the request phase and whether the chat panel is open. It does
//! not depend on any specific UI framework.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::phase::Phase;

/// Identifier of a message, derived from submission order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MessageId(pub u64);

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Who authored a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Agent,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Agent => "agent",
        }
    }
}

/// One displayed unit of conversation. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    id: MessageId,
    role: Role,
    content: String,
    created_at: DateTime<Local>,
}

impl Message {
    fn new(id: MessageId, role: Role, content: impl Into<String>) -> Self {
        Self {
            id,
            role,
            content: content.into(),
            created_at: Local::now(),
        }
    }

    pub fn id(&self) -> MessageId {
        self.id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Local wall-clock time as `HH:MM`, the way bubbles are stamped.
    pub fn time_label(&self) -> String {
        self.created_at.format("%H:%M").to_string()
    }
}

/// Everything the presentation layer needs to draw the chat widget.
///
/// The log is append-only and lives only as long as the value; nothing is
/// persisted.
#[derive(Debug, Clone)]
pub struct ConversationState {
    messages: Vec<Message>,
    phase: Phase,
    panel_open: bool,
    next_id: u64,
}

impl ConversationState {
    /// Create a conversation seeded with the agent's greeting.
    pub fn new(greeting: impl Into<String>) -> Self {
        let mut state = Self {
            messages: Vec::new(),
            phase: Phase::Idle,
            panel_open: false,
            next_id: 0,
        };
        state.push(Role::Agent, greeting);
        state
    }

    /// Messages oldest first, i.e. display order.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn is_awaiting_response(&self) -> bool {
        self.phase.is_pending()
    }

    pub fn is_panel_open(&self) -> bool {
        self.panel_open
    }

    /// True while the greeting is the only message.
    pub fn is_seed_only(&self) -> bool {
        self.messages.len() == 1
    }

    /// The id the next appended message will receive.
    pub fn next_message_id(&self) -> MessageId {
        MessageId(self.next_id)
    }

    pub(crate) fn push(&mut self, role: Role, content: impl Into<String>) -> MessageId {
        let id = MessageId(self.next_id);
        self.next_id += 1;
        self.messages.push(Message::new(id, role, content));
        id
    }

    pub(crate) fn set_phase(&mut self, phase: Phase) {
        self.phase = phase;
    }

    pub(crate) fn set_panel_open(&mut self, open: bool) {
        self.panel_open = open;
    }
}
