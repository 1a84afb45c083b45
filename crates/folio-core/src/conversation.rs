//! The conversation controller.
//!
//! Owns the message log, the request phase, the panel flag and the input
//! buffer. A submission is split in two so a UI can keep running while the
//! agent answers: [`ConversationController::begin_submit`] records the user's
//! message and enters `Pending`; [`ConversationController::settle`] records
//! the reply (or the error placeholder) and returns to `Idle`.
//! [`ConversationController::submit_message`] does both around an awaited
//! gateway call.

use tracing::{debug, warn};

use crate::agent::{AgentGateway, ContextEntry};
use crate::effect::{Effect, FOCUS_DELAY};
use crate::error::GatewayError;
use crate::input::InputBuffer;
use crate::session::SessionMetadata;
use crate::state::{ConversationState, MessageId, Role};

/// Shown in place of a reply when the round trip itself failed.
pub const ERROR_REPLY: &str =
    "Sorry, I encountered an error processing your request. Please try again.";

/// A user message that has been recorded and now needs an agent reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingQuery {
    /// Id of the user message awaiting a reply.
    pub request: MessageId,
    /// The trimmed question.
    pub text: String,
    /// Earlier turns, excluding the greeting and this question.
    pub context: Vec<ContextEntry>,
}

pub struct ConversationController {
    state: ConversationState,
    input: InputBuffer,
    session: SessionMetadata,
    effects: Vec<Effect>,
}

impl ConversationController {
    pub fn new(greeting: impl Into<String>, session: SessionMetadata) -> Self {
        Self {
            state: ConversationState::new(greeting),
            input: InputBuffer::default(),
            session,
            effects: vec![Effect::ScrollToEnd],
        }
    }

    pub fn state(&self) -> &ConversationState {
        &self.state
    }

    pub fn session(&self) -> &SessionMetadata {
        &self.session
    }

    pub fn input(&self) -> &InputBuffer {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut InputBuffer {
        &mut self.input
    }

    pub fn is_awaiting_response(&self) -> bool {
        self.state.is_awaiting_response()
    }

    /// Suggested prompts are offered only before the first exchange.
    pub fn show_suggestions(&self) -> bool {
        self.state.is_seed_only() && !self.state.is_awaiting_response()
    }

    /// Whether submitting the input buffer right now would do anything.
    pub fn can_send(&self) -> bool {
        !self.state.is_awaiting_response() && !self.input.is_blank()
    }

    /// Record `text` as a user message and enter `Pending`.
    ///
    /// Returns `None`, changing nothing, when the trimmed text is empty or a
    /// request is already in flight.
    pub fn begin_submit(&mut self, text: &str) -> Option<PendingQuery> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        let request = self.state.next_message_id();
        let next = match self.state.phase().submit(request) {
            Ok(next) => next,
            Err(e) => {
                debug!(error = %e, "ignoring submission");
                return None;
            }
        };

        let context = self
            .state
            .messages()
            .iter()
            .skip(1)
            .map(|m| ContextEntry {
                kind: m.role(),
                content: m.content().to_string(),
            })
            .collect();

        self.input.clear();
        let id = self.state.push(Role::User, text);
        debug_assert_eq!(id, request);
        self.state.set_phase(next);
        self.effects.push(Effect::ScrollToEnd);

        debug!(request = %request, "submitted user message");
        Some(PendingQuery {
            request,
            text: text.to_string(),
            context,
        })
    }

    /// Submit whatever is in the input buffer.
    pub fn begin_submit_input(&mut self) -> Option<PendingQuery> {
        let text = self.input.text().to_string();
        self.begin_submit(&text)
    }

    /// Record the outcome of the in-flight request and return to `Idle`.
    ///
    /// Always appends exactly one agent message when a request is pending.
    /// Returns the id of that message, or `None` if nothing was pending.
    pub fn settle(&mut self, result: Result<String, GatewayError>) -> Option<MessageId> {
        let next = match self.state.phase().settle() {
            Ok(next) => next,
            Err(e) => {
                warn!(error = %e, "dropping agent reply with no pending request");
                return None;
            }
        };

        let content = match result {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, "agent request failed");
                ERROR_REPLY.to_string()
            }
        };

        let id = self.state.push(Role::Agent, content);
        self.state.set_phase(next);
        self.effects.push(Effect::ScrollToEnd);
        debug!(reply = %id, "agent reply recorded");
        Some(id)
    }

    /// Run a full round trip for `text`: record it, ask `gateway`, record the
    /// reply. Returns `false` if the submission was ignored.
    pub async fn submit_message<G>(&mut self, gateway: &G, text: &str) -> bool
    where
        G: AgentGateway + ?Sized,
    {
        let Some(query) = self.begin_submit(text) else {
            return false;
        };
        let result = gateway.query_agent(&query, &self.session).await;
        self.settle(result);
        true
    }

    /// [`Self::submit_message`] for the input buffer.
    pub async fn submit_input<G>(&mut self, gateway: &G) -> bool
    where
        G: AgentGateway + ?Sized,
    {
        let text = self.input.text().to_string();
        self.submit_message(gateway, &text).await
    }

    pub fn open_panel(&mut self) {
        if !self.state.is_panel_open() {
            self.state.set_panel_open(true);
            self.effects.push(Effect::FocusInput { after: FOCUS_DELAY });
        }
    }

    pub fn close_panel(&mut self) {
        self.state.set_panel_open(false);
    }

    pub fn toggle_panel(&mut self) {
        if self.state.is_panel_open() {
            self.close_panel();
        } else {
            self.open_panel();
        }
    }

    /// Drain queued UI effects, oldest first.
    pub fn take_effects(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.effects)
    }
}
