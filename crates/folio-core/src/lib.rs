pub mod agent;
pub mod config;
pub mod conversation;
pub mod effect;
pub mod error;
pub mod input;
pub mod phase;
pub mod portfolio;
pub mod session;
pub mod state;

// Re-export main types for convenience
pub use agent::{AgentGateway, HttpAgentGateway, RequestStyle, ResponseField, FALLBACK_REPLY};
pub use config::{Config, Overrides, Settings};
pub use conversation::{ConversationController, PendingQuery, ERROR_REPLY};
pub use effect::{Effect, FOCUS_DELAY};
pub use error::GatewayError;
pub use input::InputBuffer;
pub use phase::{Phase, PhaseError};
pub use portfolio::{Metric, Portfolio, Project, ProjectStatus, StatCard};
pub use session::SessionMetadata;
pub use state::{ConversationState, Message, MessageId, Role};
