pub mod gateway;
pub mod payload;

pub use gateway::{AgentGateway, HttpAgentGateway};
pub use payload::{
    extract_display_text, AgentRequest, AgentResponse, ContextEntry, NestedResponse,
    RequestIdentity, RequestStyle, ResponseField, FALLBACK_REPLY,
};
