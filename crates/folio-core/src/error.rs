//! Errors raised by the agent gateway.

use thiserror::Error;

/// Failures that abort a single agent round trip.
///
/// An unsuccessful payload (`success` absent or false) is *not* one of these:
/// it decodes fine and yields the fallback reply instead.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The request never produced a response (connection refused, DNS, TLS...).
    #[error("agent request failed: {0}")]
    Transport(#[source] reqwest::Error),

    /// A response arrived but its body could not be read.
    #[error("failed to read agent response body: {0}")]
    Body(#[source] reqwest::Error),

    /// The body was not valid JSON for an agent response.
    #[error("agent response was not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),

    /// The background task running the request died before reporting.
    #[error("agent request task ended abnormally: {0}")]
    Task(String),
}
