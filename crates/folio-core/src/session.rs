//! Identifying metadata sent along with every agent request.

use uuid::Uuid;

/// Identity of one chat session with the agent.
///
/// The session id is fixed when the session is created; a fresh user id is
/// minted per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionMetadata {
    agent_id: String,
    session_id: String,
}

impl SessionMetadata {
    pub fn new(agent_id: impl Into<String>) -> Self {
        Self {
            agent_id: agent_id.into(),
            session_id: format!("session-{}", Uuid::new_v4()),
        }
    }

    /// Use a caller-chosen session id (deployments with their own scheme).
    pub fn with_session_id(agent_id: impl Into<String>, session_id: impl Into<String>) -> Self {
        Self {
            agent_id: agent_id.into(),
            session_id: session_id.into(),
        }
    }

    pub fn agent_id(&self) -> &str {
        &self.agent_id
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn next_user_id(&self) -> String {
        format!("user-{}", Uuid::new_v4())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_id_is_stable_and_user_ids_are_fresh() {
        let session = SessionMetadata::new("agent-1");
        assert_eq!(session.agent_id(), "agent-1");
        assert!(session.session_id().starts_with("session-"));

        let a = session.next_user_id();
        let b = session.next_user_id();
        assert!(a.starts_with("user-"));
        assert_ne!(a, b);
        assert_eq!(session.session_id(), session.clone().session_id());
    }
}
