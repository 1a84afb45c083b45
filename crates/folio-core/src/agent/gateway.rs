use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};

use super::payload::{AgentRequest, AgentResponse, RequestIdentity, RequestStyle};
use crate::conversation::PendingQuery;
use crate::error::GatewayError;
use crate::session::SessionMetadata;

/// Something that can answer a user's question.
///
/// `Ok` carries the text to display, which may be the fallback reply when the
/// agent reported no success. `Err` is reserved for transport and decoding
/// failures.
#[async_trait]
pub trait AgentGateway: Send + Sync {
    async fn query_agent(
        &self,
        query: &PendingQuery,
        session: &SessionMetadata,
    ) -> Result<String, GatewayError>;
}

/// Talks to the agent over HTTP: one JSON `POST` per question.
#[derive(Clone)]
pub struct HttpAgentGateway {
    client: Client,
    endpoint: String,
    style: RequestStyle,
}

impl HttpAgentGateway {
    pub fn new(endpoint: &str, style: RequestStyle) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.to_string(),
            style,
        }
    }

    fn build_request<'a>(
        &self,
        query: &'a PendingQuery,
        session: &'a SessionMetadata,
    ) -> AgentRequest<'a> {
        let identity = match self.style {
            RequestStyle::Identifiers => RequestIdentity::Identifiers {
                user_id: session.next_user_id(),
                session_id: session.session_id(),
            },
            RequestStyle::Context => RequestIdentity::Context {
                conversation_context: &query.context,
            },
        };

        AgentRequest {
            message: &query.text,
            agent_id: session.agent_id(),
            identity,
        }
    }
}

#[async_trait]
impl AgentGateway for HttpAgentGateway {
    async fn query_agent(
        &self,
        query: &PendingQuery,
        session: &SessionMetadata,
    ) -> Result<String, GatewayError> {
        let request = self.build_request(query, session);
        debug!(
            endpoint = %self.endpoint,
            request = %query.request,
            style = self.style.as_str(),
            "sending agent request"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(GatewayError::Transport)?;

        // Error statuses still carry a JSON body worth decoding.
        let status = response.status();
        if !status.is_success() {
            warn!(%status, request = %query.request, "agent endpoint returned error status");
        }

        let body = response.bytes().await.map_err(GatewayError::Body)?;
        let payload = AgentResponse::from_slice(&body)?;

        if !payload.succeeded() {
            debug!(request = %query.request, "agent reported no success");
        }
        Ok(payload.display_text())
    }
}
