use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::state::Role;

/// Reply shown when the agent answers without a usable success payload.
pub const FALLBACK_REPLY: &str =
    "I'm having trouble retrieving that information. Could you ask another question?";

/// How a deployment expects identifying fields to be sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStyle {
    /// `user_id` and `session_id` on every request.
    #[default]
    Identifiers,
    /// The prior exchange as `conversation_context` instead of identifiers.
    Context,
}

impl RequestStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStyle::Identifiers => "identifiers",
            RequestStyle::Context => "context",
        }
    }
}

impl std::str::FromStr for RequestStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "identifiers" | "ids" => Ok(RequestStyle::Identifiers),
            "context" => Ok(RequestStyle::Context),
            other => Err(format!(
                "unknown request style '{}' (expected 'identifiers' or 'context')",
                other
            )),
        }
    }
}

/// One prior turn, as sent in `conversation_context`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContextEntry {
    #[serde(rename = "type")]
    pub kind: Role,
    pub content: String,
}

/// Body of `POST /api/agent`.
#[derive(Debug, Serialize)]
pub struct AgentRequest<'a> {
    pub message: &'a str,
    pub agent_id: &'a str,
    #[serde(flatten)]
    pub identity: RequestIdentity<'a>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum RequestIdentity<'a> {
    Identifiers { user_id: String, session_id: &'a str },
    Context { conversation_context: &'a [ContextEntry] },
}

/// The object form of `response` that carries its own `response` string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NestedResponse {
    pub response: String,
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

/// Shapes the `response` field has been seen to take.
///
/// Upstream deployments disagree on this contract, so every shape is kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResponseField {
    Text(String),
    Nested(NestedResponse),
    Other(Value),
}

/// A decoded agent reply.
///
/// Built from any JSON value: `success` is judged by truthiness and a body
/// that is not an object reads as unsuccessful.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AgentResponse {
    pub success: bool,
    pub response: Option<ResponseField>,
}

impl AgentResponse {
    /// Decode a response body. Only malformed JSON is an error.
    pub fn from_slice(body: &[u8]) -> Result<Self, serde_json::Error> {
        let value: Value = serde_json::from_slice(body)?;
        Ok(Self::from_value(value))
    }

    pub fn from_value(value: Value) -> Self {
        let Value::Object(mut fields) = value else {
            return Self::default();
        };

        let success = fields.get("success").is_some_and(is_truthy);
        let response = match fields.remove("response") {
            None | Some(Value::Null) => None,
            Some(field) => Some(
                serde_json::from_value(field.clone()).unwrap_or(ResponseField::Other(field)),
            ),
        };

        Self { success, response }
    }

    pub fn succeeded(&self) -> bool {
        self.success
    }

    pub fn display_text(&self) -> String {
        extract_display_text(self)
    }
}

/// Pick the text to show for a decoded agent response.
///
/// Shape mismatches never fail: anything unrecognised is shown in its JSON
/// form. Only a missing success flag or an empty answer yields the fallback.
pub fn extract_display_text(payload: &AgentResponse) -> String {
    if !payload.succeeded() {
        return FALLBACK_REPLY.to_string();
    }

    match &payload.response {
        None => FALLBACK_REPLY.to_string(),
        Some(ResponseField::Text(text)) if text.is_empty() => FALLBACK_REPLY.to_string(),
        Some(ResponseField::Text(text)) => text.clone(),
        Some(ResponseField::Nested(nested)) if !nested.response.is_empty() => {
            nested.response.clone()
        }
        Some(ResponseField::Other(value)) if is_blank_value(value) => FALLBACK_REPLY.to_string(),
        Some(field @ (ResponseField::Nested(_) | ResponseField::Other(_))) => {
            serde_json::to_string(field).unwrap_or_else(|_| FALLBACK_REPLY.to_string())
        }
    }
}

// null, false and 0 count as "no response"
fn is_blank_value(value: &Value) -> bool {
    match value {
        Value::Null | Value::Bool(false) => true,
        Value::Number(n) => n.as_f64() == Some(0.0),
        _ => false,
    }
}

// Falsy values are null, false, 0 and the empty string
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::String(s) => !s.is_empty(),
        other => !is_blank_value(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn decode(value: Value) -> AgentResponse {
        AgentResponse::from_value(value)
    }

    #[test]
    fn plain_string_response() {
        let payload = decode(json!({"success": true, "response": "hello"}));
        assert_eq!(payload.response, Some(ResponseField::Text("hello".into())));
        assert_eq!(extract_display_text(&payload), "hello");
    }

    #[test]
    fn nested_response_string() {
        let payload = decode(json!({
            "success": true,
            "response": {"response": "nested", "agent": "portfolio"}
        }));
        assert!(matches!(payload.response, Some(ResponseField::Nested(_))));
        assert_eq!(extract_display_text(&payload), "nested");
    }

    #[test]
    fn unrecognised_shape_is_stringified() {
        let payload = decode(json!({"success": true, "response": {"answer": 42}}));
        assert_eq!(extract_display_text(&payload), r#"{"answer":42}"#);

        let payload = decode(json!({"success": true, "response": ["a", "b"]}));
        assert_eq!(extract_display_text(&payload), r#"["a","b"]"#);
    }

    #[test]
    fn nested_with_empty_text_is_stringified() {
        let payload = decode(json!({"success": true, "response": {"response": ""}}));
        assert_eq!(extract_display_text(&payload), r#"{"response":""}"#);
    }

    #[test]
    fn nested_with_non_string_response_is_stringified() {
        let payload = decode(json!({"success": true, "response": {"response": {"text": "x"}}}));
        assert!(matches!(payload.response, Some(ResponseField::Other(_))));
        assert_eq!(extract_display_text(&payload), r#"{"response":{"text":"x"}}"#);
    }

    #[test]
    fn unsuccessful_payloads_fall_back() {
        for body in [
            json!({"success": false}),
            json!({"success": false, "response": "ignored"}),
            json!({"response": "no flag"}),
            json!({}),
        ] {
            assert_eq!(extract_display_text(&decode(body)), FALLBACK_REPLY);
        }
    }

    #[test]
    fn empty_answers_fall_back() {
        for body in [
            json!({"success": true}),
            json!({"success": true, "response": null}),
            json!({"success": true, "response": ""}),
            json!({"success": true, "response": false}),
            json!({"success": true, "response": 0}),
        ] {
            assert_eq!(extract_display_text(&decode(body)), FALLBACK_REPLY);
        }
    }

    #[test]
    fn truthy_success_flag_counts_as_success() {
        for flag in [json!("true"), json!(1), json!("yes"), json!({})] {
            let payload = decode(json!({"success": flag, "response": "hi"}));
            assert_eq!(extract_display_text(&payload), "hi");
        }
        for flag in [json!(""), json!(0), json!(null)] {
            let payload = decode(json!({"success": flag, "response": "hi"}));
            assert_eq!(extract_display_text(&payload), FALLBACK_REPLY);
        }
    }

    #[test]
    fn non_object_bodies_fall_back() {
        for body in [r#""plain""#, "[1, 2]", "42", "null", "true"] {
            let payload = AgentResponse::from_slice(body.as_bytes()).unwrap();
            assert!(!payload.succeeded());
            assert_eq!(payload.display_text(), FALLBACK_REPLY);
        }
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(AgentResponse::from_slice(b"<html>bad gateway</html>").is_err());
        assert!(AgentResponse::from_slice(b"{\"success\": true,").is_err());
    }

    #[test]
    fn identifiers_request_shape() {
        let request = AgentRequest {
            message: "hi",
            agent_id: "agent-1",
            identity: RequestIdentity::Identifiers {
                user_id: "user-1".into(),
                session_id: "session-1",
            },
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "message": "hi",
                "agent_id": "agent-1",
                "user_id": "user-1",
                "session_id": "session-1"
            })
        );
    }

    #[test]
    fn context_request_shape() {
        let context = vec![
            ContextEntry { kind: Role::User, content: "skills?".into() },
            ContextEntry { kind: Role::Agent, content: "Rust".into() },
        ];
        let request = AgentRequest {
            message: "projects?",
            agent_id: "agent-1",
            identity: RequestIdentity::Context { conversation_context: &context },
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "message": "projects?",
                "agent_id": "agent-1",
                "conversation_context": [
                    {"type": "user", "content": "skills?"},
                    {"type": "agent", "content": "Rust"}
                ]
            })
        );
    }

    #[test]
    fn request_style_parses() {
        assert_eq!("Context".parse::<RequestStyle>(), Ok(RequestStyle::Context));
        assert_eq!("identifiers".parse::<RequestStyle>(), Ok(RequestStyle::Identifiers));
        assert!("nope".parse::<RequestStyle>().is_err());
    }
}
