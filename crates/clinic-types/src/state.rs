use crate::events::{EventEnvelope, EventPayload};
use crate::request::{ChatRequest, UserRole};

/// Identifiers and request parameters bound to one streamed response.
///
/// Immutable once created. Every envelope built through [`Session::envelope`]
/// carries this session's `conversation_id` and `request_id`.
#[derive(Debug, Clone)]
pub struct Session {
    conversation_id: String,
    request_id: String,
    request: ChatRequest,
}

impl Session {
    /// Bind a session to an accepted request.
    ///
    /// The conversation id is reused from the request when supplied; the
    /// request id is always fresh.
    pub fn start(request: ChatRequest) -> Self {
        let conversation_id = request
            .supplied_conversation_id()
            .map(str::to_string)
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

        Self {
            conversation_id,
            request_id: uuid::Uuid::new_v4().to_string(),
            request,
        }
    }

    /// Build a session with explicit identifiers.
    pub fn from_parts(
        conversation_id: impl Into<String>,
        request_id: impl Into<String>,
        request: ChatRequest,
    ) -> Self {
        Self {
            conversation_id: conversation_id.into(),
            request_id: request_id.into(),
            request,
        }
    }

    pub fn conversation_id(&self) -> &str {
        &self.conversation_id
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    pub fn request(&self) -> &ChatRequest {
        &self.request
    }

    pub fn user_input(&self) -> &str {
        &self.request.user_input
    }

    pub fn user_role(&self) -> UserRole {
        self.request.user_role
    }

    pub fn business_scenario(&self) -> &str {
        &self.request.business_scenario
    }

    pub fn model_id(&self) -> i64 {
        self.request.model_id
    }

    pub fn prompt_id(&self) -> i64 {
        self.request.prompt_id
    }

    /// Stamp a payload with this session's identifiers.
    pub fn envelope(&self, payload: EventPayload) -> EventEnvelope {
        EventEnvelope {
            conversation_id: self.conversation_id.clone(),
            request_id: self.request_id.clone(),
            payload,
        }
    }
}
