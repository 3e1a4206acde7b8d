use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

/// Who is on the other end of the conversation.
///
/// Deserialization rejects anything other than `patient` or `doctor`, so an
/// invalid role never reaches session construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Patient,
    Doctor,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Patient => "patient",
            Self::Doctor => "doctor",
        }
    }

    /// Display label used in the reasoning trace.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Patient => "患者",
            Self::Doctor => "医生",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body of `POST /chat`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ChatRequest {
    /// Free-text user input
    pub user_input: String,
    /// Business scenario tag
    pub business_scenario: String,
    /// Client conversation id; a fresh one is generated when absent or empty
    #[serde(default)]
    pub conversation_id: Option<String>,
    pub model_id: i64,
    pub prompt_id: i64,
    pub user_role: UserRole,
}

impl ChatRequest {
    pub fn new(
        user_input: impl Into<String>,
        business_scenario: impl Into<String>,
        model_id: i64,
        prompt_id: i64,
        user_role: UserRole,
    ) -> Self {
        Self {
            user_input: user_input.into(),
            business_scenario: business_scenario.into(),
            conversation_id: None,
            model_id,
            prompt_id,
            user_role,
        }
    }

    pub fn with_conversation_id(mut self, conversation_id: impl Into<String>) -> Self {
        self.conversation_id = Some(conversation_id.into());
        self
    }

    /// The supplied conversation id, if it is present and non-empty.
    pub fn supplied_conversation_id(&self) -> Option<&str> {
        self.conversation_id
            .as_deref()
            .filter(|id| !id.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_rejects_unknown_value() {
        let json = r#"{
            "user_input": "hi",
            "business_scenario": "triage",
            "model_id": 1,
            "prompt_id": 2,
            "user_role": "nurse"
        }"#;

        assert!(serde_json::from_str::<ChatRequest>(json).is_err());
    }

    #[test]
    fn test_conversation_id_is_optional() {
        let json = r#"{
            "user_input": "hi",
            "business_scenario": "triage",
            "model_id": 1,
            "prompt_id": 2,
            "user_role": "doctor"
        }"#;

        let request: ChatRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.user_role, UserRole::Doctor);
        assert!(request.supplied_conversation_id().is_none());
    }

    #[test]
    fn test_empty_conversation_id_counts_as_absent() {
        let request = ChatRequest::new("hi", "triage", 1, 2, UserRole::Patient)
            .with_conversation_id("");
        assert!(request.supplied_conversation_id().is_none());

        let request = request.with_conversation_id("conv-1");
        assert_eq!(request.supplied_conversation_id(), Some("conv-1"));
    }

    #[test]
    fn test_conversation_id_kept_verbatim() {
        let request = ChatRequest::new("hi", "triage", 1, 2, UserRole::Patient)
            .with_conversation_id(" conv-1 ");
        assert_eq!(request.supplied_conversation_id(), Some(" conv-1 "));

        let request = request.with_conversation_id("   ");
        assert_eq!(request.supplied_conversation_id(), Some("   "));
    }
}
