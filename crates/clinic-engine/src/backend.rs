use anyhow::Result;
use async_trait::async_trait;
use clinic_types::{Session, ToolName, ToolOutput};

/// Source of everything a response says.
///
/// The pipeline owns ordering and event shapes; a backend only decides
/// content. Implementations must be deterministic per request if callers
/// rely on replaying a conversation.
#[async_trait]
pub trait ReasoningBackend: Send + Sync {
    /// Reasoning trace fragments, in emission order
    async fn thinking_fragments(&self, session: &Session) -> Result<Vec<String>>;

    /// Answer fragments, in emission order
    async fn content_fragments(&self, session: &Session) -> Result<Vec<String>>;

    /// Tool to finish with, or `None` for a plain text answer.
    ///
    /// Called once, after all content has been produced.
    async fn select_tool(&self, session: &Session) -> Result<Option<ToolName>>;

    /// Structured output for the selected tool
    async fn tool_output(&self, tool: ToolName, session: &Session) -> Result<ToolOutput>;
}
