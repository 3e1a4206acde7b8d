//! Fixed-content backend.
//!
//! Produces the same reasoning trace, advice text and tool payloads for every
//! request, so stream ordering and pacing can be exercised without a model.

mod fragments;
mod outputs;

pub use fragments::CONTENT as CONTENT_FRAGMENTS;

use crate::backend::ReasoningBackend;
use anyhow::Result;
use async_trait::async_trait;
use clinic_types::{Session, ToolName, ToolOutput};

pub const DEFAULT_TRIGGERS: [&str; 2] = ["分析", "检查"];

pub struct MockBackend {
    triggers: Vec<String>,
    tool: ToolName,
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            triggers: DEFAULT_TRIGGERS.iter().map(|t| t.to_string()).collect(),
            tool: ToolName::EvidenceConclusion,
        }
    }

    /// Keywords in the user input that route the answer through a tool.
    pub fn with_triggers<I, S>(mut self, triggers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.triggers = triggers
            .into_iter()
            .map(Into::into)
            .filter(|t: &String| !t.is_empty())
            .collect();
        self
    }

    pub fn with_tool(mut self, tool: ToolName) -> Self {
        self.tool = tool;
        self
    }

    pub fn triggers(&self) -> &[String] {
        &self.triggers
    }

    fn is_triggered(&self, input: &str) -> bool {
        self.triggers.iter().any(|t| input.contains(t.as_str()))
    }

    /// The full advice text a non-tool answer ends with.
    pub fn answer_text() -> String {
        CONTENT_FRAGMENTS.concat()
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReasoningBackend for MockBackend {
    async fn thinking_fragments(&self, session: &Session) -> Result<Vec<String>> {
        Ok(fragments::thinking(session))
    }

    async fn content_fragments(&self, _session: &Session) -> Result<Vec<String>> {
        Ok(fragments::content())
    }

    async fn select_tool(&self, session: &Session) -> Result<Option<ToolName>> {
        Ok(self.is_triggered(session.user_input()).then_some(self.tool))
    }

    async fn tool_output(&self, tool: ToolName, _session: &Session) -> Result<ToolOutput> {
        Ok(outputs::for_tool(tool))
    }
}
