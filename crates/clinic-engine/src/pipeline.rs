use crate::backend::ReasoningBackend;
use anyhow::Result;
use clinic_types::{
    DeltaData, EventEnvelope, EventPayload, FinalData, Session, Stage, ToolData, ToolName,
};
use std::sync::Arc;

/// An envelope together with the stage that produced it
#[derive(Debug, Clone)]
pub struct Emission {
    pub stage: Stage,
    pub envelope: EventEnvelope,
}

enum State {
    Start,
    LoadThinking,
    Thinking(std::vec::IntoIter<String>),
    LoadContent,
    Content(std::vec::IntoIter<String>),
    Branch,
    Tool(ToolName),
    FinalTool(ToolData),
    FinalText,
    Done,
}

/// The response state machine:
///
/// ```text
/// START -> THINKING* -> CONTENT* -> (TOOL -> FINAL_TOOL | FINAL_TEXT)
/// any state -> ERROR (terminal)
/// ```
///
/// Each call to [`Pipeline::next_step`] yields the next envelope, or `None`
/// once a terminal envelope has been produced. There is no pacing here.
pub struct Pipeline {
    session: Arc<Session>,
    backend: Arc<dyn ReasoningBackend>,
    state: State,
    stage: Stage,
    answer: String,
    failed: bool,
}

impl Pipeline {
    pub fn new(session: Arc<Session>, backend: Arc<dyn ReasoningBackend>) -> Self {
        Self {
            session,
            backend,
            state: State::Start,
            stage: Stage::Start,
            answer: String::new(),
            failed: false,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Stage of the most recent emission, or the stage being entered.
    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.state, State::Done)
    }

    /// Produce the next envelope.
    ///
    /// A backend failure abandons the remaining stages and yields a single
    /// `error` envelope instead.
    pub async fn next_step(&mut self) -> Option<Emission> {
        match self.advance().await {
            Ok(emission) => emission,
            Err(e) => {
                tracing::warn!(
                    conversation_id = %self.session.conversation_id(),
                    request_id = %self.session.request_id(),
                    stage = %self.stage,
                    "Pipeline failed: {:#}",
                    e
                );
                self.abort()
            }
        }
    }

    /// Stop the run and return the `error` envelope, unless one was already
    /// produced.
    pub fn abort(&mut self) -> Option<Emission> {
        self.state = State::Done;
        if self.failed {
            return None;
        }
        self.failed = true;
        Some(self.emit(Stage::Error, EventPayload::Error))
    }

    async fn advance(&mut self) -> Result<Option<Emission>> {
        loop {
            // Taking the state leaves `Done` behind, so an early `?` return
            // cannot resume a half-finished stage.
            match std::mem::replace(&mut self.state, State::Done) {
                State::Start => {
                    self.state = State::LoadThinking;
                    return Ok(Some(self.emit(Stage::Start, EventPayload::Start)));
                }
                State::LoadThinking => {
                    self.stage = Stage::Thinking;
                    let fragments = self.backend.thinking_fragments(&self.session).await?;
                    self.state = State::Thinking(fragments.into_iter());
                }
                State::Thinking(mut fragments) => match fragments.next() {
                    Some(fragment) => {
                        self.state = State::Thinking(fragments);
                        let payload = EventPayload::Delta(DeltaData::thinking(fragment));
                        return Ok(Some(self.emit(Stage::Thinking, payload)));
                    }
                    None => self.state = State::LoadContent,
                },
                State::LoadContent => {
                    self.stage = Stage::Content;
                    let fragments = self.backend.content_fragments(&self.session).await?;
                    self.state = State::Content(fragments.into_iter());
                }
                State::Content(mut fragments) => match fragments.next() {
                    Some(fragment) => {
                        self.answer.push_str(&fragment);
                        self.state = State::Content(fragments);
                        let payload = EventPayload::Delta(DeltaData::content(fragment));
                        return Ok(Some(self.emit(Stage::Content, payload)));
                    }
                    None => self.state = State::Branch,
                },
                State::Branch => {
                    self.state = match self.backend.select_tool(&self.session).await? {
                        Some(tool) => State::Tool(tool),
                        None => State::FinalText,
                    };
                }
                State::Tool(tool) => {
                    self.stage = Stage::Tool;
                    let output = self.backend.tool_output(tool, &self.session).await?;
                    tracing::debug!(tool = %tool, entries = output.len(), "Tool output ready");

                    let data = ToolData::new(tool, output);
                    self.state = State::FinalTool(data.clone());
                    return Ok(Some(self.emit(Stage::Tool, EventPayload::Tool(data))));
                }
                State::FinalTool(data) => {
                    let payload = EventPayload::Final(FinalData::tool(data));
                    return Ok(Some(self.emit(Stage::Final, payload)));
                }
                State::FinalText => {
                    let text = std::mem::take(&mut self.answer);
                    let payload = EventPayload::Final(FinalData::text(text));
                    return Ok(Some(self.emit(Stage::Final, payload)));
                }
                State::Done => return Ok(None),
            }
        }
    }

    fn emit(&mut self, stage: Stage, payload: EventPayload) -> Emission {
        self.stage = stage;
        Emission {
            stage,
            envelope: self.session.envelope(payload),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockBackend;
    use clinic_types::{ChatRequest, EventKind, Session, ToolOutput, UserRole};

    fn pipeline(input: &str) -> Pipeline {
        let request = ChatRequest::new(input, "outpatient", 1, 2, UserRole::Patient);
        Pipeline::new(
            Arc::new(Session::from_parts("conv", "req", request)),
            Arc::new(MockBackend::new()),
        )
    }

    async fn drain(mut pipeline: Pipeline) -> Vec<Emission> {
        let mut out = Vec::new();
        while let Some(emission) = pipeline.next_step().await {
            out.push(emission);
        }
        out
    }

    #[tokio::test]
    async fn test_text_run_stage_order() {
        let emissions = drain(pipeline("你好")).await;
        let stages: Vec<Stage> = emissions.iter().map(|e| e.stage).collect();

        assert_eq!(stages.first(), Some(&Stage::Start));
        assert_eq!(stages.last(), Some(&Stage::Final));

        let thinking = stages.iter().filter(|s| **s == Stage::Thinking).count();
        let content = stages.iter().filter(|s| **s == Stage::Content).count();
        assert_eq!(thinking, 10);
        assert_eq!(content, crate::mock::CONTENT_FRAGMENTS.len());

        // thinking strictly before content
        let last_thinking = stages.iter().rposition(|s| *s == Stage::Thinking).unwrap();
        let first_content = stages.iter().position(|s| *s == Stage::Content).unwrap();
        assert!(last_thinking < first_content);
    }

    #[tokio::test]
    async fn test_final_text_is_concatenated_content() {
        let emissions = drain(pipeline("你好")).await;

        let streamed: String = emissions
            .iter()
            .filter_map(|e| match &e.envelope.payload {
                EventPayload::Delta(delta) => Some(delta.content.as_str()),
                _ => None,
            })
            .collect();

        match &emissions.last().unwrap().envelope.payload {
            EventPayload::Final(FinalData::Text { text }) => {
                assert_eq!(text, &streamed);
                assert_eq!(text, &MockBackend::answer_text());
            }
            other => panic!("Expected text final, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_deltas_carry_one_field() {
        for emission in drain(pipeline("你好")).await {
            if let EventPayload::Delta(delta) = &emission.envelope.payload {
                assert!(delta.content.is_empty() != delta.thinking_content.is_empty());
                assert!(delta.tool_calls.is_none());
            }
        }
    }

    #[tokio::test]
    async fn test_tool_run_ends_with_matching_final() {
        let emissions = drain(pipeline("我该做什么检查")).await;
        let n = emissions.len();

        assert_eq!(emissions[n - 2].envelope.kind(), EventKind::Tool);
        assert_eq!(emissions[n - 1].envelope.kind(), EventKind::Final);

        let tool = match &emissions[n - 2].envelope.payload {
            EventPayload::Tool(data) => data.clone(),
            other => panic!("Expected tool, got {:?}", other),
        };
        assert_eq!(tool.tool_name, ToolName::EvidenceConclusion);
        assert!(matches!(tool.tool_output, ToolOutput::EvidenceConclusion(ref e) if e.evidence_list.len() == 7));

        match &emissions[n - 1].envelope.payload {
            EventPayload::Final(FinalData::Tool { data }) => assert_eq!(data, &tool),
            other => panic!("Expected tool final, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_every_envelope_carries_session_ids() {
        for emission in drain(pipeline("帮我分析")).await {
            assert_eq!(emission.envelope.conversation_id, "conv");
            assert_eq!(emission.envelope.request_id, "req");
        }
    }

    #[tokio::test]
    async fn test_abort_yields_single_error() {
        let mut p = pipeline("你好");
        assert_eq!(p.next_step().await.unwrap().stage, Stage::Start);

        let error = p.abort().unwrap();
        assert_eq!(error.envelope.kind(), EventKind::Error);
        assert!(p.abort().is_none());
        assert!(p.next_step().await.is_none());
        assert!(p.is_finished());
    }
}
