use crate::backend::ReasoningBackend;
use crate::pipeline::{Emission, Pipeline};
use crate::sink::{FrameSink, SinkClosed};
use clinic_types::{EventPayload, Session, Stage, StreamConfig};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;
use tokio::time::{Interval, MissedTickBehavior};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamOutcome {
    /// Ended with a `final` envelope
    Completed,
    /// Ended with an `error` envelope
    Failed,
    /// The sink closed before a terminal envelope was delivered
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamReport {
    pub frames: usize,
    pub outcome: StreamOutcome,
}

/// Runs a [`Pipeline`] to completion against a [`FrameSink`], pacing frames
/// according to [`StreamConfig`].
///
/// Shared across requests; each stream gets its own pipeline and holds no
/// state in the driver.
pub struct StreamDriver {
    backend: Arc<dyn ReasoningBackend>,
    config: StreamConfig,
}

impl StreamDriver {
    pub fn new(backend: Arc<dyn ReasoningBackend>, config: StreamConfig) -> Self {
        Self { backend, config }
    }

    /// Create a builder for fluent construction
    pub fn builder() -> crate::builder::DriverBuilder {
        crate::builder::DriverBuilder::new()
    }

    pub fn config(&self) -> &StreamConfig {
        &self.config
    }

    /// Spawn the stream in the background, return the frame receiver.
    ///
    /// Dropping the receiver cancels the stream at its next suspension point.
    pub fn spawn_stream(&self, session: Session) -> mpsc::Receiver<String> {
        let (tx, rx) = mpsc::channel(self.config.channel_capacity.max(1));

        let backend = Arc::clone(&self.backend);
        let config = self.config.clone();

        tokio::spawn(async move {
            let mut tx = tx;
            Self::run(backend, &config, Arc::new(session), &mut tx).await;
        });

        rx
    }

    /// Drive one stream on the current task.
    pub async fn drive<S: FrameSink>(&self, session: Session, sink: &mut S) -> StreamReport {
        Self::run(Arc::clone(&self.backend), &self.config, Arc::new(session), sink).await
    }

    async fn run<S: FrameSink>(
        backend: Arc<dyn ReasoningBackend>,
        config: &StreamConfig,
        session: Arc<Session>,
        sink: &mut S,
    ) -> StreamReport {
        let started = Instant::now();
        let mut pipeline = Pipeline::new(Arc::clone(&session), backend);
        let mut heartbeat = config.heartbeat.map(|period| {
            let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker
        });
        let mut frames = 0usize;

        tracing::info!(
            conversation_id = %session.conversation_id(),
            request_id = %session.request_id(),
            user_role = %session.user_role(),
            business_scenario = %session.business_scenario(),
            "Chat stream started"
        );

        let outcome = loop {
            let next = match heartbeat.as_mut() {
                Some(ticker) => {
                    Self::next_or_ping(&mut pipeline, ticker, &session, sink, &mut frames).await
                }
                None => Ok(pipeline.next_step().await),
            };

            let emission = match next {
                Ok(Some(emission)) => emission,
                Ok(None) => break StreamOutcome::Completed,
                Err(SinkClosed) => break StreamOutcome::Cancelled,
            };

            let Some((stage, frame)) = Self::encode(emission, &mut pipeline) else {
                break StreamOutcome::Failed;
            };

            if sink.send_frame(frame).await.is_err() {
                break StreamOutcome::Cancelled;
            }
            frames += 1;
            tracing::debug!(stage = %stage, frames, "Frame sent");

            match stage {
                Stage::Final => break StreamOutcome::Completed,
                Stage::Error => break StreamOutcome::Failed,
                _ => {}
            }

            let delay = config.delay_after(stage);
            if !delay.is_zero() {
                tokio::select! {
                    _ = tokio::time::sleep(delay) => {}
                    _ = sink.closed() => break StreamOutcome::Cancelled,
                }
            }

            // heartbeat period counts from the end of pacing
            if let Some(ticker) = heartbeat.as_mut() {
                ticker.reset();
            }
        };

        let report = StreamReport { frames, outcome };
        match outcome {
            StreamOutcome::Cancelled => tracing::info!(
                conversation_id = %session.conversation_id(),
                request_id = %session.request_id(),
                frames,
                "Chat stream cancelled by client"
            ),
            _ => tracing::info!(
                conversation_id = %session.conversation_id(),
                request_id = %session.request_id(),
                frames,
                outcome = ?outcome,
                duration_ms = started.elapsed().as_millis() as u64,
                "Chat stream finished"
            ),
        }

        report
    }

    /// Serialize an emission. An encoding failure turns into the pipeline's
    /// `error` envelope; `None` means not even that could be encoded.
    fn encode(emission: Emission, pipeline: &mut Pipeline) -> Option<(Stage, String)> {
        match emission.envelope.to_sse_frame() {
            Ok(frame) => Some((emission.stage, frame)),
            Err(e) => {
                tracing::error!(stage = %emission.stage, "Failed to encode envelope: {}", e);
                let error = pipeline.abort()?;
                error
                    .envelope
                    .to_sse_frame()
                    .ok()
                    .map(|frame| (Stage::Error, frame))
            }
        }
    }

    /// Wait for the pipeline, sending `ping` each time the heartbeat fires
    /// in the meantime.
    async fn next_or_ping<S: FrameSink>(
        pipeline: &mut Pipeline,
        ticker: &mut Interval,
        session: &Session,
        sink: &mut S,
        frames: &mut usize,
    ) -> Result<Option<Emission>, SinkClosed> {
        let next = pipeline.next_step();
        tokio::pin!(next);

        loop {
            tokio::select! {
                emission = &mut next => return Ok(emission),
                _ = ticker.tick() => {
                    // ping never precedes start
                    if *frames == 0 {
                        continue;
                    }
                    match session.envelope(EventPayload::Ping).to_sse_frame() {
                        Ok(frame) => {
                            sink.send_frame(frame).await?;
                            *frames += 1;
                            tracing::debug!(frames = *frames, "Heartbeat sent");
                        }
                        Err(e) => tracing::warn!("Failed to encode heartbeat: {}", e),
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockBackend;
    use crate::sink::VecSink;
    use clinic_types::{ChatRequest, EventEnvelope, EventKind, UserRole};
    use std::time::Duration;

    fn driver() -> StreamDriver {
        StreamDriver::new(Arc::new(MockBackend::new()), StreamConfig::immediate())
    }

    fn session(input: &str) -> Session {
        Session::start(ChatRequest::new(input, "outpatient", 1, 1, UserRole::Patient))
    }

    fn kinds(frames: &[String]) -> Vec<EventKind> {
        frames
            .iter()
            .map(|f| EventEnvelope::from_sse_frame(f).unwrap().kind())
            .collect()
    }

    #[tokio::test]
    async fn test_drive_completes() {
        let mut sink = VecSink::new();
        let report = driver().drive(session("你好"), &mut sink).await;

        assert_eq!(report.outcome, StreamOutcome::Completed);
        assert_eq!(report.frames, sink.frames.len());

        let kinds = kinds(&sink.frames);
        assert_eq!(kinds.first(), Some(&EventKind::Start));
        assert_eq!(kinds.last(), Some(&EventKind::Final));
        assert!(!kinds.contains(&EventKind::Error));
    }

    #[tokio::test]
    async fn test_cancellation_stops_emission() {
        let mut sink = VecSink::closing_after(3);
        let report = driver().drive(session("你好"), &mut sink).await;

        assert_eq!(report.outcome, StreamOutcome::Cancelled);
        assert_eq!(report.frames, 3);
        assert_eq!(sink.frames.len(), 3);
    }

    #[tokio::test]
    async fn test_pacing_longer_than_heartbeat_sends_no_pings() {
        let config = StreamConfig::immediate()
            .with_thinking_delay(Duration::from_millis(20))
            .with_heartbeat(Some(Duration::from_millis(5)));
        let driver = StreamDriver::new(Arc::new(MockBackend::new()), config);

        let mut sink = VecSink::new();
        let report = driver.drive(session("你好"), &mut sink).await;

        assert_eq!(report.outcome, StreamOutcome::Completed);
        assert!(!kinds(&sink.frames).contains(&EventKind::Ping));
    }

    #[tokio::test]
    async fn test_spawned_stream_delivers_frames_in_order() {
        let mut rx = driver().spawn_stream(session("帮我分析"));

        let mut frames = Vec::new();
        while let Some(frame) = rx.recv().await {
            frames.push(frame);
        }

        let kinds = kinds(&frames);
        let n = kinds.len();
        assert_eq!(kinds[0], EventKind::Start);
        assert_eq!(&kinds[n - 2..], &[EventKind::Tool, EventKind::Final]);
    }
}
