use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

/// The consumer went away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("frame sink closed")]
pub struct SinkClosed;

/// Destination for encoded SSE frames.
///
/// A send either delivers the whole frame or reports [`SinkClosed`]; the
/// driver treats the latter as cancellation.
#[async_trait]
pub trait FrameSink: Send + Sync {
    async fn send_frame(&mut self, frame: String) -> Result<(), SinkClosed>;

    /// Resolves once the consumer is gone. Sinks that cannot observe this
    /// never resolve, and cancellation is noticed on the next send instead.
    async fn closed(&self) {
        futures::future::pending::<()>().await
    }
}

#[async_trait]
impl FrameSink for mpsc::Sender<String> {
    async fn send_frame(&mut self, frame: String) -> Result<(), SinkClosed> {
        self.send(frame).await.map_err(|_| SinkClosed)
    }

    async fn closed(&self) {
        mpsc::Sender::closed(self).await
    }
}

/// Collects frames in memory; optionally closes after a fixed number.
#[derive(Debug, Default)]
pub struct VecSink {
    pub frames: Vec<String>,
    limit: Option<usize>,
}

impl VecSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept `limit` frames, then report closed.
    pub fn closing_after(limit: usize) -> Self {
        Self {
            frames: Vec::new(),
            limit: Some(limit),
        }
    }
}

#[async_trait]
impl FrameSink for VecSink {
    async fn send_frame(&mut self, frame: String) -> Result<(), SinkClosed> {
        if self.limit.is_some_and(|limit| self.frames.len() >= limit) {
            return Err(SinkClosed);
        }
        self.frames.push(frame);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_channel_sink_reports_closed_receiver() {
        let (mut tx, rx) = mpsc::channel::<String>(1);
        drop(rx);

        assert_eq!(tx.send_frame("data: {}\n\n".to_string()).await, Err(SinkClosed));
        FrameSink::closed(&tx).await;
    }

    #[tokio::test]
    async fn test_vec_sink_limit() {
        let mut sink = VecSink::closing_after(1);

        assert!(sink.send_frame("a".to_string()).await.is_ok());
        assert!(sink.send_frame("b".to_string()).await.is_err());
        assert_eq!(sink.frames, vec!["a".to_string()]);
    }
}
