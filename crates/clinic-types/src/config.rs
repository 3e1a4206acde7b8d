use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Phase of the response pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Start,
    Thinking,
    Content,
    Tool,
    Final,
    Error,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Thinking => "thinking",
            Self::Content => "content",
            Self::Tool => "tool",
            Self::Final => "final",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pacing and buffering of a single chat stream
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamConfig {
    pub start_delay: Duration,
    pub thinking_delay: Duration,
    pub content_delay: Duration,
    pub tool_delay: Duration,
    /// Emit `ping` when the pipeline is silent for this long
    pub heartbeat: Option<Duration>,
    /// Frames buffered between the driver and the transport
    pub channel_capacity: usize,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            start_delay: Duration::from_millis(100),
            thinking_delay: Duration::from_millis(150),
            content_delay: Duration::from_millis(100),
            tool_delay: Duration::from_millis(100),
            heartbeat: Some(Duration::from_secs(15)),
            channel_capacity: 16,
        }
    }
}

impl StreamConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// No pacing and no heartbeat.
    pub fn immediate() -> Self {
        Self {
            start_delay: Duration::ZERO,
            thinking_delay: Duration::ZERO,
            content_delay: Duration::ZERO,
            tool_delay: Duration::ZERO,
            heartbeat: None,
            ..Self::default()
        }
    }

    pub fn with_start_delay(mut self, delay: Duration) -> Self {
        self.start_delay = delay;
        self
    }

    pub fn with_thinking_delay(mut self, delay: Duration) -> Self {
        self.thinking_delay = delay;
        self
    }

    pub fn with_content_delay(mut self, delay: Duration) -> Self {
        self.content_delay = delay;
        self
    }

    pub fn with_tool_delay(mut self, delay: Duration) -> Self {
        self.tool_delay = delay;
        self
    }

    pub fn with_heartbeat(mut self, interval: Option<Duration>) -> Self {
        self.heartbeat = interval.filter(|d| !d.is_zero());
        self
    }

    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity.max(1);
        self
    }

    /// Pause after an envelope produced by `stage`. Terminal stages have none.
    pub fn delay_after(&self, stage: Stage) -> Duration {
        match stage {
            Stage::Start => self.start_delay,
            Stage::Thinking => self.thinking_delay,
            Stage::Content => self.content_delay,
            Stage::Tool => self.tool_delay,
            Stage::Final | Stage::Error => Duration::ZERO,
        }
    }
}
