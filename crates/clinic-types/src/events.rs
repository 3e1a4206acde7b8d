use crate::tools::ToolData;
use serde::ser::SerializeStruct;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// One SSE message of the chat stream.
///
/// Serializes as `{"conversation_id", "request_id", "event", "data"?}`. The
/// `event` tag fully determines the shape of `data`, which is omitted for
/// `start`, `ping` and `error`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub conversation_id: String,
    pub request_id: String,
    #[serde(flatten)]
    pub payload: EventPayload,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "lowercase")]
pub enum EventPayload {
    /// First envelope of every stream
    Start,

    /// Keep-alive while a stage is slow to produce output
    Ping,

    /// Incremental answer or reasoning text
    Delta(DeltaData),

    /// Structured tool result
    Tool(ToolData),

    /// Terminal result of a successful run
    Final(FinalData),

    /// Terminal failure; details stay server-side
    Error,
}

impl EventPayload {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Start => EventKind::Start,
            Self::Ping => EventKind::Ping,
            Self::Delta(_) => EventKind::Delta,
            Self::Tool(_) => EventKind::Tool,
            Self::Final(_) => EventKind::Final,
            Self::Error => EventKind::Error,
        }
    }

    /// `final` and `error` end the stream.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Final(_) | Self::Error)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Start,
    Ping,
    Delta,
    Tool,
    Final,
    Error,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Ping => "ping",
            Self::Delta => "delta",
            Self::Tool => "tool",
            Self::Final => "final",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `delta` payload. Exactly one of `content` / `thinking_content` is
/// populated; the other is sent as an empty string.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DeltaData {
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub thinking_content: String,
    /// Reserved for incremental tool-call hints
    #[serde(default)]
    pub tool_calls: Option<serde_json::Value>,
}

impl DeltaData {
    pub fn content(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }

    pub fn thinking(thinking_content: impl Into<String>) -> Self {
        Self {
            thinking_content: thinking_content.into(),
            ..Self::default()
        }
    }
}

/// `final` payload
///
/// Both `text` and `data` are always written; the unused one is `""` or
/// `null`.
#[derive(Debug, Clone, PartialEq)]
pub enum FinalData {
    /// The assembled answer text
    Text { text: String },
    /// Echo of the preceding `tool` event
    Tool { data: ToolData },
}

impl FinalData {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    pub fn tool(data: ToolData) -> Self {
        Self::Tool { data }
    }
}

impl Serialize for FinalData {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("FinalData", 3)?;
        match self {
            Self::Text { text } => {
                state.serialize_field("result_type", "text")?;
                state.serialize_field("text", text)?;
                state.serialize_field("data", &None::<ToolData>)?;
            }
            Self::Tool { data } => {
                state.serialize_field("result_type", "tool")?;
                state.serialize_field("text", "")?;
                state.serialize_field("data", &Some(data))?;
            }
        }
        state.end()
    }
}

impl<'de> Deserialize<'de> for FinalData {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(rename_all = "lowercase")]
        enum ResultType {
            Text,
            Tool,
        }

        #[derive(Deserialize)]
        struct Wire {
            result_type: ResultType,
            #[serde(default)]
            text: String,
            #[serde(default)]
            data: Option<ToolData>,
        }

        let wire = Wire::deserialize(deserializer)?;
        match wire.result_type {
            ResultType::Text => Ok(Self::Text { text: wire.text }),
            ResultType::Tool => wire
                .data
                .map(|data| Self::Tool { data })
                .ok_or_else(|| de::Error::missing_field("data")),
        }
    }
}

impl EventEnvelope {
    pub fn kind(&self) -> EventKind {
        self.payload.kind()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Encode as one SSE frame: `data: <json>\n\n`.
    pub fn to_sse_frame(&self) -> serde_json::Result<String> {
        Ok(format!("data: {}\n\n", self.to_json()?))
    }

    /// Decode a single frame produced by [`EventEnvelope::to_sse_frame`].
    pub fn from_sse_frame(frame: &str) -> serde_json::Result<Self> {
        let body = frame.trim();
        let body = body.strip_prefix("data:").unwrap_or(body);
        serde_json::from_str(body.trim_start())
    }
}
