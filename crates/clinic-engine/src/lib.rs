pub mod backend;
pub mod builder;
pub mod driver;
pub mod mock;
pub mod pipeline;
pub mod sink;

pub use backend::ReasoningBackend;
pub use builder::DriverBuilder;
pub use driver::{StreamDriver, StreamOutcome, StreamReport};
pub use mock::MockBackend;
pub use pipeline::{Emission, Pipeline};
pub use sink::{FrameSink, SinkClosed, VecSink};

// Re-export key types from clinic-types
pub use clinic_types::{
    ChatRequest, EventEnvelope, EventKind, EventPayload, Session, Stage, StreamConfig, ToolName,
};
