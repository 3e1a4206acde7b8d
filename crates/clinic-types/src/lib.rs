pub mod config;
pub mod events;
pub mod request;
pub mod state;
pub mod tools;

pub use config::{Stage, StreamConfig};
pub use events::{DeltaData, EventEnvelope, EventKind, EventPayload, FinalData};
pub use request::{ChatRequest, UserRole};
pub use state::Session;
pub use tools::{
    DigitalDoctorReasoning, EmptyOutput, EvidenceConclusion, EvidenceFile, FileRef, ItemList,
    MedicalRecord, PersonalizedAnalysis, ReasoningItem, ToolData, ToolName, ToolOutput,
};
