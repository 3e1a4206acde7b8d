use serde::{Deserialize, Serialize};
use std::fmt;

/// Tool kinds a response can end with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolName {
    DigitalDoctorReasoning,
    EvidenceConclusion,
    PersonalizedAnalysis,
    IntegratedReasoning,
}

impl ToolName {
    pub const ALL: [ToolName; 4] = [
        Self::DigitalDoctorReasoning,
        Self::EvidenceConclusion,
        Self::PersonalizedAnalysis,
        Self::IntegratedReasoning,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DigitalDoctorReasoning => "digital_doctor_reasoning",
            Self::EvidenceConclusion => "evidence_conclusion",
            Self::PersonalizedAnalysis => "personalized_analysis",
            Self::IntegratedReasoning => "integrated_reasoning",
        }
    }
}

impl fmt::Display for ToolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ToolName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|tool| tool.as_str() == s)
            .ok_or_else(|| format!("unknown tool: {}", s))
    }
}

/// A file attached to a reasoning item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRef {
    pub file_name: String,
    pub file_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReasoningItem {
    pub item: String,
    #[serde(default)]
    pub file_list: Vec<FileRef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ItemList {
    pub list: Vec<ReasoningItem>,
}

/// `digital_doctor_reasoning` output: diagnoses, exams and treatments,
/// each item with its supporting files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DigitalDoctorReasoning {
    pub diagnosis: ItemList,
    pub exams: ItemList,
    pub treatments: ItemList,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceFile {
    pub file_name: String,
    pub file_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_type: Option<String>,
}

/// `evidence_conclusion` output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceConclusion {
    pub evidence_list: Vec<EvidenceFile>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MedicalRecord {
    pub record_id: String,
    pub record_time: String,
    pub record_content: String,
}

/// `personalized_analysis` output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonalizedAnalysis {
    pub record_list: Vec<MedicalRecord>,
}

/// Serializes as `{}`
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EmptyOutput {}

/// Structured tool output; its shape depends on the tool that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ToolOutput {
    DigitalDoctorReasoning(DigitalDoctorReasoning),
    EvidenceConclusion(EvidenceConclusion),
    PersonalizedAnalysis(PersonalizedAnalysis),
    Empty(EmptyOutput),
}

impl ToolOutput {
    /// Number of top-level entries, for logging.
    pub fn len(&self) -> usize {
        match self {
            Self::DigitalDoctorReasoning(r) => {
                r.diagnosis.list.len() + r.exams.list.len() + r.treatments.list.len()
            }
            Self::EvidenceConclusion(e) => e.evidence_list.len(),
            Self::PersonalizedAnalysis(p) => p.record_list.len(),
            Self::Empty(_) => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Payload of a `tool` event, and of a `final` event with `result_type = tool`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolData {
    pub tool_name: ToolName,
    pub tool_output: ToolOutput,
}

impl ToolData {
    pub fn new(tool_name: ToolName, tool_output: ToolOutput) -> Self {
        Self { tool_name, tool_output }
    }
}
