use crate::error::ConvertError;
use crate::normalize::NormalizeStats;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warning {
    pub code: String,
    pub message: String,
}

impl Warning {
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
        }
    }
}

impl From<&ConvertError> for Warning {
    fn from(err: &ConvertError) -> Self {
        Self::new(err.code(), err.to_string())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntityCounts {
    pub node_points: usize,
    pub sewer_nodes: usize,
    pub standard_shafts: usize,
    pub channels: usize,
    pub pipe_runs: usize,
}

/// Completeness color an authored entity was drawn with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityGrade {
    pub id: String,
    pub grade: String,
}

impl EntityGrade {
    pub fn new(id: &str, grade: &str) -> Self {
        Self {
            id: id.to_string(),
            grade: grade.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionReport {
    pub dialect: String,
    pub parsed: EntityCounts,
    pub shafts_authored: usize,
    pub runs_authored: usize,
    pub unprocessed_shafts: Vec<String>,
    pub unprocessed_runs: Vec<String>,
    pub consistency: NormalizeStats,
    pub shaft_grades: Vec<EntityGrade>,
    pub run_grades: Vec<EntityGrade>,
    pub warnings: Vec<Warning>,
}

/// Outcome of one input file of a batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileOutcome {
    pub input: String,
    pub output: Option<String>,
    pub error: Option<String>,
    pub report: Option<ConversionReport>,
}

impl FileOutcome {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchReport {
    pub converted: Vec<String>,
    pub failed: Vec<String>,
    pub files: Vec<FileOutcome>,
}

impl BatchReport {
    pub fn push(&mut self, outcome: FileOutcome) {
        match (&outcome.output, &outcome.error) {
            (Some(output), None) => self.converted.push(output.clone()),
            _ => self.failed.push(outcome.input.clone()),
        }
        self.files.push(outcome);
    }
}
