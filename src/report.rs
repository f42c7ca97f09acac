use crate::{plan::ConversionJob, tool::ToolOutcome};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobReport {
    pub input: String,
    pub output: String,
    pub outcome: ToolOutcome,
}

impl JobReport {
    pub fn new(job: &ConversionJob, outcome: ToolOutcome) -> Self {
        Self {
            input: job.input.display().to_string(),
            output: job.output.display().to_string(),
            outcome,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    pub batch_id: String,
    pub input_dir: String,
    pub started: String,
    pub finished: String,
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub jobs: Vec<JobReport>,
}
