pub mod external;

use crate::plan::ConversionJob;
use anyhow::Result;
use serde::{Deserialize, Serialize};

pub use external::ExternalTool;

/// Seam between the batch driver and the external converter, so the driver
/// can be exercised without spawning processes.
pub trait Converter {
    fn doctor(&self) -> Result<ToolDiag>;
    fn convert(&self, job: &ConversionJob) -> ToolOutcome;
}

/// Typed result of one external invocation. Launch failures and non-zero
/// exits are data, not errors; the caller picks the abort-vs-continue policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ToolOutcome {
    Completed,
    ExitedNonZero {
        code: Option<i32>,
        stderr: String,
    },
    TimedOut {
        seconds: u64,
    },
    LaunchFailed {
        error: String,
    },
}

impl ToolOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ToolOutcome::Completed)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDiag {
    pub tool: String,
    pub exists: bool,
    pub is_file: bool,
    pub executable: Option<bool>,
    pub ok: bool,
}
