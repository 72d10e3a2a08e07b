//! Result types returned by a translation run.

use crate::job::StorageLocation;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// How the run ended, once the pipeline got as far as polling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TranslationOutcome {
    /// The job succeeded and the translated document is on disk.
    Succeeded {
        result: StorageLocation,
        output_path: PathBuf,
        bytes: u64,
    },
    /// The service reported a terminal failure. `status` is the literal value.
    Failed {
        status: String,
        payload: serde_json::Value,
    },
    /// The poll policy's bound was reached while the job was still running.
    TimedOut { last_status: String, elapsed_ms: u64 },
}

impl TranslationOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, TranslationOutcome::Succeeded { .. })
    }
}

/// Summary of one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslationReport {
    /// Server-side job handle. Keep it to resume polling after a crash.
    pub job_id: String,
    /// Where the source document was uploaded. None when resuming a job.
    pub source: Option<StorageLocation>,
    pub outcome: TranslationOutcome,
    /// Number of status checks issued.
    pub status_checks: u32,
    pub total_duration_ms: u64,
}
