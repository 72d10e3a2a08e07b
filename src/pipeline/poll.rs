//! Polling stage: check job status until it reaches a terminal state.
//!
//! ## State machine
//!
//! ```text
//!            ┌─────────── wait interval ───────────┐
//!            ▼                                     │
//!  ──▶ GET status ──▶ CREATED / RUNNING ──────────┘
//!            │
//!            ├──▶ SUCCEEDED  → Succeeded { location }
//!            └──▶ anything else → Failed { literal status }
//! ```
//!
//! With no bounds in the [`PollPolicy`] the loop runs until the service
//! reports a terminal state. `max_attempts` and `timeout` cap it and yield
//! [`PollOutcome::TimedOut`] instead.
//!
//! Waiting uses `tokio::time`, so tests run against a paused clock.

use crate::api::TranslationApi;
use crate::config::PollPolicy;
use crate::error::TranslateError;
use crate::job::{JobState, JobStatus, StorageLocation};
use crate::progress::PipelineProgressCallback;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};

/// How a poll loop ended.
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    /// The job succeeded and the result is at `location`.
    Succeeded {
        status: JobStatus,
        location: StorageLocation,
        attempts: u32,
    },
    /// The service reported a terminal state other than `SUCCEEDED`.
    Failed { status: JobStatus, attempts: u32 },
    /// A bound in the poll policy was reached while the job was still running.
    TimedOut {
        last_state: JobState,
        attempts: u32,
        elapsed: Duration,
    },
}

impl PollOutcome {
    pub fn attempts(&self) -> u32 {
        match self {
            PollOutcome::Succeeded { attempts, .. }
            | PollOutcome::Failed { attempts, .. }
            | PollOutcome::TimedOut { attempts, .. } => *attempts,
        }
    }
}

/// Poll `job_id` according to `policy`.
///
/// # Errors
/// Any error from [`TranslationApi::status`] ends the loop immediately, as
/// does a `SUCCEEDED` response without a `location`.
pub async fn poll_until_terminal(
    api: &dyn TranslationApi,
    job_id: &str,
    policy: &PollPolicy,
    progress: Option<&dyn PipelineProgressCallback>,
) -> Result<PollOutcome, TranslateError> {
    let start = Instant::now();
    let mut attempts = 0u32;

    loop {
        attempts += 1;
        let status = api.status(job_id).await?;
        debug!("Job {} check #{}: {}", job_id, attempts, status.status);

        if let Some(cb) = progress {
            cb.on_status(job_id, attempts, &status.status);
        }

        match status.status {
            JobState::Succeeded => {
                let location =
                    status
                        .location
                        .clone()
                        .ok_or_else(|| TranslateError::InvalidResponse {
                            detail: format!(
                                "job {job_id} SUCCEEDED without a result location: {}",
                                status.raw
                            ),
                        })?;
                info!("Translation completed successfully: {}", location);
                return Ok(PollOutcome::Succeeded {
                    status,
                    location,
                    attempts,
                });
            }
            JobState::Created | JobState::Running => {
                if policy.max_attempts.is_some_and(|max| attempts >= max) {
                    warn!(
                        "Job {} still {} after {} checks; giving up",
                        job_id, status.status, attempts
                    );
                    return Ok(PollOutcome::TimedOut {
                        last_state: status.status,
                        attempts,
                        elapsed: start.elapsed(),
                    });
                }
                if let Some(timeout) = policy.timeout {
                    if start.elapsed() + policy.interval > timeout {
                        warn!(
                            "Job {} still {} at the {:?} deadline; giving up",
                            job_id, status.status, timeout
                        );
                        return Ok(PollOutcome::TimedOut {
                            last_state: status.status,
                            attempts,
                            elapsed: start.elapsed(),
                        });
                    }
                }
                info!(
                    "Translation is still in progress ({}). Waiting {:?}...",
                    status.status, policy.interval
                );
                sleep(policy.interval).await;
            }
            JobState::Other(ref literal) => {
                warn!("Translation failed with status: {}", literal);
                return Ok(PollOutcome::Failed { status, attempts });
            }
        }
    }
}
