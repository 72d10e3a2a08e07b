//! Submission stage: one job request, optionally retried.
//!
//! The job (and its id) is built by the caller before this stage runs and is
//! only borrowed here, so every retry re-sends the identical payload and the
//! server sees the same id each time.

use crate::api::TranslationApi;
use crate::error::TranslateError;
use crate::job::TranslationJob;
use tokio::time::{sleep, Duration};
use tracing::{info, warn};

/// Submit `job`, retrying up to `retries` extra times on transient errors.
///
/// Backoff doubles from `backoff_ms`: 1 s → 2 s → 4 s with the default.
/// Permanent errors (4xx, bad body) are returned immediately.
pub async fn submit_job(
    api: &dyn TranslationApi,
    job: &TranslationJob,
    retries: u32,
    backoff_ms: u64,
) -> Result<String, TranslateError> {
    let mut attempt = 0u32;
    loop {
        match api.submit(job).await {
            Ok(job_id) => {
                info!("Translation job started with ID: {}", job_id);
                return Ok(job_id);
            }
            Err(e) if e.is_transient() && attempt < retries => {
                let backoff = backoff_ms.saturating_mul(2u64.saturating_pow(attempt));
                attempt += 1;
                warn!(
                    "Submit of job {} failed ({}); retry {}/{} after {}ms",
                    job.id, e, attempt, retries, backoff
                );
                sleep(Duration::from_millis(backoff)).await;
            }
            Err(e) => return Err(e),
        }
    }
}
