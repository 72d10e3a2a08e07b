//! End-to-end entry points: upload → submit → poll → download.
//!
//! [`translate_document`] wires the real S3 and HTTP clients from a
//! [`TranslationConfig`]. [`translate_with`] takes the two service seams as
//! trait objects, which is what tests (and callers with their own storage
//! client) use. [`resume_job`] / [`resume_with`] skip the first two steps
//! for a job id that was already submitted.

use crate::api::{HttpTranslationApi, TranslationApi};
use crate::auth;
use crate::config::TranslationConfig;
use crate::error::TranslateError;
use crate::job::TranslationJob;
use crate::output::{TranslationOutcome, TranslationReport};
use crate::pipeline::poll::{poll_until_terminal, PollOutcome};
use crate::pipeline::{download, submit, upload};
use crate::storage::{ObjectStore, S3Client};
use std::path::Path;
use std::time::Instant;
use tracing::info;

/// Translate a local document and write the result to `output_path`.
///
/// This is the primary entry point for the library.
///
/// # Returns
/// `Ok(TranslationReport)` once the job reaches a terminal state or the poll
/// policy's bound. A job the service reports as failed is a normal report
/// with [`TranslationOutcome::Failed`], not an error.
///
/// # Errors
/// Returns `Err(TranslateError)` for fatal conditions only: unreadable input,
/// storage failures, unexpected HTTP status codes, invalid configuration.
pub async fn translate_document(
    input_path: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
    config: &TranslationConfig,
) -> Result<TranslationReport, TranslateError> {
    let (store, api) = build_clients(config)?;
    translate_with(&store, &api, input_path, output_path, config).await
}

/// [`translate_document`] against caller-supplied service clients.
pub async fn translate_with(
    store: &dyn ObjectStore,
    api: &dyn TranslationApi,
    input_path: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
    config: &TranslationConfig,
) -> Result<TranslationReport, TranslateError> {
    let total_start = Instant::now();
    let input_path = input_path.as_ref();
    info!("Starting translation: {}", input_path.display());

    // ── Step 1: Upload ───────────────────────────────────────────────────
    let (source, size) = upload::upload_file(
        store,
        input_path,
        &config.storage.bucket,
        config.object_key.as_deref(),
    )
    .await?;
    if let Some(ref cb) = config.progress_callback {
        cb.on_upload_complete(&source, size);
    }

    // ── Step 2: Submit ───────────────────────────────────────────────────
    let job = TranslationJob::new(&source, &config.job);
    info!(
        "Submitting job {} ({} → {}, model {})",
        job.id, job.source_language, job.target_language, job.option.model
    );
    let job_id =
        submit::submit_job(api, &job, config.submit_retries, config.retry_backoff_ms).await?;
    if let Some(ref cb) = config.progress_callback {
        cb.on_job_submitted(&job_id);
    }

    // ── Steps 3 + 4: Poll, then download ─────────────────────────────────
    finish(store, api, job_id, Some(source), output_path.as_ref(), config, total_start).await
}

/// Poll an already-submitted job and download its result.
pub async fn resume_job(
    job_id: impl Into<String>,
    output_path: impl AsRef<Path>,
    config: &TranslationConfig,
) -> Result<TranslationReport, TranslateError> {
    let (store, api) = build_clients(config)?;
    resume_with(&store, &api, job_id, output_path, config).await
}

/// [`resume_job`] against caller-supplied service clients.
pub async fn resume_with(
    store: &dyn ObjectStore,
    api: &dyn TranslationApi,
    job_id: impl Into<String>,
    output_path: impl AsRef<Path>,
    config: &TranslationConfig,
) -> Result<TranslationReport, TranslateError> {
    let job_id = job_id.into();
    info!("Resuming translation job {}", job_id);
    finish(store, api, job_id, None, output_path.as_ref(), config, Instant::now()).await
}

/// Synchronous wrapper around [`translate_document`].
///
/// Creates a temporary tokio runtime internally.
pub fn translate_sync(
    input_path: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
    config: &TranslationConfig,
) -> Result<TranslationReport, TranslateError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| TranslateError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(translate_document(input_path, output_path, config))
}

// ── Internal helpers ─────────────────────────────────────────────────────

fn build_clients(
    config: &TranslationConfig,
) -> Result<(S3Client, HttpTranslationApi), TranslateError> {
    let store = S3Client::from_config(&config.storage, config.request_timeout_secs)?;
    let authenticator = auth::from_config(config)?;
    let api = HttpTranslationApi::new(
        config.api_endpoint.clone(),
        authenticator,
        config.request_timeout_secs,
    )?;
    Ok((store, api))
}

async fn finish(
    store: &dyn ObjectStore,
    api: &dyn TranslationApi,
    job_id: String,
    source: Option<crate::job::StorageLocation>,
    output_path: &Path,
    config: &TranslationConfig,
    total_start: Instant,
) -> Result<TranslationReport, TranslateError> {
    let polled = poll_until_terminal(
        api,
        &job_id,
        &config.poll,
        config.progress_callback.as_deref(),
    )
    .await?;
    let status_checks = polled.attempts();

    let outcome = match polled {
        PollOutcome::Succeeded { location, .. } => {
            let bytes = download::download_to_file(store, &location, output_path).await?;
            if let Some(ref cb) = config.progress_callback {
                cb.on_download_complete(output_path, bytes);
            }
            TranslationOutcome::Succeeded {
                result: location,
                output_path: output_path.to_path_buf(),
                bytes,
            }
        }
        PollOutcome::Failed { status, .. } => TranslationOutcome::Failed {
            status: status.status.to_string(),
            payload: status.raw,
        },
        PollOutcome::TimedOut {
            last_state,
            elapsed,
            ..
        } => TranslationOutcome::TimedOut {
            last_status: last_state.to_string(),
            elapsed_ms: elapsed.as_millis() as u64,
        },
    };

    let total_duration_ms = total_start.elapsed().as_millis() as u64;
    info!(
        "Job {} finished: {} after {} status checks, {}ms total",
        job_id,
        if outcome.is_success() { "succeeded" } else { "not succeeded" },
        status_checks,
        total_duration_ms
    );

    Ok(TranslationReport {
        job_id,
        source,
        outcome,
        status_checks,
        total_duration_ms,
    })
}
