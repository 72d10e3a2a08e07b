//! Progress-callback trait for pipeline events.
//!
//! Inject an [`Arc<dyn PipelineProgressCallback>`] via
//! [`crate::config::TranslationConfigBuilder::progress_callback`] to receive
//! events as the run moves through upload, submission, polling and download.
//!
//! # Example
//!
//! ```rust
//! use doctrans::{JobState, PipelineProgressCallback, TranslationConfig};
//! use std::sync::{Arc, atomic::{AtomicU32, Ordering}};
//!
//! struct PollCounter {
//!     polls: AtomicU32,
//! }
//!
//! impl PipelineProgressCallback for PollCounter {
//!     fn on_status(&self, job_id: &str, attempt: u32, state: &JobState) {
//!         self.polls.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("{job_id}: check #{attempt} → {state}");
//!     }
//! }
//!
//! let config = TranslationConfig::builder()
//!     .bucket("b")
//!     .api_endpoint("https://api.example.com")
//!     .progress_callback(Arc::new(PollCounter { polls: AtomicU32::new(0) }))
//!     .build()
//!     .unwrap();
//! ```

use crate::job::{JobState, StorageLocation};
use std::path::Path;
use std::sync::Arc;

/// Called by the pipeline as it moves through each step.
///
/// All methods have default no-op implementations so callers only override
/// what they care about.
pub trait PipelineProgressCallback: Send + Sync {
    /// The source document is in the object store.
    fn on_upload_complete(&self, location: &StorageLocation, bytes: u64) {
        let _ = (location, bytes);
    }

    /// The API accepted the job.
    fn on_job_submitted(&self, job_id: &str) {
        let _ = job_id;
    }

    /// One status check returned.
    ///
    /// # Arguments
    /// * `job_id`  : the job handle being polled
    /// * `attempt` : 1-indexed status-check number
    /// * `state`   : the state the service reported
    fn on_status(&self, job_id: &str, attempt: u32, state: &JobState) {
        let _ = (job_id, attempt, state);
    }

    /// The translated document was written to disk.
    fn on_download_complete(&self, path: &Path, bytes: u64) {
        let _ = (path, bytes);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl PipelineProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::TranslationConfig`].
pub type ProgressCallback = Arc<dyn PipelineProgressCallback>;
