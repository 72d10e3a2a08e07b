//! In-memory fakes for the two service seams.

#![allow(dead_code)]

use async_trait::async_trait;
use bytes::Bytes;
use doctrans::{
    JobState, JobStatus, ObjectStore, ObjectStream, StorageLocation, TranslateError,
    TranslationApi, TranslationConfig, TranslationConfigBuilder, TranslationJob,
};
use futures::stream;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;

// ── Object store ─────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct MemoryStore {
    objects: Mutex<HashMap<StorageLocation, Vec<u8>>>,
    puts: AtomicUsize,
    gets: AtomicUsize,
}

impl MemoryStore {
    pub fn with_object(location: &StorageLocation, bytes: &[u8]) -> Self {
        let store = Self::default();
        store
            .objects
            .lock()
            .unwrap()
            .insert(location.clone(), bytes.to_vec());
        store
    }

    pub fn object(&self, location: &StorageLocation) -> Option<Vec<u8>> {
        self.objects.lock().unwrap().get(location).cloned()
    }

    pub fn puts(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }

    pub fn gets(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn put_object(
        &self,
        location: &StorageLocation,
        body: Vec<u8>,
        _content_type: &str,
    ) -> Result<(), TranslateError> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        self.objects.lock().unwrap().insert(location.clone(), body);
        Ok(())
    }

    async fn get_object(&self, location: &StorageLocation) -> Result<ObjectStream, TranslateError> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        let bytes = self
            .object(location)
            .ok_or_else(|| TranslateError::DownloadFailed {
                bucket: location.bucket.clone(),
                key: location.key.clone(),
                reason: "object not found (HTTP 404)".into(),
            })?;
        // Small chunks so the download loop runs more than once.
        let chunks: Vec<Result<Bytes, TranslateError>> = bytes
            .chunks(4)
            .map(|c| Ok(Bytes::copy_from_slice(c)))
            .collect();
        Ok(Box::pin(stream::iter(chunks)))
    }
}

// ── Translation API ──────────────────────────────────────────────────────────

/// Replays scripted responses. The last status repeats forever.
#[derive(Default)]
pub struct ScriptedApi {
    submit_replies: Mutex<VecDeque<Result<String, TranslateError>>>,
    statuses: Mutex<VecDeque<JobStatus>>,
    submitted: Mutex<Vec<TranslationJob>>,
    status_calls: Mutex<Vec<Instant>>,
}

impl ScriptedApi {
    pub fn with_statuses(statuses: Vec<JobStatus>) -> Self {
        Self {
            statuses: Mutex::new(statuses.into()),
            ..Self::default()
        }
    }

    pub fn push_submit_reply(&self, reply: Result<String, TranslateError>) {
        self.submit_replies.lock().unwrap().push_back(reply);
    }

    pub fn submitted(&self) -> Vec<TranslationJob> {
        self.submitted.lock().unwrap().clone()
    }

    pub fn status_calls(&self) -> Vec<Instant> {
        self.status_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl TranslationApi for ScriptedApi {
    async fn submit(&self, job: &TranslationJob) -> Result<String, TranslateError> {
        self.submitted.lock().unwrap().push(job.clone());
        match self.submit_replies.lock().unwrap().pop_front() {
            Some(reply) => reply,
            // The real service echoes the client-generated id.
            None => Ok(job.id.clone()),
        }
    }

    async fn status(&self, _job_id: &str) -> Result<JobStatus, TranslateError> {
        self.status_calls.lock().unwrap().push(Instant::now());
        let mut queue = self.statuses.lock().unwrap();
        if queue.len() > 1 {
            Ok(queue.pop_front().expect("non-empty"))
        } else {
            queue
                .front()
                .cloned()
                .ok_or_else(|| TranslateError::Internal("no scripted status".into()))
        }
    }
}

// ── Helpers ──────────────────────────────────────────────────────────────────

pub fn created() -> JobStatus {
    JobStatus::new(JobState::Created, None)
}

pub fn running() -> JobStatus {
    JobStatus::new(JobState::Running, None)
}

pub fn succeeded(location: &StorageLocation) -> JobStatus {
    JobStatus::new(JobState::Succeeded, Some(location.clone()))
}

pub fn other(literal: &str) -> JobStatus {
    let mut st = JobStatus::new(JobState::Other(literal.to_string()), None);
    st.raw = serde_json::json!({ "status": literal });
    st
}

pub fn config_builder(interval: Duration) -> TranslationConfigBuilder {
    TranslationConfig::builder()
        .bucket("core-bucket")
        .api_endpoint("https://api.invalid")
        .poll_interval(interval)
        .retry_backoff_ms(100)
}
