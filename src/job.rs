//! Wire types for the translation API and object-store locations.
//!
//! [`TranslationJob`] is what we send; [`JobStatus`] is what we read back
//! while polling. Both mirror the JSON shapes of the remote service exactly
//! (camelCase, nested `option` block), so serde derives are the whole codec.

use crate::config::JobOptions;
use crate::error::TranslateError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ── StorageLocation ──────────────────────────────────────────────────────

/// A bucket/key pair identifying one object in the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StorageLocation {
    pub bucket: String,
    pub key: String,
}

impl StorageLocation {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }
}

impl fmt::Display for StorageLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s3://{}/{}", self.bucket, self.key)
    }
}

impl FromStr for StorageLocation {
    type Err = TranslateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || TranslateError::InvalidLocation {
            input: s.to_string(),
        };
        let rest = s.strip_prefix("s3://").ok_or_else(invalid)?;
        let (bucket, key) = rest.split_once('/').ok_or_else(invalid)?;
        if bucket.is_empty() || key.is_empty() {
            return Err(invalid());
        }
        Ok(Self::new(bucket, key))
    }
}

// ── TranslationJob ───────────────────────────────────────────────────────

/// Request body for `POST /api/v1/generation/translate/document`.
///
/// The `id` is generated once in [`TranslationJob::new`] and never changes,
/// so a retried submission carries the same id and the server can deduplicate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationJob {
    pub id: String,
    /// Source document as `s3://bucket/key` ([`StorageLocation`]'s `Display`).
    pub url: String,
    pub source_language: String,
    pub target_language: String,
    pub document_type: String,
    pub option: ModelOptions,
}

/// The nested `option` block of a job request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelOptions {
    pub model: String,
    pub glossaries: Vec<String>,
    /// Fall back to the generic machine-translation provider.
    pub use_aws_translate: bool,
}

impl TranslationJob {
    /// Build a job for `source` with a freshly generated UUID v4.
    pub fn new(source: &StorageLocation, options: &JobOptions) -> Self {
        Self::with_id(uuid::Uuid::new_v4().to_string(), source, options)
    }

    /// Build a job with a caller-chosen id.
    pub fn with_id(id: impl Into<String>, source: &StorageLocation, options: &JobOptions) -> Self {
        Self {
            id: id.into(),
            url: source.to_string(),
            source_language: options.source_language.clone(),
            target_language: options.target_language.clone(),
            document_type: options.document_type.clone(),
            option: ModelOptions {
                model: options.model.clone(),
                glossaries: options.glossaries.clone(),
                use_aws_translate: options.use_aws_translate,
            },
        }
    }
}

// ── JobState / JobStatus ─────────────────────────────────────────────────

/// Lifecycle state reported by the service.
///
/// Only `CREATED` and `RUNNING` are non-terminal. Anything the client does
/// not recognise (including `FAILED`) lands in [`JobState::Other`] and is
/// treated as a terminal failure with the literal value preserved.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum JobState {
    Created,
    Running,
    Succeeded,
    Other(String),
}

impl JobState {
    pub fn as_str(&self) -> &str {
        match self {
            JobState::Created => "CREATED",
            JobState::Running => "RUNNING",
            JobState::Succeeded => "SUCCEEDED",
            JobState::Other(s) => s,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, JobState::Created | JobState::Running)
    }
}

impl From<String> for JobState {
    fn from(s: String) -> Self {
        match s.as_str() {
            "CREATED" => JobState::Created,
            "RUNNING" => JobState::Running,
            "SUCCEEDED" => JobState::Succeeded,
            _ => JobState::Other(s),
        }
    }
}

impl From<JobState> for String {
    fn from(state: JobState) -> Self {
        state.as_str().to_string()
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One snapshot of a job, as returned by the status endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobStatus {
    #[serde(default)]
    pub id: Option<String>,
    pub status: JobState,
    /// Present only once the job has `SUCCEEDED`.
    #[serde(default)]
    pub location: Option<StorageLocation>,
    /// The full response body, kept for diagnostics.
    #[serde(skip)]
    pub raw: serde_json::Value,
}

impl JobStatus {
    /// Decode a status response body, keeping the raw JSON alongside.
    pub fn from_json(body: &str) -> Result<Self, TranslateError> {
        let raw: serde_json::Value =
            serde_json::from_str(body).map_err(|e| TranslateError::InvalidResponse {
                detail: format!("status body is not JSON ({e}): {body}"),
            })?;
        let mut status: JobStatus =
            serde_json::from_value(raw.clone()).map_err(|e| TranslateError::InvalidResponse {
                detail: format!("status body has no usable 'status' field ({e}): {body}"),
            })?;
        status.raw = raw;
        Ok(status)
    }

    /// Convenience constructor used by mocks and tests.
    pub fn new(status: JobState, location: Option<StorageLocation>) -> Self {
        Self {
            id: None,
            status,
            location,
            raw: serde_json::Value::Null,
        }
    }
}
