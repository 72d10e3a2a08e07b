//! Error types for the doctrans library.
//!
//! Only *fatal* conditions are errors here: the pipeline cannot continue and
//! the run ends (missing input file, storage credentials rejected, the API
//! answered with an unexpected HTTP status).
//!
//! A job that the remote service reports as failed, or a poll loop that hits
//! its attempt/deadline bound, is **not** an error. Those are ordinary
//! outcomes reported through [`crate::output::TranslationOutcome`] so callers
//! can distinguish "the service said no" from "we could not talk to it".

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the doctrans library.
#[derive(Debug, Error)]
pub enum TranslateError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("Input file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// Any other failure reading the input (a directory, an I/O error).
    #[error("Failed to read input file '{path}': {source}")]
    InputReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A storage location string is not of the form `s3://bucket/key`.
    #[error("Invalid storage location '{input}': expected s3://<bucket>/<key>")]
    InvalidLocation { input: String },

    // ── Storage errors ────────────────────────────────────────────────────
    /// PutObject failed (transport, credentials, or a non-2xx response).
    #[error("Failed to upload to s3://{bucket}/{key}: {reason}")]
    UploadFailed {
        bucket: String,
        key: String,
        reason: String,
    },

    /// GetObject failed (missing object, credentials, transport).
    #[error("Failed to download s3://{bucket}/{key}: {reason}")]
    DownloadFailed {
        bucket: String,
        key: String,
        reason: String,
    },

    // ── Translation API errors ────────────────────────────────────────────
    /// Job submission returned something other than `201 Created`.
    #[error("Failed to start translation job (HTTP {status}): {body}")]
    SubmitRejected { status: u16, body: String },

    /// The status endpoint returned an unexpected HTTP status.
    #[error("Failed to check translation status for job {job_id} (HTTP {status}): {body}")]
    StatusRejected {
        job_id: String,
        status: u16,
        body: String,
    },

    /// The request never produced an HTTP response (DNS, TLS, connect, timeout).
    #[error("Request to '{url}' failed: {reason}")]
    Transport { url: String, reason: String },

    /// The API answered with a success code but the body was not usable.
    #[error("Unexpected response from translation API: {detail}")]
    InvalidResponse { detail: String },

    /// Signing a request failed.
    #[error("Failed to sign request: {0}")]
    Signing(#[from] sigv4_signer::SigningError),

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the translated output file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl TranslateError {
    /// Whether a retry of the same request could plausibly succeed.
    ///
    /// Only transport failures and 5xx answers qualify; everything else is a
    /// permanent condition (bad credentials, bad request, missing file).
    pub fn is_transient(&self) -> bool {
        match self {
            TranslateError::Transport { .. } => true,
            TranslateError::SubmitRejected { status, .. }
            | TranslateError::StatusRejected { status, .. } => *status >= 500,
            _ => false,
        }
    }
}
