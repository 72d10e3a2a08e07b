//! # doctrans
//!
//! Translate PDF documents through a hosted document-translation service
//! that reads its input from, and writes its output to, an S3 bucket.
//!
//! ## Pipeline Overview
//!
//! ```text
//! local PDF
//!  │
//!  ├─ 1. Upload    PutObject → s3://bucket/key
//!  ├─ 2. Submit    POST /api/v1/generation/translate/document   (201 + id)
//!  ├─ 3. Poll      GET  /api/v1/generation/translate/document/{id} every interval
//!  │               CREATED / RUNNING → wait · SUCCEEDED → 4 · anything else → failed
//!  └─ 4. Download  GetObject(result location) → translated_document.pdf
//! ```
//!
//! Steps run strictly in order; nothing is concurrent.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use doctrans::{translate_document, AuthConfig, TranslationConfig, TranslationOutcome};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = TranslationConfig::builder()
//!         .credentials("AKIA...", "secret")
//!         .bucket("inkcore-corebucket-xxxx")
//!         .api_endpoint("https://xxxxx.lambda-url.us-east-1.on.aws")
//!         .auth(AuthConfig::sigv4_lambda())
//!         .build()?;
//!
//!     let report = translate_document("en_500.pdf", "translated_document.pdf", &config).await?;
//!     match report.outcome {
//!         TranslationOutcome::Succeeded { output_path, .. } => {
//!             println!("wrote {}", output_path.display())
//!         }
//!         other => eprintln!("job {} did not succeed: {:?}", report.job_id, other),
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Authentication
//!
//! | [`AuthConfig`] | Header |
//! |----------------|--------|
//! | `Bearer { token }` | `Authorization: Bearer <token>` |
//! | `SigV4 { service }` | AWS SigV4 with the storage credentials (default service `lambda`) |
//!
//! Object-store requests are always SigV4-signed for service `s3`.
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `doctrans` binary (clap + anyhow + tracing-subscriber) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod job;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod storage;
pub mod translate;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use api::{HttpTranslationApi, TranslationApi};
pub use auth::{Authenticator, BearerAuth, SigV4Auth};
pub use config::{
    AuthConfig, JobOptions, PollPolicy, StorageConfig, TranslationConfig,
    TranslationConfigBuilder, DEFAULT_OUTPUT_PATH, DEFAULT_REGION,
};
pub use error::TranslateError;
pub use job::{JobState, JobStatus, StorageLocation, TranslationJob};
pub use output::{TranslationOutcome, TranslationReport};
pub use pipeline::poll::PollOutcome;
pub use progress::{NoopProgressCallback, PipelineProgressCallback, ProgressCallback};
pub use storage::{ObjectStore, ObjectStream, S3Client};
pub use translate::{resume_job, resume_with, translate_document, translate_sync, translate_with};
