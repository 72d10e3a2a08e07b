//! Pipeline stages for a document translation run.
//!
//! Each submodule implements exactly one step, and each step talks to the
//! outside world only through the [`crate::storage::ObjectStore`] and
//! [`crate::api::TranslationApi`] traits, so every stage can be tested with
//! in-memory fakes.
//!
//! ## Data Flow
//!
//! ```text
//! upload ──▶ submit ──▶ poll ⟲ ──▶ download
//! (PutObject)  (POST 201)  (GET 201)   (GetObject)
//! ```
//!
//! 1. [`upload`]   : read the local file and put it in the bucket
//! 2. [`submit`]   : send the job request once (or with bounded retries,
//!    always under the same job id)
//! 3. [`poll`]     : check status every interval until terminal or bounded out
//! 4. [`download`] : stream the result object to a temp file, then rename

pub mod download;
pub mod poll;
pub mod submit;
pub mod upload;
