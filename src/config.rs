//! Configuration types for a translation run.
//!
//! Everything a run needs (credentials, endpoints, job options, poll policy)
//! lives in one [`TranslationConfig`] that is passed explicitly into each
//! component. Nothing in the library reads the process environment; the CLI
//! maps environment variables onto the builder.

use crate::error::TranslateError;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Region used when none is configured.
pub const DEFAULT_REGION: &str = "us-east-1";

/// Local file the translated document is written to when no output is given.
pub const DEFAULT_OUTPUT_PATH: &str = "translated_document.pdf";

/// Configuration for one upload → submit → poll → download run.
///
/// Built via [`TranslationConfig::builder()`].
///
/// # Example
/// ```rust
/// use doctrans::{AuthConfig, TranslationConfig};
/// use std::time::Duration;
///
/// let config = TranslationConfig::builder()
///     .bucket("inkcore-corebucket-xxxx")
///     .api_endpoint("https://xxxxx.lambda-url.us-east-1.on.aws")
///     .credentials("AKIA...", "secret")
///     .auth(AuthConfig::bearer("token"))
///     .target_language("ZH_CN")
///     .poll_interval(Duration::from_secs(5))
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct TranslationConfig {
    /// Object-store credentials, region, bucket and optional custom endpoint.
    pub storage: StorageConfig,

    /// Base URL of the translation API, without a trailing slash.
    pub api_endpoint: String,

    /// How requests to the translation API are authenticated.
    pub auth: AuthConfig,

    /// Languages, document type, model and glossary sent with the job.
    pub job: JobOptions,

    /// Poll interval and optional bounds.
    pub poll: PollPolicy,

    /// Object key for the upload. If None, the input file name is used.
    pub object_key: Option<String>,

    /// Extra submission attempts on transport errors / 5xx. Default: 0.
    ///
    /// Every attempt re-sends the same job id.
    pub submit_retries: u32,

    /// Initial retry delay in milliseconds (exponential backoff). Default: 1000.
    pub retry_backoff_ms: u64,

    /// Per-HTTP-request timeout in seconds. Default: 60.
    pub request_timeout_secs: u64,

    /// Receives per-step progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            storage: StorageConfig::default(),
            api_endpoint: String::new(),
            auth: AuthConfig::default(),
            job: JobOptions::default(),
            poll: PollPolicy::default(),
            object_key: None,
            submit_retries: 0,
            retry_backoff_ms: 1000,
            request_timeout_secs: 60,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for TranslationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TranslationConfig")
            .field("storage", &self.storage)
            .field("api_endpoint", &self.api_endpoint)
            .field("auth", &self.auth)
            .field("job", &self.job)
            .field("poll", &self.poll)
            .field("object_key", &self.object_key)
            .field("submit_retries", &self.submit_retries)
            .field("retry_backoff_ms", &self.retry_backoff_ms)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn PipelineProgressCallback>"),
            )
            .finish()
    }
}

impl TranslationConfig {
    /// Create a new builder for `TranslationConfig`.
    pub fn builder() -> TranslationConfigBuilder {
        TranslationConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`TranslationConfig`].
#[derive(Debug)]
pub struct TranslationConfigBuilder {
    config: TranslationConfig,
}

impl TranslationConfigBuilder {
    pub fn credentials(mut self, access_key_id: impl Into<String>, secret: impl Into<String>) -> Self {
        self.config.storage.access_key_id = access_key_id.into();
        self.config.storage.secret_access_key = secret.into();
        self
    }

    pub fn session_token(mut self, token: impl Into<String>) -> Self {
        self.config.storage.session_token = Some(token.into());
        self
    }

    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.config.storage.region = region.into();
        self
    }

    pub fn bucket(mut self, bucket: impl Into<String>) -> Self {
        self.config.storage.bucket = bucket.into();
        self
    }

    pub fn storage_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.config.storage.endpoint = Some(endpoint.into());
        self
    }

    pub fn api_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.config.api_endpoint = endpoint.into().trim_end_matches('/').to_string();
        self
    }

    pub fn auth(mut self, auth: AuthConfig) -> Self {
        self.config.auth = auth;
        self
    }

    pub fn source_language(mut self, code: impl Into<String>) -> Self {
        self.config.job.source_language = code.into();
        self
    }

    pub fn target_language(mut self, code: impl Into<String>) -> Self {
        self.config.job.target_language = code.into();
        self
    }

    pub fn document_type(mut self, tag: impl Into<String>) -> Self {
        self.config.job.document_type = tag.into();
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.job.model = model.into();
        self
    }

    pub fn glossaries(mut self, names: Vec<String>) -> Self {
        self.config.job.glossaries = names;
        self
    }

    pub fn use_aws_translate(mut self, v: bool) -> Self {
        self.config.job.use_aws_translate = v;
        self
    }

    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.config.poll.interval = interval;
        self
    }

    pub fn max_poll_attempts(mut self, n: u32) -> Self {
        self.config.poll.max_attempts = Some(n);
        self
    }

    pub fn poll_timeout(mut self, timeout: Duration) -> Self {
        self.config.poll.timeout = Some(timeout);
        self
    }

    pub fn object_key(mut self, key: impl Into<String>) -> Self {
        self.config.object_key = Some(key.into());
        self
    }

    pub fn submit_retries(mut self, n: u32) -> Self {
        self.config.submit_retries = n;
        self
    }

    pub fn retry_backoff_ms(mut self, ms: u64) -> Self {
        self.config.retry_backoff_ms = ms;
        self
    }

    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.config.request_timeout_secs = secs.max(1);
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<TranslationConfig, TranslateError> {
        let c = &self.config;
        if !(c.api_endpoint.starts_with("http://") || c.api_endpoint.starts_with("https://")) {
            return Err(TranslateError::InvalidConfig(format!(
                "API endpoint must be an http(s) URL, got '{}'",
                c.api_endpoint
            )));
        }
        if c.storage.region.trim().is_empty() {
            return Err(TranslateError::InvalidConfig("Region must not be empty".into()));
        }
        if c.poll.interval.is_zero() {
            return Err(TranslateError::InvalidConfig(
                "Poll interval must be greater than zero".into(),
            ));
        }
        if c.poll.max_attempts == Some(0) {
            return Err(TranslateError::InvalidConfig(
                "Max poll attempts must be ≥ 1".into(),
            ));
        }
        if let AuthConfig::Bearer { ref token } = c.auth {
            if token.trim().is_empty() {
                return Err(TranslateError::InvalidConfig(
                    "Bearer authentication selected but no token was provided".into(),
                ));
            }
        }
        Ok(self.config)
    }
}

// ── Sub-configs ──────────────────────────────────────────────────────────

/// Object-store connection settings.
#[derive(Clone)]
pub struct StorageConfig {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
    /// Default: `us-east-1`.
    pub region: String,
    /// Upload target. Only needed when a document is uploaded.
    pub bucket: String,
    /// Custom S3-compatible endpoint (MinIO, localstack). Uses path-style
    /// addressing. If None, the regional AWS endpoint with virtual-hosted
    /// addressing is used.
    pub endpoint: Option<String>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            access_key_id: String::new(),
            secret_access_key: String::new(),
            session_token: None,
            region: DEFAULT_REGION.to_string(),
            bucket: String::new(),
            endpoint: None,
        }
    }
}

impl fmt::Debug for StorageConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageConfig")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("session_token", &self.session_token.as_ref().map(|_| "<redacted>"))
            .field("region", &self.region)
            .field("bucket", &self.bucket)
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

/// Authentication strategy for the translation API.
#[derive(Clone, PartialEq, Eq)]
pub enum AuthConfig {
    /// Static `Authorization: Bearer <token>` header.
    Bearer { token: String },
    /// AWS SigV4 over each request, using the storage credentials and region.
    SigV4 { service: String },
}

impl AuthConfig {
    pub fn bearer(token: impl Into<String>) -> Self {
        AuthConfig::Bearer {
            token: token.into(),
        }
    }

    /// SigV4 for an IAM-authenticated Lambda function URL.
    pub fn sigv4_lambda() -> Self {
        AuthConfig::SigV4 {
            service: "lambda".to_string(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        AuthConfig::sigv4_lambda()
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthConfig::Bearer { .. } => f
                .debug_struct("Bearer")
                .field("token", &"<redacted>")
                .finish(),
            AuthConfig::SigV4 { service } => {
                f.debug_struct("SigV4").field("service", service).finish()
            }
        }
    }
}

/// Per-job options sent in the submission payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobOptions {
    /// Default: `EN_US`.
    pub source_language: String,
    /// Default: `ZH_CN`.
    pub target_language: String,
    /// Default: `PDF`.
    pub document_type: String,
    /// Default: `CLAUDE_3_SONNET`.
    pub model: String,
    /// Glossary names, passed through verbatim. Default: empty.
    pub glossaries: Vec<String>,
    /// Allow the service to fall back to its generic MT provider. Default: true.
    pub use_aws_translate: bool,
}

impl Default for JobOptions {
    fn default() -> Self {
        Self {
            source_language: "EN_US".to_string(),
            target_language: "ZH_CN".to_string(),
            document_type: "PDF".to_string(),
            model: "CLAUDE_3_SONNET".to_string(),
            glossaries: Vec::new(),
            use_aws_translate: true,
        }
    }
}

/// How the status poller paces and bounds itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Wait between non-terminal checks. Default: 10 s.
    pub interval: Duration,
    /// Give up after this many status checks. Default: unbounded.
    pub max_attempts: Option<u32>,
    /// Give up once this much time has passed since the first check.
    /// Default: unbounded.
    pub timeout: Option<Duration>,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(10),
            max_attempts: None,
            timeout: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> TranslationConfigBuilder {
        TranslationConfig::builder()
            .bucket("b")
            .api_endpoint("https://api.example.com/")
    }

    #[test]
    fn defaults() {
        let c = base().build().unwrap();
        assert_eq!(c.storage.region, "us-east-1");
        assert_eq!(c.poll.interval, Duration::from_secs(10));
        assert_eq!(c.poll.max_attempts, None);
        assert_eq!(c.submit_retries, 0);
        assert_eq!(c.job, JobOptions::default());
        assert_eq!(c.auth, AuthConfig::sigv4_lambda());
    }

    #[test]
    fn endpoint_trailing_slash_trimmed() {
        let c = base().build().unwrap();
        assert_eq!(c.api_endpoint, "https://api.example.com");
    }

    #[test]
    fn bucket_is_optional_at_build() {
        // Resuming a job never uploads, so no bucket is needed.
        let c = TranslationConfig::builder()
            .api_endpoint("https://api.example.com")
            .build()
            .unwrap();
        assert!(c.storage.bucket.is_empty());
    }

    #[test]
    fn non_http_endpoint_rejected() {
        let err = TranslationConfig::builder()
            .bucket("b")
            .api_endpoint("api.example.com")
            .build()
            .unwrap_err();
        assert!(matches!(err, TranslateError::InvalidConfig(_)));
    }

    #[test]
    fn zero_interval_and_zero_attempts_rejected() {
        assert!(base().poll_interval(Duration::ZERO).build().is_err());
        assert!(base().max_poll_attempts(0).build().is_err());
    }

    #[test]
    fn empty_bearer_token_rejected() {
        assert!(base().auth(AuthConfig::bearer("  ")).build().is_err());
        assert!(base().auth(AuthConfig::bearer("tok")).build().is_ok());
    }

    #[test]
    fn debug_redacts_secrets() {
        let c = base()
            .credentials("AKIAEXAMPLE", "super-secret")
            .session_token("session-tok")
            .auth(AuthConfig::bearer("bearer-tok"))
            .build()
            .unwrap();
        let dbg = format!("{c:?}");
        assert!(dbg.contains("AKIAEXAMPLE"));
        assert!(!dbg.contains("super-secret"));
        assert!(!dbg.contains("session-tok"));
        assert!(!dbg.contains("bearer-tok"));
    }
}
