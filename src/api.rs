//! Translation API client.
//!
//! Two endpoints, both under [`TRANSLATE_DOCUMENT_PATH`]:
//!
//! | Call | Request | Success |
//! |------|---------|---------|
//! | submit | `POST {endpoint}/api/v1/generation/translate/document` | `201` + `{"id": …}` |
//! | status | `GET  {endpoint}/api/v1/generation/translate/document/{id}` | `201` + `{"status": …, "location": …}` |
//!
//! The status endpoint answers a read with `201 Created`. That is how the
//! deployed service behaves, so it is the only code accepted here; any other
//! status (including `200`) is surfaced with its body.

use crate::auth::Authenticator;
use crate::error::TranslateError;
use crate::job::{JobStatus, TranslationJob};
use async_trait::async_trait;
use reqwest::header::{HeaderValue, CONTENT_TYPE};
use reqwest::{Method, StatusCode, Url};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Path of the document-translation resource.
pub const TRANSLATE_DOCUMENT_PATH: &str = "/api/v1/generation/translate/document";

/// Status code that signals success on both endpoints.
pub const SUCCESS_STATUS: StatusCode = StatusCode::CREATED;

/// Operations the pipeline needs from the translation service.
#[async_trait]
pub trait TranslationApi: Send + Sync {
    /// Submit `job`; returns the job handle from the response `id`.
    async fn submit(&self, job: &TranslationJob) -> Result<String, TranslateError>;

    /// Fetch the current status snapshot of `job_id`.
    async fn status(&self, job_id: &str) -> Result<JobStatus, TranslateError>;
}

#[derive(Debug, Deserialize)]
struct SubmitResponse {
    id: String,
}

/// reqwest-backed [`TranslationApi`].
#[derive(Debug)]
pub struct HttpTranslationApi {
    http: reqwest::Client,
    endpoint: String,
    auth: Arc<dyn Authenticator>,
}

impl HttpTranslationApi {
    pub fn new(
        endpoint: impl Into<String>,
        auth: Arc<dyn Authenticator>,
        timeout_secs: u64,
    ) -> Result<Self, TranslateError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| TranslateError::Internal(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            http,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            auth,
        })
    }

    fn resource_url(&self, job_id: Option<&str>) -> Result<Url, TranslateError> {
        let base = format!("{}{}", self.endpoint, TRANSLATE_DOCUMENT_PATH);
        let mut url = Url::parse(&base).map_err(|e| {
            TranslateError::InvalidConfig(format!("Invalid API endpoint '{}': {e}", self.endpoint))
        })?;
        if let Some(id) = job_id {
            url.path_segments_mut()
                .map_err(|_| TranslateError::InvalidConfig("API endpoint cannot be a base URL".into()))?
                .push(id);
        }
        Ok(url)
    }

    /// Authorize and send; returns status code and body text.
    async fn send(&self, mut request: reqwest::Request) -> Result<(StatusCode, String), TranslateError> {
        let url = request.url().to_string();
        self.auth.authorize(&mut request)?;
        debug!("{} {} ({} auth)", request.method(), url, self.auth.scheme());

        let response = self
            .http
            .execute(request)
            .await
            .map_err(|e| TranslateError::Transport {
                url: url.clone(),
                reason: e.to_string(),
            })?;
        let status = response.status();
        let body = response.text().await.map_err(|e| TranslateError::Transport {
            url,
            reason: format!("reading body: {e}"),
        })?;
        Ok((status, body))
    }
}

#[async_trait]
impl TranslationApi for HttpTranslationApi {
    async fn submit(&self, job: &TranslationJob) -> Result<String, TranslateError> {
        let payload = serde_json::to_vec(job)
            .map_err(|e| TranslateError::Internal(format!("serialising job: {e}")))?;

        let mut request = reqwest::Request::new(Method::POST, self.resource_url(None)?);
        request
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        *request.body_mut() = Some(reqwest::Body::from(payload));

        let (status, body) = self.send(request).await?;
        if status != SUCCESS_STATUS {
            return Err(TranslateError::SubmitRejected {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: SubmitResponse =
            serde_json::from_str(&body).map_err(|e| TranslateError::InvalidResponse {
                detail: format!("submit response has no 'id' ({e}): {body}"),
            })?;
        Ok(parsed.id)
    }

    async fn status(&self, job_id: &str) -> Result<JobStatus, TranslateError> {
        let request = reqwest::Request::new(Method::GET, self.resource_url(Some(job_id))?);

        let (status, body) = self.send(request).await?;
        if status != SUCCESS_STATUS {
            return Err(TranslateError::StatusRejected {
                job_id: job_id.to_string(),
                status: status.as_u16(),
                body,
            });
        }
        JobStatus::from_json(&body)
    }
}
