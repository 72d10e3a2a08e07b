//! Object-store access: the [`ObjectStore`] seam and its S3 implementation.
//!
//! The pipeline only ever needs two operations, `PutObject` and `GetObject`,
//! so the trait is deliberately that small. [`S3Client`] speaks the S3 REST
//! API directly over reqwest with SigV4 signing, which also makes it work
//! against S3-compatible servers (MinIO, localstack) through a custom
//! endpoint.
//!
//! Downloads are exposed as an [`ObjectStream`] so large results are written
//! to disk chunk by chunk instead of being buffered whole.

use crate::auth::{Authenticator, SigV4Auth};
use crate::config::StorageConfig;
use crate::error::TranslateError;
use crate::job::StorageLocation;
use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{Stream, StreamExt};
use reqwest::header::{HeaderValue, CONTENT_TYPE};
use reqwest::{Method, Url};
use sigv4_signer::Credentials;
use std::pin::Pin;
use std::time::Duration;
use tracing::{debug, info};

/// A boxed stream of object body chunks.
pub type ObjectStream = Pin<Box<dyn Stream<Item = Result<Bytes, TranslateError>> + Send>>;

/// Storage operations the pipeline needs.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Write `body` at `location`, replacing any existing object.
    async fn put_object(
        &self,
        location: &StorageLocation,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<(), TranslateError>;

    /// Read the object at `location` as a stream of chunks.
    async fn get_object(&self, location: &StorageLocation) -> Result<ObjectStream, TranslateError>;
}

// ── S3 ───────────────────────────────────────────────────────────────────

/// S3 REST client with header-based SigV4.
#[derive(Debug)]
pub struct S3Client {
    http: reqwest::Client,
    signer: SigV4Auth,
    region: String,
    endpoint: Option<Url>,
}

impl S3Client {
    /// Build a client from storage settings.
    pub fn from_config(storage: &StorageConfig, timeout_secs: u64) -> Result<Self, TranslateError> {
        if storage.access_key_id.is_empty() || storage.secret_access_key.is_empty() {
            return Err(TranslateError::InvalidConfig(
                "Object storage needs an access key and secret key".into(),
            ));
        }

        let endpoint = match storage.endpoint {
            Some(ref e) => Some(Url::parse(e).map_err(|err| {
                TranslateError::InvalidConfig(format!("Invalid storage endpoint '{e}': {err}"))
            })?),
            None => None,
        };

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| TranslateError::Internal(format!("Failed to build HTTP client: {e}")))?;

        let credentials = Credentials::new(
            storage.access_key_id.clone(),
            storage.secret_access_key.clone(),
            storage.session_token.clone(),
        );

        Ok(Self {
            http,
            signer: SigV4Auth::for_s3(credentials, storage.region.clone()),
            region: storage.region.clone(),
            endpoint,
        })
    }

    /// Resolve the HTTPS URL of an object.
    ///
    /// With a custom endpoint: path style, `{endpoint}/{bucket}/{key}`.
    /// Otherwise: virtual-hosted, `https://{bucket}.s3.{region}.amazonaws.com/{key}`.
    pub fn object_url(&self, location: &StorageLocation) -> Result<Url, TranslateError> {
        let (mut url, prefix) = match self.endpoint {
            Some(ref e) => (e.clone(), Some(location.bucket.as_str())),
            None => {
                let host = format!(
                    "https://{}.s3.{}.amazonaws.com/",
                    location.bucket, self.region
                );
                let url = Url::parse(&host).map_err(|_| TranslateError::InvalidLocation {
                    input: location.to_string(),
                })?;
                (url, None)
            }
        };

        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| TranslateError::InvalidConfig("Storage endpoint cannot be a base URL".into()))?;
            segments.pop_if_empty();
            if let Some(bucket) = prefix {
                segments.push(bucket);
            }
            segments.extend(location.key.split('/'));
        }
        Ok(url)
    }

    fn signed_request(
        &self,
        method: Method,
        url: Url,
        body: Option<(Vec<u8>, &str)>,
    ) -> Result<reqwest::Request, TranslateError> {
        let mut request = reqwest::Request::new(method, url);
        if let Some((bytes, content_type)) = body {
            let ct = HeaderValue::from_str(content_type).map_err(|_| {
                TranslateError::Internal(format!("invalid content type '{content_type}'"))
            })?;
            request.headers_mut().insert(CONTENT_TYPE, ct);
            *request.body_mut() = Some(reqwest::Body::from(bytes));
        }
        self.signer.authorize(&mut request)?;
        Ok(request)
    }
}

#[async_trait]
impl ObjectStore for S3Client {
    async fn put_object(
        &self,
        location: &StorageLocation,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<(), TranslateError> {
        let upload_err = |reason: String| TranslateError::UploadFailed {
            bucket: location.bucket.clone(),
            key: location.key.clone(),
            reason,
        };

        let size = body.len();
        let url = self.object_url(location)?;
        debug!("PUT {} ({} bytes)", url, size);
        let request = self.signed_request(Method::PUT, url, Some((body, content_type)))?;

        let response = self
            .http
            .execute(request)
            .await
            .map_err(|e| upload_err(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(upload_err(format!("HTTP {status}: {text}")));
        }

        info!("Uploaded {} bytes to {}", size, location);
        Ok(())
    }

    async fn get_object(&self, location: &StorageLocation) -> Result<ObjectStream, TranslateError> {
        let bucket = location.bucket.clone();
        let key = location.key.clone();
        let download_err = {
            let (bucket, key) = (bucket.clone(), key.clone());
            move |reason: String| TranslateError::DownloadFailed {
                bucket: bucket.clone(),
                key: key.clone(),
                reason,
            }
        };

        let url = self.object_url(location)?;
        debug!("GET {}", url);
        let request = self.signed_request(Method::GET, url, None)?;

        let response = self
            .http
            .execute(request)
            .await
            .map_err(|e| download_err(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(download_err("object not found (HTTP 404)".to_string()));
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(download_err(format!("HTTP {status}: {text}")));
        }

        let stream = response.bytes_stream().map(move |chunk| {
            chunk.map_err(|e| TranslateError::DownloadFailed {
                bucket: bucket.clone(),
                key: key.clone(),
                reason: e.to_string(),
            })
        });
        Ok(Box::pin(stream))
    }
}
