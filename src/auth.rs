//! Authentication strategies for the translation API.
//!
//! The same API can sit behind a static bearer token or behind IAM auth
//! (SigV4-signed requests to a Lambda function URL). Rather than branching
//! at each call site, the HTTP client holds an `Arc<dyn Authenticator>` and
//! calls [`Authenticator::authorize`] on every fully-built request just
//! before sending it. Signing must happen last because the signature covers
//! the final URL, headers and body.

use crate::config::{AuthConfig, TranslationConfig};
use crate::error::TranslateError;
use chrono::{DateTime, Utc};
use reqwest::header::{HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use sigv4_signer::{sign, Credentials, SignableRequest, SigningParams};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Attaches credentials to an outgoing request.
pub trait Authenticator: Send + Sync + fmt::Debug {
    /// Mutate `request` so the API will accept it.
    fn authorize(&self, request: &mut reqwest::Request) -> Result<(), TranslateError>;

    /// Short name for logs.
    fn scheme(&self) -> &'static str;
}

/// Build the authenticator selected by `config.auth`.
pub fn from_config(config: &TranslationConfig) -> Result<Arc<dyn Authenticator>, TranslateError> {
    match config.auth {
        AuthConfig::Bearer { ref token } => Ok(Arc::new(BearerAuth::new(token.clone()))),
        AuthConfig::SigV4 { ref service } => {
            let s = &config.storage;
            if s.access_key_id.is_empty() || s.secret_access_key.is_empty() {
                return Err(TranslateError::InvalidConfig(
                    "SigV4 authentication needs an access key and secret key".into(),
                ));
            }
            Ok(Arc::new(SigV4Auth::new(
                Credentials::new(
                    s.access_key_id.clone(),
                    s.secret_access_key.clone(),
                    s.session_token.clone(),
                ),
                s.region.clone(),
                service.clone(),
            )))
        }
    }
}

// ── Bearer ───────────────────────────────────────────────────────────────

/// `Authorization: Bearer <token>`.
pub struct BearerAuth {
    token: String,
}

impl BearerAuth {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

impl fmt::Debug for BearerAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BearerAuth")
            .field("token", &"<redacted>")
            .finish()
    }
}

impl Authenticator for BearerAuth {
    fn authorize(&self, request: &mut reqwest::Request) -> Result<(), TranslateError> {
        let mut value = HeaderValue::from_str(&format!("Bearer {}", self.token)).map_err(|_| {
            TranslateError::InvalidConfig("Bearer token contains invalid header characters".into())
        })?;
        value.set_sensitive(true);
        request.headers_mut().insert(AUTHORIZATION, value);
        Ok(())
    }

    fn scheme(&self) -> &'static str {
        "bearer"
    }
}

// ── SigV4 ────────────────────────────────────────────────────────────────

/// AWS Signature Version 4 over method, URL, `content-type` and body.
#[derive(Debug)]
pub struct SigV4Auth {
    credentials: Credentials,
    region: String,
    service: String,
    s3: bool,
}

impl SigV4Auth {
    pub fn new(credentials: Credentials, region: impl Into<String>, service: impl Into<String>) -> Self {
        Self {
            credentials,
            region: region.into(),
            service: service.into(),
            s3: false,
        }
    }

    /// S3 flavour: single URI encoding plus a signed `x-amz-content-sha256`.
    pub fn for_s3(credentials: Credentials, region: impl Into<String>) -> Self {
        Self {
            s3: true,
            ..Self::new(credentials, region, "s3")
        }
    }

    /// Sign as of `time`. [`Authenticator::authorize`] uses the current time.
    pub fn authorize_at(
        &self,
        request: &mut reqwest::Request,
        time: DateTime<Utc>,
    ) -> Result<(), TranslateError> {
        let content_type = request
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let extra: Vec<(&str, &str)> = content_type
            .as_deref()
            .map(|ct| vec![("content-type", ct)])
            .unwrap_or_default();

        let payload: &[u8] = request.body().and_then(|b| b.as_bytes()).unwrap_or(&[]);
        let method = request.method().as_str().to_string();
        let url = request.url().clone();

        let signable = SignableRequest::new(&method, &url, &extra, payload);
        let params = if self.s3 {
            SigningParams::for_s3(&self.credentials, &self.region, time)
        } else {
            SigningParams::new(&self.credentials, &self.region, &self.service, time)
        };
        let signed = sign(&signable, &params)?;

        let headers = request.headers_mut();
        for (name, value) in signed.iter() {
            let mut value = HeaderValue::from_str(value)
                .map_err(|e| TranslateError::Internal(format!("signed header '{name}': {e}")))?;
            if name == "authorization" || name == "x-amz-security-token" {
                value.set_sensitive(true);
            }
            headers.insert(HeaderName::from_static(name), value);
        }
        debug!("Signed {} {} for service '{}'", method, url, self.service);
        Ok(())
    }
}

impl Authenticator for SigV4Auth {
    fn authorize(&self, request: &mut reqwest::Request) -> Result<(), TranslateError> {
        self.authorize_at(request, Utc::now())
    }

    fn scheme(&self) -> &'static str {
        "sigv4"
    }
}
