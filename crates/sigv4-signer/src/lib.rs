//! # sigv4-signer
//!
//! Header-based [AWS Signature Version 4] signing for plain HTTP clients,
//! so that callers talking to S3 or an IAM-authenticated Lambda function URL
//! do not need the full AWS SDK.
//!
//! ## How it works
//!
//! 1. Build the *canonical request*: method, canonical URI, sorted query,
//!    sorted lower-cased headers, signed-header list and payload hash.
//! 2. Build the *string to sign* from the timestamp, the credential scope
//!    (`{date}/{region}/{service}/aws4_request`) and the SHA-256 of step 1.
//! 3. Derive the signing key with the HMAC-SHA256 chain
//!    `secret → date → region → service → "aws4_request"`.
//! 4. Return the headers the caller must attach: `authorization`,
//!    `x-amz-date`, and optionally `x-amz-content-sha256` and
//!    `x-amz-security-token`.
//!
//! ## Usage
//!
//! ```rust
//! use sigv4_signer::{sign, Credentials, SignableRequest, SigningParams};
//!
//! let creds = Credentials::new("AKIDEXAMPLE", "secret", None);
//! let url = url::Url::parse("https://example.lambda-url.us-east-1.on.aws/api").unwrap();
//! let request = SignableRequest::new("POST", &url, &[], b"{}");
//! let params = SigningParams::new(&creds, "us-east-1", "lambda", chrono::Utc::now());
//! let signed = sign(&request, &params).unwrap();
//! assert!(signed.authorization().starts_with("AWS4-HMAC-SHA256 "));
//! ```
//!
//! [AWS Signature Version 4]: https://docs.aws.amazon.com/IAM/latest/UserGuide/reference_aws-signing.html

use std::fmt;

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use percent_encoding::{percent_decode_str, percent_encode, AsciiSet, NON_ALPHANUMERIC};
use sha2::{Digest, Sha256};
use thiserror::Error;
use url::Url;

// ── Public constants ─────────────────────────────────────────────────────────

/// Algorithm identifier placed at the start of the `authorization` header.
pub const ALGORITHM: &str = "AWS4-HMAC-SHA256";

/// Payload hash sent when the body is deliberately not signed (S3 only).
pub const UNSIGNED_PAYLOAD: &str = "UNSIGNED-PAYLOAD";

const AMZ_DATE_FORMAT: &str = "%Y%m%dT%H%M%SZ";
const DATE_STAMP_FORMAT: &str = "%Y%m%d";

type HmacSha256 = Hmac<Sha256>;

/// Everything except the RFC 3986 unreserved set is escaped.
const URI_ESCAPE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

// ── Error type ───────────────────────────────────────────────────────────────

/// Errors returned while signing a request.
#[derive(Error, Debug)]
pub enum SigningError {
    /// The URL has no host component, so no `host` header can be signed.
    #[error("Cannot sign request for '{url}': URL has no host")]
    MissingHost { url: String },

    /// A header value contains bytes that cannot be canonicalised.
    #[error("Header '{name}' has a non-ASCII value and cannot be signed")]
    InvalidHeaderValue { name: String },

    /// The HMAC implementation rejected the derived key.
    #[error("Invalid signing key: {0}")]
    InvalidKey(String),
}

// ── Inputs ───────────────────────────────────────────────────────────────────

/// Static AWS credentials.
#[derive(Clone)]
pub struct Credentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    /// Present when the credentials come from STS (temporary credentials).
    pub session_token: Option<String>,
}

impl Credentials {
    pub fn new(
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
        session_token: Option<String>,
    ) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            session_token,
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("session_token", &self.session_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Scope and behaviour of one signature.
#[derive(Debug, Clone)]
pub struct SigningParams<'a> {
    pub credentials: &'a Credentials,
    pub region: &'a str,
    pub service: &'a str,
    pub time: DateTime<Utc>,
    /// Attach (and sign) `x-amz-content-sha256`. Required by S3.
    pub content_sha256_header: bool,
    /// Percent-encode the already-encoded path a second time.
    ///
    /// Every service except S3 expects this.
    pub double_uri_encode: bool,
}

impl<'a> SigningParams<'a> {
    /// Parameters with the defaults used by most services (non-S3).
    pub fn new(
        credentials: &'a Credentials,
        region: &'a str,
        service: &'a str,
        time: DateTime<Utc>,
    ) -> Self {
        Self {
            credentials,
            region,
            service,
            time,
            content_sha256_header: false,
            double_uri_encode: true,
        }
    }

    /// Parameters for S3: single URI encoding and a signed `x-amz-content-sha256`.
    pub fn for_s3(credentials: &'a Credentials, region: &'a str, time: DateTime<Utc>) -> Self {
        Self {
            content_sha256_header: true,
            double_uri_encode: false,
            ..Self::new(credentials, region, "s3", time)
        }
    }
}

/// The parts of an HTTP request that participate in the signature.
#[derive(Debug, Clone)]
pub struct SignableRequest<'a> {
    pub method: &'a str,
    pub url: &'a Url,
    /// Extra headers to sign (e.g. `content-type`). `host` and the `x-amz-*`
    /// headers produced by the signer are added automatically.
    pub headers: &'a [(&'a str, &'a str)],
    pub payload: &'a [u8],
}

impl<'a> SignableRequest<'a> {
    pub fn new(
        method: &'a str,
        url: &'a Url,
        headers: &'a [(&'a str, &'a str)],
        payload: &'a [u8],
    ) -> Self {
        Self {
            method,
            url,
            headers,
            payload,
        }
    }
}

// ── Output ───────────────────────────────────────────────────────────────────

/// Headers produced by [`sign`] that must be attached to the outgoing request.
#[derive(Debug, Clone)]
pub struct SignedHeaders {
    headers: Vec<(&'static str, String)>,
    signature: String,
}

impl SignedHeaders {
    /// All headers in attach order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.headers.iter().map(|(k, v)| (*k, v.as_str()))
    }

    /// Value of the `authorization` header.
    pub fn authorization(&self) -> &str {
        self.headers
            .iter()
            .find(|(k, _)| *k == "authorization")
            .map(|(_, v)| v.as_str())
            .unwrap_or_default()
    }

    /// The hex-encoded signature alone.
    pub fn signature(&self) -> &str {
        &self.signature
    }
}

// ── Signing ──────────────────────────────────────────────────────────────────

/// Sign `request` and return the headers to attach.
pub fn sign(
    request: &SignableRequest<'_>,
    params: &SigningParams<'_>,
) -> Result<SignedHeaders, SigningError> {
    let amz_date = params.time.format(AMZ_DATE_FORMAT).to_string();
    let date_stamp = params.time.format(DATE_STAMP_FORMAT).to_string();
    let payload_hash = sha256_hex(request.payload);

    let host = host_header(request.url)?;

    // Lower-cased, trimmed, sorted by name.
    let mut headers: Vec<(String, String)> = Vec::with_capacity(request.headers.len() + 4);
    headers.push(("host".to_string(), host));
    headers.push(("x-amz-date".to_string(), amz_date.clone()));
    if params.content_sha256_header {
        headers.push(("x-amz-content-sha256".to_string(), payload_hash.clone()));
    }
    if let Some(ref token) = params.credentials.session_token {
        headers.push(("x-amz-security-token".to_string(), token.clone()));
    }
    for (name, value) in request.headers {
        if !value.is_ascii() {
            return Err(SigningError::InvalidHeaderValue {
                name: name.to_string(),
            });
        }
        headers.push((name.to_ascii_lowercase(), normalise_header_value(value)));
    }
    headers.sort_by(|a, b| a.0.cmp(&b.0));

    let canonical_headers: String = headers
        .iter()
        .map(|(k, v)| format!("{k}:{v}\n"))
        .collect();
    let signed_headers = headers
        .iter()
        .map(|(k, _)| k.as_str())
        .collect::<Vec<_>>()
        .join(";");

    let canonical_request = format!(
        "{}\n{}\n{}\n{}\n{}\n{}",
        request.method.to_ascii_uppercase(),
        canonical_uri(request.url, params.double_uri_encode),
        canonical_query(request.url),
        canonical_headers,
        signed_headers,
        payload_hash
    );

    let scope = format!(
        "{}/{}/{}/aws4_request",
        date_stamp, params.region, params.service
    );
    let string_to_sign = format!(
        "{ALGORITHM}\n{amz_date}\n{scope}\n{}",
        sha256_hex(canonical_request.as_bytes())
    );

    let key = derive_signing_key(
        &params.credentials.secret_access_key,
        &date_stamp,
        params.region,
        params.service,
    )?;
    let mut mac =
        HmacSha256::new_from_slice(&key).map_err(|e| SigningError::InvalidKey(e.to_string()))?;
    mac.update(string_to_sign.as_bytes());
    let signature = format!("{:x}", mac.finalize().into_bytes());

    let authorization = format!(
        "{ALGORITHM} Credential={}/{scope}, SignedHeaders={signed_headers}, Signature={signature}",
        params.credentials.access_key_id
    );

    let mut out: Vec<(&'static str, String)> = vec![
        ("authorization", authorization),
        ("x-amz-date", amz_date),
    ];
    if params.content_sha256_header {
        out.push(("x-amz-content-sha256", payload_hash));
    }
    if let Some(ref token) = params.credentials.session_token {
        out.push(("x-amz-security-token", token.clone()));
    }

    Ok(SignedHeaders {
        headers: out,
        signature,
    })
}

/// Derive the SigV4 signing key for one day/region/service scope.
pub fn derive_signing_key(
    secret_access_key: &str,
    date_stamp: &str,
    region: &str,
    service: &str,
) -> Result<Vec<u8>, SigningError> {
    let k_date = hmac_sha256(
        format!("AWS4{secret_access_key}").as_bytes(),
        date_stamp.as_bytes(),
    )?;
    let k_region = hmac_sha256(&k_date, region.as_bytes())?;
    let k_service = hmac_sha256(&k_region, service.as_bytes())?;
    hmac_sha256(&k_service, b"aws4_request")
}

/// Lower-case hex SHA-256 of `data`.
pub fn sha256_hex(data: &[u8]) -> String {
    format!("{:x}", Sha256::digest(data))
}

// ── Internal helpers ─────────────────────────────────────────────────────────

fn hmac_sha256(key: &[u8], data: &[u8]) -> Result<Vec<u8>, SigningError> {
    let mut mac =
        HmacSha256::new_from_slice(key).map_err(|e| SigningError::InvalidKey(e.to_string()))?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().to_vec())
}

/// `host[:port]`, omitting the port when it is the scheme default.
fn host_header(url: &Url) -> Result<String, SigningError> {
    let host = url.host_str().ok_or_else(|| SigningError::MissingHost {
        url: url.to_string(),
    })?;
    Ok(match url.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    })
}

/// Trim and collapse internal runs of spaces.
fn normalise_header_value(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn canonical_uri(url: &Url, double_encode: bool) -> String {
    let path = url.path();
    if path.is_empty() || path == "/" {
        return "/".to_string();
    }
    path.split('/')
        .map(|segment| {
            let raw: Vec<u8> = percent_decode_str(segment).collect();
            let once = uri_encode(&raw);
            if double_encode {
                uri_encode(once.as_bytes())
            } else {
                once
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}

fn canonical_query(url: &Url) -> String {
    let mut pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| (uri_encode(k.as_bytes()), uri_encode(v.as_bytes())))
        .collect();
    pairs.sort();
    pairs
        .into_iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&")
}

fn uri_encode(bytes: &[u8]) -> String {
    percent_encode(bytes, URI_ESCAPE).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const SECRET: &str = "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY";

    fn test_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2015, 8, 30, 12, 36, 0).unwrap()
    }

    #[test]
    fn get_vanilla_matches_aws_test_suite() {
        let creds = Credentials::new("AKIDEXAMPLE", SECRET, None);
        let url = Url::parse("https://example.amazonaws.com/").unwrap();
        let req = SignableRequest::new("GET", &url, &[], b"");
        let params = SigningParams::new(&creds, "us-east-1", "service", test_time());

        let signed = sign(&req, &params).unwrap();
        assert_eq!(
            signed.signature(),
            "5fa00fa31553b73ebf1942676e86291e8372ff2a2260956d9b8aae1d763fbf31"
        );
        assert_eq!(
            signed.authorization(),
            "AWS4-HMAC-SHA256 Credential=AKIDEXAMPLE/20150830/us-east-1/service/aws4_request, \
             SignedHeaders=host;x-amz-date, \
             Signature=5fa00fa31553b73ebf1942676e86291e8372ff2a2260956d9b8aae1d763fbf31"
        );
    }

    #[test]
    fn s3_params_sign_content_hash() {
        let creds = Credentials::new("AKID", SECRET, Some("token".into()));
        let url = Url::parse("https://bucket.s3.us-east-1.amazonaws.com/doc.pdf").unwrap();
        let req = SignableRequest::new("PUT", &url, &[], b"%PDF-1.4");
        let params = SigningParams::for_s3(&creds, "us-east-1", test_time());

        let signed = sign(&req, &params).unwrap();
        let names: Vec<&str> = signed.iter().map(|(k, _)| k).collect();
        assert_eq!(
            names,
            vec![
                "authorization",
                "x-amz-date",
                "x-amz-content-sha256",
                "x-amz-security-token"
            ]
        );
        assert!(signed.authorization().contains(
            "SignedHeaders=host;x-amz-content-sha256;x-amz-date;x-amz-security-token"
        ));
        assert!(signed.authorization().contains("/us-east-1/s3/aws4_request"));
    }

    #[test]
    fn empty_payload_hash() {
        assert_eq!(
            sha256_hex(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn extra_headers_are_lowercased_and_sorted() {
        let creds = Credentials::new("AKID", SECRET, None);
        let url = Url::parse("http://localhost:9000/api").unwrap();
        let headers = [("Content-Type", "application/json")];
        let req = SignableRequest::new("POST", &url, &headers, b"{}");
        let params = SigningParams::new(&creds, "us-east-1", "lambda", test_time());

        let signed = sign(&req, &params).unwrap();
        assert!(signed
            .authorization()
            .contains("SignedHeaders=content-type;host;x-amz-date"));
    }

    #[test]
    fn canonical_uri_encoding_modes() {
        let url = Url::parse("https://h/folder/my%20file.pdf").unwrap();
        assert_eq!(canonical_uri(&url, false), "/folder/my%20file.pdf");
        assert_eq!(canonical_uri(&url, true), "/folder/my%2520file.pdf");
    }

    #[test]
    fn uri_encode_keeps_only_unreserved() {
        assert_eq!(uri_encode(b"AZaz09-_.~"), "AZaz09-_.~");
        assert_eq!(uri_encode(b"a b/c+d=e*"), "a%20b%2Fc%2Bd%3De%2A");
        assert_eq!(uri_encode("é".as_bytes()), "%C3%A9");
    }

    #[test]
    fn sha256_hex_is_lowercase_digest() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn canonical_query_is_sorted() {
        let url = Url::parse("https://h/?b=2&a=1&a=0").unwrap();
        assert_eq!(canonical_query(&url), "a=0&a=1&b=2");
    }

    #[test]
    fn host_includes_non_default_port() {
        let url = Url::parse("http://127.0.0.1:8080/x").unwrap();
        assert_eq!(host_header(&url).unwrap(), "127.0.0.1:8080");
        let url = Url::parse("https://example.com:443/x").unwrap();
        assert_eq!(host_header(&url).unwrap(), "example.com");
    }

    #[test]
    fn non_ascii_header_value_rejected() {
        let creds = Credentials::new("AKID", SECRET, None);
        let url = Url::parse("https://h/").unwrap();
        let headers = [("x-custom", "héllo")];
        let req = SignableRequest::new("GET", &url, &headers, b"");
        let params = SigningParams::new(&creds, "us-east-1", "lambda", test_time());
        assert!(matches!(
            sign(&req, &params),
            Err(SigningError::InvalidHeaderValue { .. })
        ));
    }

    #[test]
    fn credentials_debug_redacts_secret() {
        let creds = Credentials::new("AKID", SECRET, Some("tok".into()));
        let dbg = format!("{creds:?}");
        assert!(!dbg.contains(SECRET));
        assert!(!dbg.contains("tok\""));
    }
}
