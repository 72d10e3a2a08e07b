//! The real reqwest clients against loopback axum servers.

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use doctrans::{
    translate_document, AuthConfig, BearerAuth, HttpTranslationApi, JobOptions, JobState,
    ObjectStore, S3Client, StorageLocation, TranslateError, TranslationApi, TranslationConfig,
    TranslationJob, TranslationOutcome,
};
use futures::TryStreamExt;
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

// ── Mock translation service ─────────────────────────────────────────────────

#[derive(Default)]
struct ApiState {
    submit_reply: Mutex<Option<(u16, String)>>,
    statuses: Mutex<VecDeque<(u16, String)>>,
    authorizations: Mutex<Vec<String>>,
    submitted: Mutex<Vec<Value>>,
    polled_ids: Mutex<Vec<String>>,
}

impl ApiState {
    fn record_auth(&self, headers: &HeaderMap) {
        let value = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        self.authorizations.lock().unwrap().push(value);
    }
}

fn reply(code: u16, body: String) -> (StatusCode, String) {
    (StatusCode::from_u16(code).unwrap(), body)
}

async fn submit_handler(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, String) {
    state.record_auth(&headers);
    let id = body["id"].as_str().unwrap_or_default().to_string();
    state.submitted.lock().unwrap().push(body);
    let (code, text) = state
        .submit_reply
        .lock()
        .unwrap()
        .clone()
        .unwrap_or((201, json!({ "id": id }).to_string()));
    reply(code, text)
}

async fn status_handler(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> (StatusCode, String) {
    state.record_auth(&headers);
    state.polled_ids.lock().unwrap().push(id);
    let mut queue = state.statuses.lock().unwrap();
    let (code, text) = if queue.len() > 1 {
        queue.pop_front().unwrap()
    } else {
        queue.front().cloned().unwrap_or((500, "no script".into()))
    };
    reply(code, text)
}

async fn api_server(state: Arc<ApiState>) -> String {
    let app = Router::new()
        .route("/api/v1/generation/translate/document", post(submit_handler))
        .route("/api/v1/generation/translate/document/{id}", get(status_handler))
        .with_state(state);
    serve(app).await
}

// ── Mock object store ────────────────────────────────────────────────────────

#[derive(Default)]
struct S3State {
    objects: Mutex<HashMap<String, Vec<u8>>>,
    content_types: Mutex<Vec<String>>,
}

fn is_signed(headers: &HeaderMap) -> bool {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    auth.starts_with("AWS4-HMAC-SHA256 Credential=AKIDEXAMPLE/")
        && auth.contains("/s3/aws4_request")
        && headers.contains_key("x-amz-date")
        && headers.contains_key("x-amz-content-sha256")
}

async fn put_object(
    State(state): State<Arc<S3State>>,
    Path((bucket, key)): Path<(String, String)>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    if !is_signed(&headers) {
        return StatusCode::FORBIDDEN;
    }
    if let Some(ct) = headers.get("content-type").and_then(|v| v.to_str().ok()) {
        state.content_types.lock().unwrap().push(ct.to_string());
    }
    state
        .objects
        .lock()
        .unwrap()
        .insert(format!("{bucket}/{key}"), body.to_vec());
    StatusCode::OK
}

async fn get_object(
    State(state): State<Arc<S3State>>,
    Path((bucket, key)): Path<(String, String)>,
    headers: HeaderMap,
) -> (StatusCode, Vec<u8>) {
    if !is_signed(&headers) {
        return (StatusCode::FORBIDDEN, Vec::new());
    }
    match state.objects.lock().unwrap().get(&format!("{bucket}/{key}")) {
        Some(bytes) => (StatusCode::OK, bytes.clone()),
        None => (StatusCode::NOT_FOUND, b"<Error><Code>NoSuchKey</Code></Error>".to_vec()),
    }
}

async fn s3_server(state: Arc<S3State>) -> String {
    let app = Router::new()
        .route("/{bucket}/{*key}", put(put_object).get(get_object))
        .with_state(state);
    serve(app).await
}

// ── Helpers ──────────────────────────────────────────────────────────────────

fn bearer_api(endpoint: &str) -> HttpTranslationApi {
    HttpTranslationApi::new(endpoint, Arc::new(BearerAuth::new("secret-token")), 5).unwrap()
}

fn sample_job() -> TranslationJob {
    TranslationJob::with_id(
        "job-42",
        &StorageLocation::new("core-bucket", "en_500.pdf"),
        &JobOptions::default(),
    )
}

fn s3_client(endpoint: &str) -> S3Client {
    let config = TranslationConfig::builder()
        .credentials("AKIDEXAMPLE", "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY")
        .bucket("core-bucket")
        .api_endpoint("http://127.0.0.1:9")
        .storage_endpoint(endpoint)
        .build()
        .unwrap();
    S3Client::from_config(&config.storage, 5).unwrap()
}

// ── Translation API ──────────────────────────────────────────────────────────

#[tokio::test]
async fn submit_posts_job_with_bearer_token() {
    let state = Arc::new(ApiState::default());
    let endpoint = api_server(state.clone()).await;

    let id = bearer_api(&endpoint).submit(&sample_job()).await.unwrap();

    assert_eq!(id, "job-42");
    assert_eq!(state.authorizations.lock().unwrap()[0], "Bearer secret-token");
    let body = state.submitted.lock().unwrap()[0].clone();
    assert_eq!(body["url"], "s3://core-bucket/en_500.pdf");
    assert_eq!(body["sourceLanguage"], "EN_US");
    assert_eq!(body["targetLanguage"], "ZH_CN");
    assert_eq!(body["documentType"], "PDF");
    assert_eq!(body["option"]["model"], "CLAUDE_3_SONNET");
    assert_eq!(body["option"]["useAwsTranslate"], true);
    assert_eq!(body["option"]["glossaries"], json!([]));
}

#[tokio::test]
async fn submit_non_201_surfaces_body() {
    let state = Arc::new(ApiState::default());
    *state.submit_reply.lock().unwrap() = Some((500, "upstream exploded".into()));
    let endpoint = api_server(state.clone()).await;

    let err = bearer_api(&endpoint).submit(&sample_job()).await.unwrap_err();

    match err {
        TranslateError::SubmitRejected { status, body } => {
            assert_eq!(status, 500);
            assert_eq!(body, "upstream exploded");
        }
        other => panic!("expected SubmitRejected, got {other:?}"),
    }
}

#[tokio::test]
async fn submit_without_id_is_invalid_response() {
    let state = Arc::new(ApiState::default());
    *state.submit_reply.lock().unwrap() = Some((201, r#"{"ok":true}"#.into()));
    let endpoint = api_server(state).await;

    let err = bearer_api(&endpoint).submit(&sample_job()).await.unwrap_err();

    assert!(matches!(err, TranslateError::InvalidResponse { .. }), "{err:?}");
}

#[tokio::test]
async fn status_accepts_201_only() {
    let state = Arc::new(ApiState::default());
    state.statuses.lock().unwrap().extend([
        (
            201,
            json!({
                "status": "SUCCEEDED",
                "location": { "bucket": "core-bucket", "key": "out/zh.pdf" }
            })
            .to_string(),
        ),
        (200, json!({ "status": "SUCCEEDED" }).to_string()),
    ]);
    let endpoint = api_server(state.clone()).await;
    let api = bearer_api(&endpoint);

    let st = api.status("job-42").await.unwrap();
    assert_eq!(st.status, JobState::Succeeded);
    assert_eq!(st.location, Some(StorageLocation::new("core-bucket", "out/zh.pdf")));

    let err = api.status("job-42").await.unwrap_err();
    match err {
        TranslateError::StatusRejected { job_id, status, .. } => {
            assert_eq!(job_id, "job-42");
            assert_eq!(status, 200);
        }
        other => panic!("expected StatusRejected, got {other:?}"),
    }
    assert_eq!(*state.polled_ids.lock().unwrap(), vec!["job-42", "job-42"]);
}

#[tokio::test]
async fn unreachable_endpoint_is_transport_error() {
    // Port 9 (discard) is closed on loopback in test environments.
    let api = bearer_api("http://127.0.0.1:9");

    let err = api.status("job-42").await.unwrap_err();

    assert!(matches!(err, TranslateError::Transport { .. }), "{err:?}");
    assert!(err.is_transient());
}

// ── Object store ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn s3_put_then_get_round_trips() {
    let state = Arc::new(S3State::default());
    let endpoint = s3_server(state.clone()).await;
    let client = s3_client(&endpoint);
    let location = StorageLocation::new("core-bucket", "input/en 500.pdf");

    client
        .put_object(&location, b"%PDF-1.4 body".to_vec(), "application/pdf")
        .await
        .unwrap();
    assert!(state
        .objects
        .lock()
        .unwrap()
        .contains_key("core-bucket/input/en 500.pdf"));
    assert_eq!(state.content_types.lock().unwrap()[0], "application/pdf");

    let chunks: Vec<Bytes> = client
        .get_object(&location)
        .await
        .unwrap()
        .try_collect()
        .await
        .unwrap();
    assert_eq!(chunks.concat(), b"%PDF-1.4 body");
}

#[tokio::test]
async fn s3_missing_object_is_download_error() {
    let state = Arc::new(S3State::default());
    let endpoint = s3_server(state).await;
    let client = s3_client(&endpoint);

    let err = match client
        .get_object(&StorageLocation::new("core-bucket", "nope.pdf"))
        .await
    {
        Ok(_) => panic!("expected an error for a missing object"),
        Err(e) => e,
    };

    match err {
        TranslateError::DownloadFailed { bucket, key, reason } => {
            assert_eq!(bucket, "core-bucket");
            assert_eq!(key, "nope.pdf");
            assert!(reason.contains("404"), "{reason}");
        }
        other => panic!("expected DownloadFailed, got {other:?}"),
    }
}

// ── End to end ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn translate_document_end_to_end_with_sigv4() {
    let s3 = Arc::new(S3State::default());
    s3.objects
        .lock()
        .unwrap()
        .insert("core-bucket/output/zh.pdf".into(), b"%PDF translated".to_vec());
    let s3_endpoint = s3_server(s3.clone()).await;

    let api = Arc::new(ApiState::default());
    api.statuses.lock().unwrap().extend([
        (201, json!({ "status": "RUNNING" }).to_string()),
        (
            201,
            json!({
                "status": "SUCCEEDED",
                "location": { "bucket": "core-bucket", "key": "output/zh.pdf" }
            })
            .to_string(),
        ),
    ]);
    let api_endpoint = api_server(api.clone()).await;

    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("en_500.pdf");
    std::fs::write(&input, b"%PDF source").unwrap();
    let output = dir.path().join("translated_document.pdf");

    let config = TranslationConfig::builder()
        .credentials("AKIDEXAMPLE", "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY")
        .bucket("core-bucket")
        .storage_endpoint(&s3_endpoint)
        .api_endpoint(&api_endpoint)
        .auth(AuthConfig::sigv4_lambda())
        .poll_interval(Duration::from_millis(50))
        .build()
        .unwrap();

    let report = translate_document(&input, &output, &config).await.unwrap();

    assert!(matches!(report.outcome, TranslationOutcome::Succeeded { bytes: 15, .. }));
    assert_eq!(report.status_checks, 2);
    assert_eq!(std::fs::read(&output).unwrap(), b"%PDF translated");
    assert_eq!(
        s3.objects.lock().unwrap()["core-bucket/en_500.pdf"],
        b"%PDF source".to_vec()
    );

    let auths = api.authorizations.lock().unwrap().clone();
    assert_eq!(auths.len(), 3);
    assert!(auths
        .iter()
        .all(|a| a.starts_with("AWS4-HMAC-SHA256 ") && a.contains("/lambda/aws4_request")));

    let submitted = api.submitted.lock().unwrap()[0].clone();
    assert_eq!(submitted["id"].as_str(), Some(report.job_id.as_str()));
    assert_eq!(*api.polled_ids.lock().unwrap(), vec![report.job_id.clone(); 2]);
}
