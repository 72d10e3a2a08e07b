//! CLI binary for doctrans.
//!
//! A thin shim over the library crate that maps CLI flags and environment
//! variables to `TranslationConfig` and prints the result.

use anyhow::{Context, Result};
use clap::Parser;
use doctrans::{
    resume_job, translate_document, AuthConfig, JobState, PipelineProgressCallback,
    ProgressCallback, StorageLocation, TranslationConfig, TranslationOutcome, TranslationReport,
    DEFAULT_OUTPUT_PATH, DEFAULT_REGION,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

/// Exit code when the service reports the job as failed.
const EXIT_JOB_FAILED: u8 = 2;
/// Exit code when the poll bound is hit before a terminal state.
const EXIT_TIMED_OUT: u8 = 3;

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress: one spinner line that tracks the current step, plus a
/// permanent log line per completed step.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new_spinner();
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  {elapsed:.dim}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        bar.set_style(spinner_style);
        bar.set_prefix("Uploading");
        bar.set_message("Sending document to object storage…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self { bar })
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl PipelineProgressCallback for CliProgressCallback {
    fn on_upload_complete(&self, location: &StorageLocation, bytes: u64) {
        self.bar.println(format!(
            "  {} Uploaded   {}  {}",
            green("✓"),
            location,
            dim(&format!("{bytes} bytes"))
        ));
        self.bar.set_prefix("Submitting");
        self.bar.set_message("Creating translation job…");
    }

    fn on_job_submitted(&self, job_id: &str) {
        self.bar
            .println(format!("  {} Submitted  job {}", green("✓"), bold(job_id)));
        self.bar.set_prefix("Translating");
        self.bar.set_message("Waiting for first status…");
    }

    fn on_status(&self, _job_id: &str, attempt: u32, state: &JobState) {
        match state {
            JobState::Created | JobState::Running => {
                self.bar
                    .set_message(format!("{state}  {}", dim(&format!("check #{attempt}"))));
            }
            JobState::Succeeded => {
                self.bar.println(format!(
                    "  {} Translated {}",
                    green("✓"),
                    dim(&format!("after {attempt} checks"))
                ));
                self.bar.set_prefix("Downloading");
                self.bar.set_message("Fetching translated document…");
            }
            JobState::Other(s) => {
                self.bar
                    .println(format!("  {} Job reported {}", red("✗"), red(s)));
            }
        }
    }

    fn on_download_complete(&self, path: &Path, bytes: u64) {
        self.bar.println(format!(
            "  {} Downloaded {}  {}",
            green("✓"),
            path.display(),
            dim(&format!("{bytes} bytes"))
        ));
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Translate with IAM (SigV4) auth against a Lambda function URL
  doctrans en_500.pdf --bucket inkcore-corebucket-xxxx \
      --api-endpoint https://xxxxx.lambda-url.us-east-1.on.aws

  # Bearer-token auth, English → Japanese, custom output
  doctrans --auth bearer --bearer-token "$TOKEN" --target-language JA_JP \
      report.pdf -o report.ja.pdf

  # Poll faster and give up after 30 minutes
  doctrans --poll-interval 5 --poll-timeout 1800 paper.pdf

  # Resume polling a job submitted by an earlier (crashed) run
  doctrans --resume 3f7c0c1e-8a42-4a55-9c1b-0b9f1d2c6e11

  # Machine-readable report
  doctrans --json paper.pdf > report.json

ENVIRONMENT VARIABLES:
  AWS_ACCESS_KEY_ID        Access key for S3 (and SigV4 API auth)
  AWS_SECRET_ACCESS_KEY    Secret key
  AWS_SESSION_TOKEN        Session token for temporary credentials
  AWS_REGION               Region (default: us-east-1)
  DOCTRANS_BUCKET          Bucket for source documents
  DOCTRANS_API_ENDPOINT    Translation API base URL
  DOCTRANS_BEARER_TOKEN    Token for --auth bearer
  DOCTRANS_S3_ENDPOINT     Custom S3-compatible endpoint (path-style)
  RUST_LOG                 Overrides the log filter

EXIT CODES:
  0  translated document written
  1  fatal error (I/O, storage, HTTP, configuration)
  2  the service reported the job as failed
  3  poll bound reached before the job finished
"#;

/// Translate PDF documents through an S3-backed translation API.
#[derive(Parser, Debug)]
#[command(
    name = "doctrans",
    version,
    about = "Translate PDF documents through an S3-backed translation API",
    long_about = "Upload a local document to S3, submit a translation job, poll until it \
finishes, and download the translated result.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Local document to translate.
    #[arg(required_unless_present = "resume")]
    input: Option<PathBuf>,

    /// Where to write the translated document.
    #[arg(short, long, env = "DOCTRANS_OUTPUT", default_value = DEFAULT_OUTPUT_PATH)]
    output: PathBuf,

    /// Poll an existing job id instead of uploading and submitting.
    #[arg(long, conflicts_with = "input")]
    resume: Option<String>,

    // ── Storage ──────────────────────────────────────────────────────────
    /// S3 access key id.
    #[arg(long, env = "AWS_ACCESS_KEY_ID", hide_env_values = true)]
    access_key: Option<String>,

    /// S3 secret access key.
    #[arg(long, env = "AWS_SECRET_ACCESS_KEY", hide_env_values = true)]
    secret_key: Option<String>,

    /// Session token for temporary credentials.
    #[arg(long, env = "AWS_SESSION_TOKEN", hide_env_values = true)]
    session_token: Option<String>,

    /// AWS region.
    #[arg(long, env = "AWS_REGION", default_value = DEFAULT_REGION)]
    region: String,

    /// Bucket that receives the source document (not needed with --resume).
    #[arg(long, env = "DOCTRANS_BUCKET", required_unless_present = "resume")]
    bucket: Option<String>,

    /// Object key for the upload (default: the input file name).
    #[arg(long, env = "DOCTRANS_OBJECT_KEY")]
    key: Option<String>,

    /// Custom S3-compatible endpoint, e.g. http://localhost:9000.
    #[arg(long, env = "DOCTRANS_S3_ENDPOINT")]
    s3_endpoint: Option<String>,

    // ── Translation API ──────────────────────────────────────────────────
    /// Translation API base URL.
    #[arg(long, env = "DOCTRANS_API_ENDPOINT")]
    api_endpoint: String,

    /// How to authenticate API requests.
    #[arg(long, env = "DOCTRANS_AUTH", value_enum, default_value = "sigv4")]
    auth: AuthArg,

    /// Bearer token (with --auth bearer).
    #[arg(long, env = "DOCTRANS_BEARER_TOKEN", hide_env_values = true)]
    bearer_token: Option<String>,

    /// SigV4 service name (with --auth sigv4).
    #[arg(long, env = "DOCTRANS_SIGV4_SERVICE", default_value = "lambda")]
    sigv4_service: String,

    // ── Job options ──────────────────────────────────────────────────────
    /// Source language code.
    #[arg(long, env = "DOCTRANS_SOURCE_LANGUAGE", default_value = "EN_US")]
    source_language: String,

    /// Target language code.
    #[arg(long, env = "DOCTRANS_TARGET_LANGUAGE", default_value = "ZH_CN")]
    target_language: String,

    /// Document type tag.
    #[arg(long, env = "DOCTRANS_DOCUMENT_TYPE", default_value = "PDF")]
    document_type: String,

    /// Translation model identifier.
    #[arg(long, env = "DOCTRANS_MODEL", default_value = "CLAUDE_3_SONNET")]
    model: String,

    /// Glossary name (repeatable).
    #[arg(long = "glossary", value_name = "NAME")]
    glossaries: Vec<String>,

    /// Do not let the service fall back to its generic MT provider.
    #[arg(long)]
    no_fallback: bool,

    // ── Polling ──────────────────────────────────────────────────────────
    /// Seconds between status checks.
    #[arg(long, env = "DOCTRANS_POLL_INTERVAL", default_value_t = 10,
          value_parser = clap::value_parser!(u64).range(1..))]
    poll_interval: u64,

    /// Stop after this many status checks.
    #[arg(long, env = "DOCTRANS_MAX_POLLS")]
    max_polls: Option<u32>,

    /// Stop polling after this many seconds.
    #[arg(long, env = "DOCTRANS_POLL_TIMEOUT")]
    poll_timeout: Option<u64>,

    /// Extra submission attempts on transient errors (same job id).
    #[arg(long, env = "DOCTRANS_SUBMIT_RETRIES", default_value_t = 0)]
    submit_retries: u32,

    /// Per-request HTTP timeout in seconds.
    #[arg(long, env = "DOCTRANS_REQUEST_TIMEOUT", default_value_t = 60)]
    request_timeout: u64,

    // ── Output ───────────────────────────────────────────────────────────
    /// Print the run report as JSON on stdout.
    #[arg(long, env = "DOCTRANS_JSON")]
    json: bool,

    /// Disable the progress spinner.
    #[arg(long, env = "DOCTRANS_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "DOCTRANS_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "DOCTRANS_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum AuthArg {
    Bearer,
    Sigv4,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The spinner already narrates each step, so library INFO logs are
    // suppressed while it is active.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build config ─────────────────────────────────────────────────────
    let progress = if show_progress {
        Some(CliProgressCallback::new())
    } else {
        None
    };
    let config = build_config(
        &cli,
        progress.clone().map(|cb| cb as ProgressCallback),
    )?;

    // ── Run ──────────────────────────────────────────────────────────────
    let result = match (&cli.resume, &cli.input) {
        (Some(job_id), _) => resume_job(job_id.clone(), &cli.output, &config)
            .await
            .with_context(|| format!("Failed to resume job {job_id}")),
        (None, Some(input)) => translate_document(input, &cli.output, &config)
            .await
            .context("Translation failed"),
        (None, None) => anyhow::bail!("either an input file or --resume <JOB_ID> is required"),
    };

    if let Some(ref cb) = progress {
        cb.finish();
    }
    let report = result?;

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to serialise report")?
        );
    } else if !cli.quiet {
        print_summary(&report);
    }

    Ok(match report.outcome {
        TranslationOutcome::Succeeded { .. } => ExitCode::SUCCESS,
        TranslationOutcome::Failed { .. } => ExitCode::from(EXIT_JOB_FAILED),
        TranslationOutcome::TimedOut { .. } => ExitCode::from(EXIT_TIMED_OUT),
    })
}

/// Map CLI args to `TranslationConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<TranslationConfig> {
    let auth = match cli.auth {
        AuthArg::Bearer => AuthConfig::bearer(
            cli.bearer_token
                .clone()
                .context("--auth bearer requires --bearer-token or DOCTRANS_BEARER_TOKEN")?,
        ),
        AuthArg::Sigv4 => AuthConfig::SigV4 {
            service: cli.sigv4_service.clone(),
        },
    };

    let mut builder = TranslationConfig::builder()
        .credentials(
            cli.access_key.clone().unwrap_or_default(),
            cli.secret_key.clone().unwrap_or_default(),
        )
        .region(cli.region.clone())
        .api_endpoint(cli.api_endpoint.clone())
        .auth(auth)
        .source_language(cli.source_language.clone())
        .target_language(cli.target_language.clone())
        .document_type(cli.document_type.clone())
        .model(cli.model.clone())
        .glossaries(cli.glossaries.clone())
        .use_aws_translate(!cli.no_fallback)
        .poll_interval(Duration::from_secs(cli.poll_interval))
        .submit_retries(cli.submit_retries)
        .request_timeout_secs(cli.request_timeout);

    if let Some(ref bucket) = cli.bucket {
        builder = builder.bucket(bucket.clone());
    }
    if let Some(ref token) = cli.session_token {
        builder = builder.session_token(token.clone());
    }
    if let Some(ref endpoint) = cli.s3_endpoint {
        builder = builder.storage_endpoint(endpoint.clone());
    }
    if let Some(ref key) = cli.key {
        builder = builder.object_key(key.clone());
    }
    if let Some(n) = cli.max_polls {
        builder = builder.max_poll_attempts(n);
    }
    if let Some(secs) = cli.poll_timeout {
        builder = builder.poll_timeout(Duration::from_secs(secs));
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

fn print_summary(report: &TranslationReport) {
    match report.outcome {
        TranslationOutcome::Succeeded {
            ref output_path,
            bytes,
            ..
        } => {
            eprintln!(
                "{}  job {}  {} checks  {}ms  →  {}",
                green("✔"),
                report.job_id,
                report.status_checks,
                report.total_duration_ms,
                bold(&output_path.display().to_string()),
            );
            eprintln!("   {}", dim(&format!("{bytes} bytes written")));
        }
        TranslationOutcome::Failed { ref status, ref payload } => {
            eprintln!(
                "{}  Translation failed with status: {}",
                red("✘"),
                bold(status)
            );
            eprintln!("   job {}  {}", report.job_id, dim(&payload.to_string()));
        }
        TranslationOutcome::TimedOut {
            ref last_status,
            elapsed_ms,
        } => {
            eprintln!(
                "{}  Gave up after {} checks ({}ms); job {} was still {}",
                cyan("⚠"),
                report.status_checks,
                elapsed_ms,
                bold(&report.job_id),
                last_status
            );
            eprintln!(
                "   {}",
                dim(&format!("resume with: doctrans --resume {}", report.job_id))
            );
        }
    }
}
