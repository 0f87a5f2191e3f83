// crates/cli/src/main.rs
//! Podsum CLI binary.
//!
//! Submits podcast audio to the summarization backend and watches jobs to
//! completion. Progress goes to stderr so the rendered report on stdout can
//! be piped.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

use podsum_client::{
    decode_summary, ApiClient, ClientConfig, Phase, Session, DEFAULT_FAILURE_MESSAGE,
};
use podsum_types::JobStatus;

mod report;

#[derive(Parser)]
#[command(name = "podsum")]
#[command(about = "Submit podcast audio for summarization and fetch the results")]
#[command(version)]
struct Cli {
    /// Backend base URL (default: PODSUM_API_URL, then http://localhost:8080)
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload an .mp3 file, register a job, and watch it to completion
    Submit {
        /// Path to the audio file
        file: PathBuf,

        /// Print the job id and exit instead of waiting for the result
        #[arg(long)]
        no_wait: bool,
    },
    /// Watch an already-registered job until it finishes
    Watch {
        job_id: String,
    },
    /// Print a job's current status and exit
    Status {
        job_id: String,
    },
    /// Print a finished job's summary and exit
    Result {
        job_id: String,
    },
}

impl Cli {
    fn config(&self) -> ClientConfig {
        let mut config = ClientConfig::from_env();
        if let Some(url) = &self.api_url {
            config.base_url = url.clone();
        }
        config
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Quiet by default; RUST_LOG overrides. Progress UX uses eprintln.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .compact()
        .init();

    let cli = Cli::parse();
    let config = cli.config();
    tracing::debug!(api_url = %config.base_url, "using backend");

    eprintln!("\n\u{1f399} podsum v{}\n", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Submit { file, no_wait } => submit(config, file, no_wait).await,
        Commands::Watch { job_id } => watch(config, job_id).await,
        Commands::Status { job_id } => status(config, job_id).await,
        Commands::Result { job_id } => result(config, job_id).await,
    }
}

async fn submit(config: ClientConfig, file: PathBuf, no_wait: bool) -> Result<()> {
    let session = Session::new(config)?;

    let source = match session.select(&file) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("  \u{2717} {err}");
            std::process::exit(1);
        }
    };
    eprintln!(
        "  \u{2713} {} ({})",
        source.file_name(),
        source.size_display()
    );

    let pb = spinner();
    pb.set_message(format!("Uploading {}...", source.file_name()));
    let handle = match session.submit().await {
        Ok(handle) => handle,
        Err(err) => {
            pb.finish_and_clear();
            eprintln!("  \u{2717} {err}");
            std::process::exit(1);
        }
    };
    pb.finish_and_clear();
    eprintln!("  \u{2713} Job registered \u{2014} {}", handle.id);
    if let Some(key) = session.snapshot().object_key {
        if key != source.file_name() {
            eprintln!("  \u{2192} stored as {key}");
        }
    }

    if no_wait {
        println!("{}", handle.id);
        return Ok(());
    }

    let code = watch_session(&session).await;
    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}

async fn watch(config: ClientConfig, job_id: String) -> Result<()> {
    let session = Session::new(config)?;
    eprintln!("  \u{2192} Watching job {job_id}");
    session.attach(job_id);

    let code = watch_session(&session).await;
    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}

async fn status(config: ClientConfig, job_id: String) -> Result<()> {
    let api = ApiClient::new(&config)?;
    tracing::debug!(job_id = %job_id, "fetching job row");
    match api.job_result(&job_id).await? {
        Some(record) => {
            let glyph = report::status_glyph(record.status);
            match record.created_at_millis().and_then(report::format_created_at) {
                Some(created) => {
                    eprintln!("  {glyph} {} \u{2014} created {created}", record.status)
                }
                None => eprintln!("  {glyph} {}", record.status),
            }
            if let Some(key) = &record.key_name {
                eprintln!("    key {key}");
            }
            if record.status == JobStatus::Failed {
                let message = record
                    .error_message
                    .as_deref()
                    .unwrap_or(DEFAULT_FAILURE_MESSAGE);
                eprintln!("    {message}");
                std::process::exit(1);
            }
            Ok(())
        }
        None => {
            eprintln!("  \u{2717} No job row yet for {job_id}");
            std::process::exit(1);
        }
    }
}

async fn result(config: ClientConfig, job_id: String) -> Result<()> {
    let api = ApiClient::new(&config)?;
    tracing::debug!(job_id = %job_id, "fetching job row");
    let Some(record) = api.job_result(&job_id).await? else {
        eprintln!("  \u{2717} No job row yet for {job_id}");
        std::process::exit(1);
    };

    match record.status {
        JobStatus::Completed => match record.summary_result.as_deref() {
            Some(raw) => {
                let data = decode_summary(raw)?;
                print!("{}", report::render_summary(&data));
                Ok(())
            }
            None => {
                println!("  (completed without a summary payload)");
                Ok(())
            }
        },
        JobStatus::Failed => {
            let message = record
                .error_message
                .as_deref()
                .unwrap_or(DEFAULT_FAILURE_MESSAGE);
            eprintln!("  \u{2717} {message}");
            std::process::exit(1);
        }
        status => {
            eprintln!("  {} Job is {status}", report::status_glyph(status));
            std::process::exit(1);
        }
    }
}

/// Drives the spinner off session snapshots until a terminal phase, then
/// prints the outcome. Returns the process exit code.
async fn watch_session(session: &Session) -> i32 {
    let pb = spinner();
    let mut rx = session.subscribe();
    loop {
        let snap = rx.borrow_and_update().clone();
        match snap.phase {
            Phase::Uploading => pb.set_message("Uploading..."),
            Phase::Polling => {
                let status = snap
                    .job_status
                    .unwrap_or(JobStatus::Pending);
                pb.set_message(format!("Waiting \u{2014} {status}"));
            }
            Phase::Completed => {
                pb.finish_and_clear();
                eprintln!(
                    "  \u{2713} Completed \u{2014} {}\n",
                    snap.job_id.as_deref().unwrap_or("?")
                );
                match snap.summary {
                    Some(data) => print!("{}", report::render_summary(&data)),
                    None => println!("  (completed without a summary payload)"),
                }
                return 0;
            }
            Phase::Failed => {
                pb.finish_and_clear();
                eprintln!(
                    "  \u{2717} {}",
                    snap.error.as_deref().unwrap_or(DEFAULT_FAILURE_MESSAGE)
                );
                return 1;
            }
            Phase::Idle | Phase::FileSelected => {}
        }
        if rx.changed().await.is_err() {
            pb.finish_and_clear();
            return 1;
        }
    }
}

fn spinner() -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("  {spinner} {msg}")
            .expect("valid spinner template"),
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}
