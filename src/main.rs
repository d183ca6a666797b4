//! dvr-resolver - stream endpoint resolution for legacy DVR web pages
//!
//! ## Usage
//! ```bash
//! # Candidate URLs only
//! dvr-resolver candidates --host 192.168.1.64 --id B6D5419C-D381-4687-9CFC-A9E2CD7008F5
//!
//! # Identify, synthesize and probe
//! dvr-resolver resolve --host http://dvr.local:8080 --id WebComponents.exe --user admin --pass 1234
//!
//! # Scan a saved page
//! dvr-resolver scan-page --file login.html --host 192.168.1.64
//!
//! # Observations as JSON lines on stdin
//! echo '{"identifier":"...","page_url":"http://10.0.0.1/"}' | dvr-resolver listen
//! ```

use clap::{Parser, Subcommand};
use dvr_resolver::{
    page_signal::is_plugin_download_url,
    resolver::{ResolutionRequest, VendorObservation},
    state::{AppConfig, AppState},
    Error, Result,
};
use serde::Serialize;
use serde_json::json;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "dvr-resolver")]
#[command(about = "Identify legacy DVR/ActiveX devices and resolve their stream endpoints")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print candidate URLs without probing
    Candidates {
        #[command(flatten)]
        target: TargetArgs,
    },

    /// Identify, synthesize and probe
    Resolve {
        #[command(flatten)]
        target: TargetArgs,

        /// Per-candidate timeout (overrides RESOLVER_PROBE_TIMEOUT_MS)
        #[arg(long)]
        timeout_ms: Option<u64>,

        /// HTTP attempts (overrides RESOLVER_MAX_CANDIDATES)
        #[arg(long)]
        max: Option<usize>,
    },

    /// Extract vendor identifiers from a saved page and resolve
    ScanPage {
        /// HTML file
        #[arg(long)]
        file: std::path::PathBuf,

        /// Host or URL the page was served from
        #[arg(long)]
        host: String,

        #[arg(long)]
        user: Option<String>,

        #[arg(long)]
        pass: Option<String>,

        /// Stop after candidate synthesis
        #[arg(long)]
        no_probe: bool,
    },

    /// Classify a URL as plugin download or not
    ClassifyUrl { url: String },

    /// What to tell the user about a requested plugin
    Assess {
        #[arg(long)]
        id: String,

        #[arg(long)]
        host: String,
    },

    /// List registered device signatures
    Signatures,

    /// Resolve vendor observations read as JSON lines from stdin
    Listen,
}

#[derive(clap::Args, Debug)]
struct TargetArgs {
    /// Bare hostname, host:port or page URL
    #[arg(long)]
    host: String,

    /// CLSID, installer filename/URL or brand token
    #[arg(long)]
    id: Option<String>,

    #[arg(long)]
    user: Option<String>,

    #[arg(long)]
    pass: Option<String>,
}

impl TargetArgs {
    fn into_request(self) -> ResolutionRequest {
        ResolutionRequest {
            host: self.host,
            identifier: self.id,
            username: self.user,
            password: self.pass,
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    dotenvy::dotenv().ok();

    // Logs go to stderr; stdout carries JSON
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dvr_resolver=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    if let Err(e) = run(args).await {
        tracing::error!(code = e.code(), error = %e, "Command failed");
        print_json(&json!({ "error": { "code": e.code(), "message": e.to_string() } }))?;
        std::process::exit(1);
    }
    Ok(())
}

async fn run(args: Args) -> Result<()> {
    let mut config = AppConfig::from_env()?;

    if let Command::Resolve { timeout_ms, max, .. } = &args.command {
        if let Some(ms) = timeout_ms.filter(|ms| *ms > 0) {
            config.probe_timeout_ms = ms;
        }
        if let Some(max) = max.filter(|max| *max > 0) {
            config.max_candidates = max;
        }
    }

    tracing::debug!(
        probe_timeout_ms = config.probe_timeout_ms,
        max_candidates = config.max_candidates,
        min_snapshot_bytes = config.min_snapshot_bytes,
        "Configuration loaded"
    );

    let state = AppState::new(config)?;
    let resolver = state.resolver.clone();

    match args.command {
        Command::Candidates { target } => {
            let request = target.into_request();
            let resolved = resolver.target(&request).await;
            let set = resolver.candidates(&request).await;
            print_json(&json!({
                "host": resolved.host,
                "brand": resolved.brand(),
                "detected": resolved.signature.is_some(),
                "snapshot": set.snapshot,
                "rtsp": set.rtsp,
            }))?;
        }
        Command::Resolve { target, .. } => {
            let report = resolver.resolve(target.into_request()).await;
            tracing::info!(request_id = %report.request_id, "{}", report.summary());
            print_json(&report)?;
        }
        Command::ScanPage {
            file,
            host,
            user,
            pass,
            no_probe,
        } => {
            let markup = tokio::fs::read_to_string(&file).await.map_err(|e| {
                Error::Io(std::io::Error::new(e.kind(), format!("{}: {}", file.display(), e)))
            })?;
            if no_probe {
                let signals = resolver.scan_page(&markup).await;
                let request = ResolutionRequest::new(&host, signals.selected.as_deref())
                    .with_credentials(user.as_deref(), pass.as_deref());
                let set = resolver.candidates(&request).await;
                print_json(&json!({ "signals": signals, "candidates": set }))?;
            } else {
                let (signals, report) = resolver
                    .resolve_page(&markup, &host, user.as_deref(), pass.as_deref())
                    .await;
                tracing::info!(request_id = %report.request_id, "{}", report.summary());
                print_json(&json!({ "signals": signals, "report": report }))?;
            }
        }
        Command::ClassifyUrl { url } => {
            let plugin = is_plugin_download_url(&url);
            let signature = plugin.then(|| state.registry.resolve_by_filename_or_url(&url));
            print_json(&json!({
                "url": url,
                "plugin_download": plugin,
                "signature": signature,
            }))?;
        }
        Command::Assess { id, host } => {
            print_json(&resolver.assess(&id, &host).await)?;
        }
        Command::Signatures => {
            print_json(&state.registry.list().await)?;
        }
        Command::Listen => {
            let (tx, rx) = mpsc::channel(16);
            let (handle, mut reports) = resolver.listen(rx);

            let printer = tokio::spawn(async move {
                while let Some(report) = reports.recv().await {
                    match serde_json::to_string(&report) {
                        Ok(line) => println!("{}", line),
                        Err(e) => tracing::error!(error = %e, "Failed to serialize report"),
                    }
                }
            });

            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            while let Some(line) = lines.next_line().await? {
                if line.trim().is_empty() {
                    continue;
                }
                match serde_json::from_str::<VendorObservation>(&line) {
                    Ok(observation) => {
                        if tx.send(observation).await.is_err() {
                            break;
                        }
                    }
                    Err(e) => tracing::warn!(error = %e, "Skipping malformed observation"),
                }
            }
            drop(tx);
            handle.await.map_err(|e| Error::Internal(e.to_string()))?;
            printer.await.map_err(|e| Error::Internal(e.to_string()))?;
        }
    }

    Ok(())
}
