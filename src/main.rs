mod config;
mod error;
mod models;
mod proxy;
mod routes;
mod state;
mod templates;
mod upstream;
mod view;

#[cfg(test)]
mod test_utils;

use anyhow::Context;
use axum::body::Bytes;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::Config;
use crate::proxy::Proxy;
use crate::view::detail::{CheckDetailView, DetailPhase};
use crate::view::format;
use crate::view::poll::CheckPoller;
use crate::view::upload::{
    accept_file, guess_mime, submit_outcome, validate_upload, with_simulated_progress,
    SubmitOutcome, UploadProgress,
};

#[derive(Parser)]
#[command(name = "checkdesk", version, about = "Dashboard and proxy for a document detection service")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the dashboard and the /api proxy (default)
    Serve,
    /// Validate a local document and submit it for checking
    Submit {
        path: PathBuf,
        /// Keep polling the new check afterwards
        #[arg(long)]
        watch: bool,
    },
    /// Poll one check until interrupted
    Watch { check_id: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "checkdesk=info,tower_http=info".into()),
        )
        .init();

    let cli = Cli::parse();
    let config = Arc::new(Config::from_env()?);

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config).await,
        Command::Submit { path, watch } => {
            let proxy = Proxy::new(config)?;
            let check_id = submit(&proxy, &path).await?;
            if watch {
                watch_check(proxy, check_id).await?;
            }
            Ok(())
        }
        Command::Watch { check_id } => watch_check(Proxy::new(config)?, check_id).await,
    }
}

async fn serve(config: Arc<Config>) -> anyhow::Result<()> {
    let state = state::AppState::new(config.clone())?;
    let app = routes::router(state);

    let addr = format!("{}:{}", config.host, config.port);
    tracing::info!("Checkdesk listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn submit(proxy: &Proxy, path: &Path) -> anyhow::Result<String> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .with_context(|| format!("{} has no usable file name", path.display()))?
        .to_string();

    // Reject by type and size before reading anything into memory.
    let size = tokio::fs::metadata(path)
        .await
        .with_context(|| format!("Failed to stat {}", path.display()))?
        .len();
    let mime = guess_mime(&file_name);
    validate_upload(&mime, size)?;

    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let (kind, file) = accept_file(&file_name, &mime, Bytes::from(bytes))?;
    tracing::info!(
        "Submitting {} ({}, {})",
        file_name,
        kind.label(),
        format::file_size_bytes(size)
    );

    let mut progress = UploadProgress::default();
    let result = with_simulated_progress(proxy.submit_check(Some(file)), &mut progress, |p| {
        tracing::info!("Uploading... {}%", p)
    })
    .await;

    match submit_outcome(result) {
        SubmitOutcome::Created { check_id, location } => {
            progress.complete();
            tracing::info!("Uploading... {}%", progress.percent());
            tracing::info!("Created check {} ({})", check_id, location);
            println!("{}", check_id);
            Ok(check_id)
        }
        SubmitOutcome::Rejected(message) => {
            progress.fail();
            anyhow::bail!(message)
        }
    }
}

async fn watch_check(proxy: Proxy, check_id: String) -> anyhow::Result<()> {
    let mut view = CheckDetailView::new(&check_id);
    let mut poller = CheckPoller::mount(Arc::new(proxy), check_id.clone());
    let mut announced_terminal = false;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Stopped watching {}", check_id);
                break;
            }
            outcome = poller.next() => {
                let Some(outcome) = outcome else { break };
                view.apply(outcome);
            }
        }

        match view.phase() {
            DetailPhase::Ready(check) => {
                if let Some(snapshot) = view.snapshot() {
                    println!("{}", snapshot.summary_line());
                }
                if check.status.is_terminal() && !announced_terminal {
                    tracing::info!("Check {} is {}; Ctrl-C to stop", check_id, check.status.as_str());
                    announced_terminal = true;
                }
            }
            DetailPhase::Failed(message) => tracing::warn!("{}: {}", check_id, message),
            DetailPhase::Loading => {}
        }
    }

    poller.unmount();
    Ok(())
}
