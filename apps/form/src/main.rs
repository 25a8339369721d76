mod ambient;
mod commands;
mod config;
mod errors;
mod models;
mod picker;
mod state;
mod submission;
mod view;

use std::io::BufRead;
use std::sync::Arc;

use anyhow::Result;
use tokio::sync::{mpsc, watch};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::commands::{parse_command, Command};
use crate::config::{Config, SubmitMode};
use crate::picker::FilePicker;
use crate::submission::{HttpSubmitter, SimulatedSubmitter, Submitter};
use crate::view::{FormHandle, ViewSnapshot};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails fast on malformed env vars)
    let config = Config::from_env()?;

    // Structured logging on stderr; stdout carries rendered frames
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting HiredEasy resume form v{}", env!("CARGO_PKG_VERSION"));

    let submitter = build_submitter(&config)?;
    info!("Submitter initialized (backend: {})", submitter.backend());

    let handle = view::mount(config.view_settings(), submitter);
    let renderer = tokio::spawn(render_frames(handle.subscribe()));

    let session = async {
        drive(&handle, spawn_stdin_reader()).await?;
        // let an in-flight submission settle before tearing down
        let last = handle.when_idle().await?;
        info!("Input finished; final status: {:?}", last.status);
        anyhow::Ok(())
    };

    tokio::select! {
        result = session => result?,
        _ = tokio::signal::ctrl_c() => info!("Interrupted, unmounting"),
    }

    handle.unmount().await?;
    renderer.await??;
    Ok(())
}

fn build_submitter(config: &Config) -> Result<Arc<dyn Submitter>> {
    let submitter: Arc<dyn Submitter> = match config.submit_mode {
        SubmitMode::Simulated => Arc::new(SimulatedSubmitter::new(config.simulated_delay)),
        SubmitMode::Http => {
            info!("Submitting to {}", config.submit_url);
            Arc::new(HttpSubmitter::new(
                config.submit_url.clone(),
                config.submit_timeout,
                config.download_dir.clone(),
            )?)
        }
    };
    Ok(submitter)
}

/// Reads stdin on a plain thread so a pending read never holds up shutdown.
fn spawn_stdin_reader() -> mpsc::UnboundedReceiver<std::io::Result<String>> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

/// Feeds commands to the view until input ends or `quit`.
async fn drive(
    handle: &FormHandle,
    mut lines: mpsc::UnboundedReceiver<std::io::Result<String>>,
) -> Result<()> {
    let picker = FilePicker;

    while let Some(line) = lines.recv().await {
        let line = match line {
            Ok(line) => line,
            Err(e) if e.kind() == std::io::ErrorKind::InvalidData => {
                warn!("Skipping unreadable input line: {e}");
                continue;
            }
            Err(e) => return Err(e.into()),
        };
        let command = match parse_command(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                warn!("{e}");
                continue;
            }
        };

        match command {
            Command::Text(text) => handle.set_job_description(text)?,
            Command::File(path) => match picker.pick(&path).await {
                Ok(file) => handle.select_file(file)?,
                Err(e) => warn!("File not selected: {e}"),
            },
            Command::Clear => handle.clear_file()?,
            Command::Submit => handle.submit()?,
            Command::Quit => break,
        }
    }
    Ok(())
}

/// Writes every frame to stdout as one JSON line, until the view unmounts.
async fn render_frames(mut frames: watch::Receiver<ViewSnapshot>) -> Result<()> {
    loop {
        let line = serde_json::to_string(&*frames.borrow_and_update())?;
        println!("{line}");
        if frames.changed().await.is_err() {
            return Ok(());
        }
    }
}
