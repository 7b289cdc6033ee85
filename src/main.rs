#![forbid(unsafe_code)]

mod adjust;
mod config;
mod constants;
mod controller;
mod desktop;
mod event_handler;
mod geometry;
mod host;
mod policy;
mod sidebar;
mod tile;
mod x11_utils;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{error, info, Level as TraceLevel};
use tracing_subscriber::FmtSubscriber;

use config::Config;
use constants::runtime::{EVENT_QUEUE_SIZE, SHUTDOWN_TIMEOUT_MS};
use controller::PolicyController;
use host::LoopMessage;
use x11_utils::X11Host;

/// Keeps application windows from covering a docked sidebar
#[derive(Debug, Parser)]
#[command(name = "sidebar-keeper", version, about)]
struct Cli {
    /// Config file (defaults to ~/.config/sidebar-keeper/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// X11 display to connect to (defaults to $DISPLAY)
    #[arg(long, global = true)]
    display: Option<String>,

    /// trace, debug, info, warn or error (overrides $LOG_LEVEL)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Log computed geometry without moving any window
    #[arg(long)]
    dry_run: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the effective overrides, sidebar and maximize geometry for the current desktop
    Inspect,
}

fn parse_log_level(value: &str) -> TraceLevel {
    match value.to_lowercase().as_str() {
        "trace" => TraceLevel::TRACE,
        "debug" => TraceLevel::DEBUG,
        "warn" => TraceLevel::WARN,
        "error" => TraceLevel::ERROR,
        _ => TraceLevel::INFO,
    }
}

#[cfg(unix)]
fn spawn_signal_listener(tx: mpsc::Sender<LoopMessage>) -> Result<std::thread::JoinHandle<()>> {
    use signal_hook::consts::{SIGINT, SIGTERM};
    use signal_hook::iterator::Signals;

    let mut signals = Signals::new([SIGINT, SIGTERM]).context("Failed to register signal handlers")?;
    std::thread::Builder::new()
        .name("signals".to_string())
        .spawn(move || {
            if let Some(signal) = signals.forever().next() {
                info!(signal, "received termination signal");
                let _ = tx.blocking_send(LoopMessage::Shutdown);
            }
        })
        .context("Failed to spawn signal thread")
}

async fn inspect(host: X11Host, config: Config) -> Result<()> {
    let controller = PolicyController::new(host.clone(), host, config, true);
    let snapshot = controller
        .snapshot()
        .await?
        .context("Could not resolve the name of the current desktop")?;
    let json = serde_json::to_string_pretty(&snapshot).context("Failed to serialize policy snapshot")?;
    println!("{json}");
    Ok(())
}

async fn run(host: X11Host, config: Config, dry_run: bool) -> Result<()> {
    host.watch_root()?;

    let (tx, mut rx) = mpsc::channel(EVENT_QUEUE_SIZE);
    let _reader = event_handler::spawn_reader(host.clone(), tx.clone())?;
    #[cfg(unix)]
    let _signals = spawn_signal_listener(tx)?;

    let mut controller = PolicyController::new(host.clone(), host, config, dry_run);
    info!(dry_run, "watching windows");

    while let Some(message) = rx.recv().await {
        match message {
            LoopMessage::Event(event) => {
                let _ = controller
                    .handle(event)
                    .await
                    .inspect_err(|err| error!("encountered error in 'handle': event={event:?}, err={err:#?}"));
            }
            LoopMessage::Shutdown => {
                info!("shutting down");
                break;
            }
        }
    }
    Ok(())
}

/// Drive `future` to completion without waiting on blocking tasks that never return
fn run_to_completion(runtime: tokio::runtime::Runtime, future: impl Future<Output = Result<()>>) -> Result<()> {
    let result = runtime.block_on(future);
    runtime.shutdown_timeout(Duration::from_millis(SHUTDOWN_TIMEOUT_MS));
    result
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // CLI flag wins over the LOG_LEVEL environment variable
    let log_level = cli
        .log_level
        .clone()
        .or_else(|| std::env::var("LOG_LEVEL").ok())
        .map(|level| parse_log_level(&level))
        .unwrap_or(TraceLevel::INFO);

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("Failed to install tracing subscriber")?;

    let config = Config::load(cli.config.as_deref())?;
    info!("config={:#?}", config);

    let host = X11Host::connect(cli.display.as_deref())?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .context("Failed to build async runtime")?;

    match cli.command {
        Some(Command::Inspect) => run_to_completion(runtime, inspect(host, config)),
        None => run_to_completion(runtime, run(host, config, cli.dry_run)),
    }
}
