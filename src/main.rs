//! Sockscout - SOCKS v4/v5 open proxy scanner
//!
//! This is the main entry point for the sockscout binary.

use anyhow::{bail, Result};
use clap::{ArgAction, Parser};
use sockscout::config::{load_config, Config};
use sockscout::scan::{run_scan, ScanOptions};
use sockscout::target::{add_spec, load_file, TargetStore};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::Mutex;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// Sockscout - asynchronous parallel scanner for open SOCKS proxies
#[derive(Parser, Debug)]
#[command(name = "sockscout")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Hosts, IPs or CIDR blocks to scan
    targets: Vec<String>,

    /// Read targets from a file (one host/ip/cidr per line)
    #[arg(short = 'f', long = "file")]
    files: Vec<PathBuf>,

    /// Bounce destination the proxies are asked to relay to, host[:port]
    #[arg(short = 'r', long)]
    remote: Option<String>,

    /// Number of parallel scan slots (1-300)
    #[arg(short = 's', long)]
    slots: Option<u32>,

    /// Connect/reply timeout in seconds (1-600)
    #[arg(short = 't', long)]
    timeout: Option<u64>,

    /// Username reported to the remote proxies
    #[arg(short = 'u', long)]
    username: Option<String>,

    /// Increase verbosity (repeatable)
    #[arg(short = 'v', action = ArgAction::Count)]
    verbose: u8,

    /// Path to configuration file
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Enable JSON logging format
    #[arg(long)]
    json_log: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Setup logging
    setup_logging(&args.log_level, args.json_log)?;

    // File settings sit below command-line overrides
    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => Config::default(),
    };
    if let Some(remote) = args.remote {
        config.scan.remote = remote;
    }
    if let Some(slots) = args.slots {
        config.scan.parallelism = slots;
    }
    if let Some(timeout) = args.timeout {
        config.scan.timeout_secs = timeout;
    }
    if let Some(username) = args.username {
        config.scan.username = username;
    }
    config.scan.verbose = config.scan.verbose.max(args.verbose);
    config.scan.validate()?;

    info!("sockscout v{}", sockscout::VERSION);

    let bounce = config.scan.resolve_remote().await?;
    info!("bounce destination: {}", bounce);

    // Load the targets
    let mut store = TargetStore::new(config.scan.target_port);
    for path in &args.files {
        load_file(&mut store, path).await?;
    }
    for spec in &args.targets {
        add_spec(&mut store, spec).await?;
    }
    if store.is_empty() {
        bail!("no targets to scan!");
    }

    if config.scan.verbose >= 1 {
        info!("loaded {} targets to scan", store.len());
    }
    if config.scan.verbose >= 5 {
        for target in store.iter() {
            eprintln!("{:<19}:{}", target.addr, target.port);
        }
    }

    let store = Arc::new(Mutex::new(store));
    spawn_progress_reporter(store.clone());
    let summary = run_scan(ScanOptions::from_config(&config.scan, bounce), store).await?;

    println!(
        "scanned {} targets: {} SOCKS v4 open, {} SOCKS v5 open, {} requiring user/pass auth",
        summary.finished, summary.v4_open, summary.v5_open, summary.password_required
    );

    // The progress reporter sits on a blocking stdin read that cannot
    // be cancelled; exit directly instead of waiting on it.
    std::process::exit(0)
}

/// Print a progress line whenever the operator presses return
fn spawn_progress_reporter(store: Arc<Mutex<TargetStore>>) {
    let start = Instant::now();
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(_)) = lines.next_line().await {
            let store = store.lock().await;
            eprintln!(
                "[scanned {} of {} in {} seconds]",
                store.finished(),
                store.len(),
                start.elapsed().as_secs()
            );
        }
    });
}

/// Setup logging based on configuration
fn setup_logging(level: &str, json: bool) -> Result<()> {
    let level = match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" | "warning" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    if json {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(level)
            .json()
            .finish();
        tracing::subscriber::set_global_default(subscriber)?;
    } else {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(level)
            .with_target(true)
            .finish();
        tracing::subscriber::set_global_default(subscriber)?;
    }

    Ok(())
}
