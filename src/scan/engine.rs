//! Scan scheduler and reporting loop
//!
//! Spawns one worker per slot (the pool is clamped to the number of
//! loaded targets), then services their event stream: outcome lines go
//! to stdout and Ctrl-C tears the pool down. Workers stop on their own
//! once the target store is drained.

use crate::scan::event::{EventKind, ScanEvent};
use crate::scan::slot::SlotWorker;
use crate::config::ScanConfig;
use crate::target::{TargetStore, V4Track, V5Track};
use anyhow::{bail, Result};
use std::net::SocketAddrV4;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinSet;
use tracing::{debug, info};

/// Immutable scan parameters
///
/// Assembled once from the configuration before the scan starts and
/// shared read-only by every slot.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Destination every successful negotiation asks the proxy to
    /// relay to
    pub bounce: SocketAddrV4,
    /// Username reported in SOCKS4 requests
    pub username: String,
    /// Per-phase timeout (connect, send, receive)
    pub timeout: Duration,
    /// Slot pool size before clamping to the target count
    pub parallelism: usize,
    /// Verbosity level; >= 2 prints intermediate phase lines
    pub verbose: u8,
}

impl ScanOptions {
    /// Build scan options from a validated configuration and the
    /// resolved bounce destination
    pub fn from_config(config: &ScanConfig, bounce: SocketAddrV4) -> Self {
        ScanOptions {
            bounce,
            username: config.username.clone(),
            timeout: config.timeout(),
            parallelism: config.parallelism as usize,
            verbose: config.verbose,
        }
    }
}

/// End-of-run accounting
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanSummary {
    /// Targets loaded
    pub targets: usize,
    /// Targets that reached FINISHED
    pub finished: usize,
    /// Targets granting a SOCKS4 relay
    pub v4_open: usize,
    /// Targets granting a SOCKS5 relay
    pub v5_open: usize,
    /// Targets demanding username/password for SOCKS5
    pub password_required: usize,
}

/// Run the scan to completion
///
/// Drives every target in the store to FINISHED. The store is shared so
/// the caller keeps access to the per-target outcome states afterwards.
/// Returns the summary; errors only on an empty store.
pub async fn run_scan(opts: ScanOptions, store: Arc<Mutex<TargetStore>>) -> Result<ScanSummary> {
    let total = store.lock().await.len();
    if total == 0 {
        bail!("no targets to scan!");
    }

    // Never keep more slots than targets.
    let pool = opts.parallelism.min(total).max(1);
    debug!("scanning {} targets with {} slots", total, pool);

    let opts = Arc::new(opts);
    let (tx, mut rx) = mpsc::unbounded_channel();

    let mut workers = JoinSet::new();
    for index in 0..pool {
        workers.spawn(
            SlotWorker {
                index,
                opts: opts.clone(),
                store: store.clone(),
                events: tx.clone(),
            }
            .run(),
        );
    }
    drop(tx);

    loop {
        tokio::select! {
            event = rx.recv() => match event {
                Some(event) => {
                    if event.kind != EventKind::TargetFinished {
                        print_event(&event, opts.verbose);
                    }
                }
                // All workers dropped their senders: the store is drained.
                None => break,
            },
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted, aborting scan");
                workers.abort_all();
                break;
            }
        }
    }

    while workers.join_next().await.is_some() {}

    let store = store.lock().await;
    let mut summary = ScanSummary {
        targets: total,
        ..Default::default()
    };
    for target in store.iter() {
        if target.status.finished {
            summary.finished += 1;
        }
        if target.status.v4 == (V4Track::Done { successful: true }) {
            summary.v4_open += 1;
        }
        if target.status.v5 == (V5Track::Done { successful: true }) {
            summary.v5_open += 1;
        }
        if target.status.v5 == V5Track::PasswordRequired {
            summary.password_required += 1;
        }
    }
    Ok(summary)
}

/// Print one outcome or phase line
///
/// Outcomes always print; intermediate phase lines need verbosity >= 2.
fn print_event(event: &ScanEvent, verbose: u8) {
    let message: &str = match &event.kind {
        EventKind::Occupied => {
            if verbose >= 2 {
                println!("{:3}   {:<18} now occupied", event.slot, event.addr);
            }
            return;
        }
        EventKind::Connecting if verbose >= 2 => "connecting...",
        EventKind::Connected if verbose >= 2 => "connected!",
        EventKind::RequestSent if verbose >= 2 => "connect request sent!",
        EventKind::AuthRequestSent if verbose >= 2 => "auth type request sent!",
        EventKind::AuthNoneOk if verbose >= 2 => "no authentication required!",
        EventKind::PasswordRequired => "user/pass authentication required!",
        EventKind::Failed(reason) => reason.as_str(),
        EventKind::Success => "connection successful!",
        _ => return,
    };

    let proto = event
        .proto
        .map(|p| p.to_string())
        .unwrap_or_default();
    println!(
        "{:3}   {:<18} {:<4} {}",
        event.slot, event.addr, proto, message
    );
}
