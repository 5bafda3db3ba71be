//! Test utilities and mocks for Sockscout
//!
//! Scripted SOCKS peers on loopback so the scan engine can be exercised
//! end to end without touching the network.

use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;

use sockscout::scan::ScanOptions;
use sockscout::target::TargetStore;

/// How a scripted peer answers incoming probes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeerScript {
    /// Grants the relay on both protocols
    OpenBoth,
    /// Behaves like a real SOCKS v4 daemon: grants v4 and answers the
    /// v5 auth proposal with a v4-style rejection
    Socks4Only,
    /// Rejects v4, offers only username/password auth on v5
    PasswordOnly,
    /// Accepts the connection and never sends a byte
    Silent,
    /// Accepts the connection and closes it immediately
    CloseOnAccept,
}

/// Connection accounting for a scripted peer
#[derive(Debug, Default)]
pub struct PeerStats {
    /// Total connections accepted
    pub accepted: AtomicUsize,
    current: AtomicUsize,
    /// Highest number of simultaneously open connections observed
    pub max_concurrent: AtomicUsize,
}

/// Start a scripted peer on an ephemeral loopback port
pub async fn spawn_peer(script: PeerScript) -> (SocketAddrV4, Arc<PeerStats>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let stats = Arc::new(PeerStats::default());
    let addr = spawn_peer_with(listener, script, stats.clone());
    (addr, stats)
}

/// Start a scripted peer on an already-bound listener
///
/// The stats handle is shared so several peers can feed one gauge.
pub fn spawn_peer_with(
    listener: TcpListener,
    script: PeerScript,
    stats: Arc<PeerStats>,
) -> SocketAddrV4 {
    let addr = match listener.local_addr().unwrap() {
        SocketAddr::V4(addr) => addr,
        SocketAddr::V6(_) => unreachable!("peer listeners bind v4 loopback"),
    };
    tokio::spawn(async move {
        loop {
            let Ok((stream, _)) = listener.accept().await else {
                break;
            };
            let stats = stats.clone();
            stats.accepted.fetch_add(1, Ordering::SeqCst);
            let current = stats.current.fetch_add(1, Ordering::SeqCst) + 1;
            stats.max_concurrent.fetch_max(current, Ordering::SeqCst);
            tokio::spawn(async move {
                serve(stream, script).await;
                stats.current.fetch_sub(1, Ordering::SeqCst);
            });
        }
    });
    addr
}

async fn serve(mut stream: TcpStream, script: PeerScript) {
    if script == PeerScript::CloseOnAccept {
        return;
    }
    if script == PeerScript::Silent {
        // Hold the connection until the scanner gives up.
        let mut buf = [0u8; 600];
        loop {
            match stream.read(&mut buf).await {
                Ok(0) | Err(_) => return,
                Ok(_) => {}
            }
        }
    }

    let mut buf = [0u8; 600];
    if matches!(stream.read(&mut buf).await, Ok(0) | Err(_)) {
        return;
    }

    let reply: &[u8] = match (script, buf[0]) {
        (PeerScript::OpenBoth, 4) => &[0, 90, 0, 0, 0, 0, 0, 0],
        (PeerScript::OpenBoth, 5) => {
            if stream.write_all(&[5, 0]).await.is_err() {
                return;
            }
            if matches!(stream.read(&mut buf).await, Ok(0) | Err(_)) {
                return;
            }
            &[5, 0, 0, 1, 0, 0, 0, 0, 0, 0]
        }
        (PeerScript::Socks4Only, 4) => &[0, 90, 0, 0, 0, 0, 0, 0],
        // A v4 daemon cannot parse the v5 proposal and rejects it.
        (PeerScript::Socks4Only, 5) => &[0, 91, 0, 0, 0, 0, 0, 0],
        (PeerScript::PasswordOnly, 4) => &[0, 91, 0, 0, 0, 0, 0, 0],
        (PeerScript::PasswordOnly, 5) => &[5, 2],
        _ => return,
    };
    let _ = stream.write_all(reply).await;
}

/// Build scan options pointed at the given peer, with test-sized budgets
pub fn test_options(bounce: SocketAddrV4, slots: usize) -> ScanOptions {
    ScanOptions {
        bounce,
        username: "tester".to_string(),
        timeout: Duration::from_secs(5),
        parallelism: slots,
        verbose: 0,
    }
}

/// Build a shared store holding the given addresses on one port
pub fn shared_store(port: u16, addrs: &[Ipv4Addr]) -> Arc<Mutex<TargetStore>> {
    let mut store = TargetStore::new(port);
    for addr in addrs {
        store.insert(*addr);
    }
    Arc::new(Mutex::new(store))
}
