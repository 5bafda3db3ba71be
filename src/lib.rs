//! # Sockscout - SOCKS v4/v5 open proxy scanner
//!
//! Sockscout probes a list of candidate hosts to determine whether each
//! one runs an open SOCKS v4 and/or SOCKS v5 proxy that will relay a
//! connection to an operator-chosen bounce destination. Probes run in
//! parallel under a bounded slot pool on a single cooperative scheduler
//! thread.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use sockscout::config::ScanConfig;
//! use sockscout::scan::{run_scan, ScanOptions};
//! use sockscout::target::{add_spec, TargetStore};
//! use std::sync::Arc;
//! use tokio::sync::Mutex;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ScanConfig::default();
//!     let bounce = config.resolve_remote().await?;
//!
//!     let mut store = TargetStore::new(config.target_port);
//!     add_spec(&mut store, "192.0.2.0/24").await?;
//!
//!     let store = Arc::new(Mutex::new(store));
//!     let summary = run_scan(ScanOptions::from_config(&config, bounce), store).await?;
//!     println!("{} SOCKS5 proxies open", summary.v5_open);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! Every target is tested twice, on two independent connections:
//!
//! ```text
//! connect -> SOCKS4 connect request  -> reply   (track one)
//! connect -> SOCKS5 auth negotiation -> connect request -> reply
//! ```
//!
//! The SOCKS5 track only runs when the SOCKS4 transport connect
//! succeeded; a host that never answers is reported once, not twice.
//! Protocol rejections, I/O failures and per-phase timeouts end only
//! the track they happen on.

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod config;
pub mod error;
pub mod scan;
pub mod socks;
pub mod target;

// Re-export commonly used items
pub use config::{load_config, Config, ScanConfig};
pub use error::{ScanError, SocksError};
pub use scan::{run_scan, ScanOptions, ScanSummary};
pub use target::TargetStore;

/// Version of the sockscout library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Name of the application
pub const NAME: &str = env!("CARGO_PKG_NAME");
