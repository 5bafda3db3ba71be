//! Concurrent scan engine
//!
//! A fixed pool of slot workers on one cooperative scheduler thread.
//! Each slot owns at most one connection at a time and advances its
//! target through the per-track negotiation state machine; the engine
//! services their event stream and accounts for finished targets.

mod engine;
mod event;
mod slot;

pub use engine::{run_scan, ScanOptions, ScanSummary};
pub use event::{EventKind, Proto, ScanEvent};
