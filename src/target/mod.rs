//! Scan targets and their lifecycle state
//!
//! A target is one IPv4 address (plus the port to probe) and the mutable
//! record of how far each protocol track has progressed. Targets are
//! kept in a sorted, deduplicated store that hands them out in ascending
//! address order and retains them after completion for the end-of-run
//! report.

mod parse;

pub use parse::{add_spec, load_file};

use crate::socks::consts::SOCKS_PORT;
use std::collections::BTreeMap;
use std::net::Ipv4Addr;

/// Progress of the SOCKS4 track for one target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum V4Track {
    /// Not yet attempted
    #[default]
    Idle,
    /// Non-blocking connect initiated
    Connecting,
    /// Transport connection established
    Connected,
    /// Connect request written
    RequestSent,
    /// Reply read and decoded
    ReplyReceived,
    /// Track concluded
    Done {
        /// True if the proxy granted the relay
        successful: bool,
    },
}

impl V4Track {
    /// Whether the track has reached a terminal state
    pub fn is_done(self) -> bool {
        matches!(self, V4Track::Done { .. })
    }

    fn rank(self) -> u8 {
        match self {
            V4Track::Idle => 0,
            V4Track::Connecting => 1,
            V4Track::Connected => 2,
            V4Track::RequestSent => 3,
            V4Track::ReplyReceived => 4,
            V4Track::Done { .. } => 5,
        }
    }
}

/// Progress of the SOCKS5 track for one target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum V5Track {
    /// Not yet attempted
    #[default]
    Idle,
    /// Non-blocking connect initiated
    Connecting,
    /// Transport connection established
    Connected,
    /// Auth method proposal written
    AuthRequestSent,
    /// Auth method selection read
    AuthReplyReceived,
    /// Server accepted the no-auth method
    AuthNoneOk,
    /// Server demands username/password; terminal for the scanner
    PasswordRequired,
    /// Connect request written
    RequestSent,
    /// Connect reply read and decoded
    ReplyReceived,
    /// Track concluded
    Done {
        /// True if the proxy granted the relay
        successful: bool,
    },
}

impl V5Track {
    /// Whether the track has reached a terminal state
    pub fn is_done(self) -> bool {
        matches!(self, V5Track::PasswordRequired | V5Track::Done { .. })
    }

    fn rank(self) -> u8 {
        match self {
            V5Track::Idle => 0,
            V5Track::Connecting => 1,
            V5Track::Connected => 2,
            V5Track::AuthRequestSent => 3,
            V5Track::AuthReplyReceived => 4,
            V5Track::AuthNoneOk => 5,
            V5Track::PasswordRequired => 6,
            V5Track::RequestSent => 6,
            V5Track::ReplyReceived => 7,
            V5Track::Done { .. } => 8,
        }
    }
}

/// Lifecycle record for one target
///
/// Both tracks advance monotonically; states are never rolled back.
#[derive(Debug, Clone, Copy, Default)]
pub struct TargetStatus {
    /// A slot has been assigned this target at least once
    pub started: bool,
    /// Both tracks concluded (or the scan was abandoned on transport
    /// connect failure); set exactly once
    pub finished: bool,
    /// SOCKS4 track progress
    pub v4: V4Track,
    /// SOCKS5 track progress
    pub v5: V5Track,
}

impl TargetStatus {
    /// Advance the SOCKS4 track
    pub fn advance_v4(&mut self, next: V4Track) {
        debug_assert!(next.rank() >= self.v4.rank());
        self.v4 = next;
    }

    /// Advance the SOCKS5 track
    pub fn advance_v5(&mut self, next: V5Track) {
        debug_assert!(next.rank() >= self.v5.rank());
        self.v5 = next;
    }

    /// Mark the target finished; idempotence is a caller bug
    pub fn finish(&mut self) {
        debug_assert!(!self.finished);
        self.finished = true;
    }
}

/// One candidate proxy host
#[derive(Debug, Clone)]
pub struct Target {
    /// Address to probe
    pub addr: Ipv4Addr,
    /// Port to probe
    pub port: u16,
    /// Lifecycle state, mutated only by the scan engine
    pub status: TargetStatus,
}

/// Sorted, deduplicated collection of scan targets
///
/// Keyed by address, so iteration order is ascending address order and
/// duplicate additions collapse for free. Targets are never removed
/// while the process runs.
#[derive(Debug)]
pub struct TargetStore {
    targets: BTreeMap<Ipv4Addr, Target>,
    default_port: u16,
}

impl Default for TargetStore {
    fn default() -> Self {
        Self::new(SOCKS_PORT)
    }
}

impl TargetStore {
    /// Create an empty store; added targets get `default_port`
    pub fn new(default_port: u16) -> Self {
        TargetStore {
            targets: BTreeMap::new(),
            default_port,
        }
    }

    /// Add a single address; returns false if it was already present
    pub fn insert(&mut self, addr: Ipv4Addr) -> bool {
        let port = self.default_port;
        match self.targets.entry(addr) {
            std::collections::btree_map::Entry::Occupied(_) => false,
            std::collections::btree_map::Entry::Vacant(e) => {
                e.insert(Target {
                    addr,
                    port,
                    status: TargetStatus::default(),
                });
                true
            }
        }
    }

    /// Number of targets loaded
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// Whether no targets are loaded
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Number of targets not yet finished
    pub fn remaining(&self) -> usize {
        self.targets.values().filter(|t| !t.status.finished).count()
    }

    /// Number of targets finished
    pub fn finished(&self) -> usize {
        self.targets.values().filter(|t| t.status.finished).count()
    }

    /// Pull the lowest-addressed target that has not been attempted,
    /// marking it started
    pub fn next_unattempted(&mut self) -> Option<(Ipv4Addr, u16)> {
        let target = self.targets.values_mut().find(|t| !t.status.started)?;
        target.status.started = true;
        Some((target.addr, target.port))
    }

    /// Apply a monotonic status update to one target
    pub fn mark<F>(&mut self, addr: Ipv4Addr, f: F)
    where
        F: FnOnce(&mut TargetStatus),
    {
        if let Some(target) = self.targets.get_mut(&addr) {
            f(&mut target.status);
        }
    }

    /// Iterate targets in ascending address order
    pub fn iter(&self) -> impl Iterator<Item = &Target> {
        self.targets.values()
    }
}
