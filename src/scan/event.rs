//! Events flowing from slot workers to the reporting loop

use std::fmt;
use std::net::Ipv4Addr;

/// Protocol track label
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Proto {
    /// SOCKS version 4
    V4,
    /// SOCKS version 5
    V5,
}

impl fmt::Display for Proto {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Proto::V4 => write!(f, "v4"),
            Proto::V5 => write!(f, "v5"),
        }
    }
}

/// What happened in a slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    /// Slot picked up a fresh target
    Occupied,
    /// Non-blocking connect initiated
    Connecting,
    /// Transport connection established
    Connected,
    /// Connect request written
    RequestSent,
    /// Auth method proposal written (SOCKS5 only)
    AuthRequestSent,
    /// Server accepted the no-auth method (SOCKS5 only)
    AuthNoneOk,
    /// Server demands username/password; final outcome (SOCKS5 only)
    PasswordRequired,
    /// Track failed; carries the operator-visible reason
    Failed(String),
    /// Proxy granted the relay
    Success,
    /// Target reached FINISHED; accounting only, never printed
    TargetFinished,
}

/// One report from a slot worker
#[derive(Debug, Clone)]
pub struct ScanEvent {
    /// Index of the reporting slot
    pub slot: usize,
    /// Target address
    pub addr: Ipv4Addr,
    /// Protocol track, if the event belongs to one
    pub proto: Option<Proto>,
    /// Event payload
    pub kind: EventKind,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_proto_labels() {
        assert_eq!(Proto::V4.to_string(), "v4");
        assert_eq!(Proto::V5.to_string(), "v5");
    }
}
