//! Error types for sockscout
//!
//! This module defines all custom error types used throughout the scanner.

use crate::socks::consts::*;
use std::fmt;
use std::io;
use thiserror::Error;

/// Main error type for scan setup and orchestration
#[derive(Error, Debug)]
pub enum ScanError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid target specification (bad IP, hostname, or CIDR)
    #[error("Invalid target: {0}")]
    Target(String),

    /// Hostname resolution failure
    #[error("Unable to resolve: {0}")]
    Resolve(String),

    /// SOCKS negotiation error
    #[error("SOCKS error: {0}")]
    Socks(#[from] SocksError),
}

/// SOCKS protocol negotiation errors
///
/// Every variant maps to one operator-visible failure line; the display
/// strings are the fixed taxonomy carried by the wire-protocol reply
/// tables.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SocksError {
    /// Reply shorter than the fixed header it must carry
    #[error("truncated reply: got {got} bytes, need at least {need}")]
    TruncatedReply {
        /// Minimum byte count the decoder requires
        need: usize,
        /// Byte count actually received
        got: usize,
    },

    /// SOCKS4 server refused the connect request
    #[error("unable to connect through proxy: {0}")]
    V4Rejected(V4Status),

    /// Peer answered a SOCKS5 auth proposal with a SOCKS4 reply
    #[error("this is a SOCKS v4 server!")]
    SocksV4Server,

    /// SOCKS5 server selected an auth method we do not speak
    #[error("server wants type 0x{0:02x} authentication")]
    UnsupportedAuthMethod(u8),

    /// Reply version byte was not 5
    #[error("this is not a SOCKS v5 proxy")]
    NotSocksV5,

    /// SOCKS5 server refused the connect request
    #[error("unable to connect through proxy: {0}")]
    V5Rejected(V5Status),

    /// Local username/password validation failed before any I/O
    #[error("missing or invalid user/pass")]
    BadCredentials,

    /// Server rejected the username/password pair
    #[error("invalid user/pass")]
    CredentialsRejected,

    /// SOCKS5 connect reply carried an unknown bound-address type
    #[error("unknown address type: 0x{0:02x}")]
    UnknownAddrType(u8),
}

/// SOCKS4 connect reply status codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum V4Status {
    /// Request granted (90)
    Granted,
    /// Request rejected or failed (91)
    Rejected,
    /// Identd on the client could not be reached (92)
    NoIdentd,
    /// Identd response did not match the reported username (93)
    IdentdMismatch,
    /// Any other status byte
    Unknown(u8),
}

impl V4Status {
    /// Classify a raw SOCKS4 reply status byte
    pub fn from_byte(b: u8) -> Self {
        match b {
            SOCKS4_REPLY_GRANTED => V4Status::Granted,
            SOCKS4_REPLY_REJECTED => V4Status::Rejected,
            SOCKS4_REPLY_NO_IDENTD => V4Status::NoIdentd,
            SOCKS4_REPLY_IDENTD_MISMATCH => V4Status::IdentdMismatch,
            other => V4Status::Unknown(other),
        }
    }
}

impl fmt::Display for V4Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            V4Status::Granted => write!(f, "Request granted"),
            V4Status::Rejected => write!(f, "Rejected or failed"),
            V4Status::NoIdentd => write!(f, "Unable to connect to identd on client"),
            V4Status::IdentdMismatch => {
                write!(f, "Client identd response != reported username")
            }
            V4Status::Unknown(n) => write!(f, "Unknown error #{}", n),
        }
    }
}

/// SOCKS5 connect reply status codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum V5Status {
    /// Succeeded (0x00)
    Succeeded,
    /// General SOCKS server failure (0x01)
    GeneralFailure,
    /// Connection not allowed by ruleset (0x02)
    NotAllowed,
    /// Network unreachable (0x03)
    NetworkUnreachable,
    /// Host unreachable (0x04)
    HostUnreachable,
    /// Connection refused (0x05)
    ConnectionRefused,
    /// TTL expired (0x06)
    TtlExpired,
    /// Command not supported (0x07)
    BadCommand,
    /// Address type not supported (0x08)
    BadAddress,
    /// Any other status byte
    Unknown(u8),
}

impl V5Status {
    /// Classify a raw SOCKS5 reply status byte
    pub fn from_byte(b: u8) -> Self {
        match b {
            SOCKS5_REPLY_SUCCEEDED => V5Status::Succeeded,
            SOCKS5_REPLY_GENERAL_FAILURE => V5Status::GeneralFailure,
            SOCKS5_REPLY_NOT_ALLOWED => V5Status::NotAllowed,
            SOCKS5_REPLY_NETWORK_UNREACHABLE => V5Status::NetworkUnreachable,
            SOCKS5_REPLY_HOST_UNREACHABLE => V5Status::HostUnreachable,
            SOCKS5_REPLY_CONNECTION_REFUSED => V5Status::ConnectionRefused,
            SOCKS5_REPLY_TTL_EXPIRED => V5Status::TtlExpired,
            SOCKS5_REPLY_BAD_COMMAND => V5Status::BadCommand,
            SOCKS5_REPLY_BAD_ADDRESS => V5Status::BadAddress,
            other => V5Status::Unknown(other),
        }
    }
}

impl fmt::Display for V5Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            V5Status::Succeeded => write!(f, "Succeeded"),
            V5Status::GeneralFailure => write!(f, "Rejected or failed"),
            V5Status::NotAllowed => write!(f, "Connection not allowed by ruleset"),
            V5Status::NetworkUnreachable => write!(f, "Network unreachable"),
            V5Status::HostUnreachable => write!(f, "Host unreachable"),
            V5Status::ConnectionRefused => write!(f, "Connection refused"),
            V5Status::TtlExpired => write!(f, "Time to live expired"),
            V5Status::BadCommand => write!(f, "Bad command"),
            V5Status::BadAddress => write!(f, "Bad address"),
            V5Status::Unknown(n) => write!(f, "Unknown error #{}", n),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_v4_status_from_byte() {
        assert_eq!(V4Status::from_byte(90), V4Status::Granted);
        assert_eq!(V4Status::from_byte(91), V4Status::Rejected);
        assert_eq!(V4Status::from_byte(92), V4Status::NoIdentd);
        assert_eq!(V4Status::from_byte(93), V4Status::IdentdMismatch);
        assert_eq!(V4Status::from_byte(42), V4Status::Unknown(42));
    }

    #[test]
    fn test_v4_status_display() {
        assert_eq!(V4Status::Rejected.to_string(), "Rejected or failed");
        assert_eq!(
            V4Status::NoIdentd.to_string(),
            "Unable to connect to identd on client"
        );
        assert_eq!(
            V4Status::IdentdMismatch.to_string(),
            "Client identd response != reported username"
        );
        assert_eq!(V4Status::Unknown(99).to_string(), "Unknown error #99");
    }

    #[test]
    fn test_v5_status_from_byte() {
        assert_eq!(V5Status::from_byte(0x00), V5Status::Succeeded);
        assert_eq!(V5Status::from_byte(0x01), V5Status::GeneralFailure);
        assert_eq!(V5Status::from_byte(0x02), V5Status::NotAllowed);
        assert_eq!(V5Status::from_byte(0x03), V5Status::NetworkUnreachable);
        assert_eq!(V5Status::from_byte(0x04), V5Status::HostUnreachable);
        assert_eq!(V5Status::from_byte(0x05), V5Status::ConnectionRefused);
        assert_eq!(V5Status::from_byte(0x06), V5Status::TtlExpired);
        assert_eq!(V5Status::from_byte(0x07), V5Status::BadCommand);
        assert_eq!(V5Status::from_byte(0x08), V5Status::BadAddress);
        assert_eq!(V5Status::from_byte(0x09), V5Status::Unknown(9));
    }

    #[test]
    fn test_v5_status_display() {
        assert_eq!(
            V5Status::NetworkUnreachable.to_string(),
            "Network unreachable"
        );
        assert_eq!(V5Status::Unknown(9).to_string(), "Unknown error #9");
        assert_eq!(
            V5Status::NotAllowed.to_string(),
            "Connection not allowed by ruleset"
        );
    }

    #[test]
    fn test_socks_error_display() {
        let err = SocksError::SocksV4Server;
        assert_eq!(format!("{}", err), "this is a SOCKS v4 server!");

        let err = SocksError::NotSocksV5;
        assert_eq!(format!("{}", err), "this is not a SOCKS v5 proxy");

        let err = SocksError::UnsupportedAuthMethod(0xff);
        assert_eq!(format!("{}", err), "server wants type 0xff authentication");

        let err = SocksError::V5Rejected(V5Status::HostUnreachable);
        assert_eq!(
            format!("{}", err),
            "unable to connect through proxy: Host unreachable"
        );

        let err = SocksError::V4Rejected(V4Status::Rejected);
        assert_eq!(
            format!("{}", err),
            "unable to connect through proxy: Rejected or failed"
        );

        let err = SocksError::TruncatedReply { need: 2, got: 1 };
        assert_eq!(
            format!("{}", err),
            "truncated reply: got 1 bytes, need at least 2"
        );
    }

    #[test]
    fn test_scan_error_from_io() {
        let io_err = io::Error::new(io::ErrorKind::Other, "io error");
        let err: ScanError = io_err.into();
        assert!(matches!(err, ScanError::Io(_)));
    }

    #[test]
    fn test_scan_error_from_socks() {
        let err: ScanError = SocksError::NotSocksV5.into();
        assert!(matches!(err, ScanError::Socks(_)));
    }
}
