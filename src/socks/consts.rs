//! SOCKS protocol constants
//!
//! Defines the wire constants used by both protocol versions.

/// SOCKS4 protocol version
pub const SOCKS4_VERSION: u8 = 0x04;

/// SOCKS5 protocol version
pub const SOCKS5_VERSION: u8 = 0x05;

/// SOCKS5 username/password sub-negotiation version
pub const SOCKS5_AUTH_VERSION: u8 = 0x01;

/// Well-known SOCKS port, used as the per-target default
pub const SOCKS_PORT: u16 = 1080;

// Commands (shared byte values across versions)
/// TCP CONNECT command
pub const CMD_CONNECT: u8 = 0x01;

// SOCKS4 reply status codes
/// Request granted
pub const SOCKS4_REPLY_GRANTED: u8 = 90;
/// Request rejected or failed
pub const SOCKS4_REPLY_REJECTED: u8 = 91;
/// Identd on the client could not be reached
pub const SOCKS4_REPLY_NO_IDENTD: u8 = 92;
/// Identd response did not match the reported username
pub const SOCKS4_REPLY_IDENTD_MISMATCH: u8 = 93;

// SOCKS5 authentication methods
/// No authentication required
pub const SOCKS5_AUTH_METHOD_NONE: u8 = 0x00;
/// GSSAPI authentication (never proposed)
pub const SOCKS5_AUTH_METHOD_GSSAPI: u8 = 0x01;
/// Username/password authentication
pub const SOCKS5_AUTH_METHOD_PASSWORD: u8 = 0x02;
/// No acceptable methods
pub const SOCKS5_AUTH_METHOD_NOT_ACCEPTABLE: u8 = 0xFF;

// SOCKS5 address types
/// IPv4 address
pub const SOCKS5_ADDR_TYPE_IPV4: u8 = 0x01;
/// Domain name
pub const SOCKS5_ADDR_TYPE_DOMAIN: u8 = 0x03;
/// IPv6 address
pub const SOCKS5_ADDR_TYPE_IPV6: u8 = 0x04;

// SOCKS5 reply codes
/// Succeeded
pub const SOCKS5_REPLY_SUCCEEDED: u8 = 0x00;
/// General SOCKS server failure
pub const SOCKS5_REPLY_GENERAL_FAILURE: u8 = 0x01;
/// Connection not allowed by ruleset
pub const SOCKS5_REPLY_NOT_ALLOWED: u8 = 0x02;
/// Network unreachable
pub const SOCKS5_REPLY_NETWORK_UNREACHABLE: u8 = 0x03;
/// Host unreachable
pub const SOCKS5_REPLY_HOST_UNREACHABLE: u8 = 0x04;
/// Connection refused
pub const SOCKS5_REPLY_CONNECTION_REFUSED: u8 = 0x05;
/// TTL expired
pub const SOCKS5_REPLY_TTL_EXPIRED: u8 = 0x06;
/// Command not supported
pub const SOCKS5_REPLY_BAD_COMMAND: u8 = 0x07;
/// Address type not supported
pub const SOCKS5_REPLY_BAD_ADDRESS: u8 = 0x08;

// Reserved byte
/// Reserved byte value (always 0x00)
pub const SOCKS5_RESERVED: u8 = 0x00;

// Buffer sizes
/// Maximum username/password length in the sub-negotiation
pub const MAX_CREDENTIAL_LEN: usize = 255;
/// SOCKS4 request buffer size; the user-id is truncated to fit it
pub const SOCKS4_REQUEST_BUF: usize = 512;
