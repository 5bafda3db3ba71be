//! SOCKS5 negotiation codec
//!
//! Pure encoding/decoding for the three SOCKS5 exchanges the scanner can
//! meet: the auth method negotiation, the RFC 1929 username/password
//! sub-negotiation, and the CONNECT request/reply. No I/O happens here.

use crate::error::{SocksError, V5Status};
use crate::socks::consts::*;
use bytes::BufMut;
use std::net::{Ipv4Addr, SocketAddrV4};

/// Authentication method selected by the server
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMethod {
    /// No authentication required
    None,
    /// Username/password authentication required
    Password,
}

/// Bound address reported in a successful CONNECT reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoundAddr {
    /// IPv4 address and port
    V4(SocketAddrV4),
    /// Domain name and port
    Domain(String, u16),
    /// IPv6; accepted but not decoded into a display form
    V6,
}

/// Build the auth method proposal
///
/// ```text
/// +----+----------+----------+
/// |VER | NMETHODS | METHODS  |
/// +----+----------+----------+
/// | 1  |    1     | 1 to 255 |
/// +----+----------+----------+
/// ```
///
/// The scanner always advertises exactly no-auth and username/password.
pub fn auth_request() -> [u8; 4] {
    [
        SOCKS5_VERSION,
        2,
        SOCKS5_AUTH_METHOD_NONE,
        SOCKS5_AUTH_METHOD_PASSWORD,
    ]
}

/// Decode the auth method selection reply
///
/// ```text
/// +----+--------+
/// |VER | METHOD |
/// +----+--------+
/// | 1  |   1    |
/// +----+--------+
/// ```
///
/// A `[0x00, 0x5B]` reply is a SOCKS4 rejection of our proposal bytes:
/// the peer is a SOCKS4 server, and is classified as such rather than as
/// a generic parse failure.
pub fn parse_auth_reply(buf: &[u8]) -> Result<AuthMethod, SocksError> {
    if buf.len() < 2 {
        return Err(SocksError::TruncatedReply {
            need: 2,
            got: buf.len(),
        });
    }
    if buf[0] == 0 && buf[1] == SOCKS4_REPLY_REJECTED {
        return Err(SocksError::SocksV4Server);
    }
    match buf[1] {
        SOCKS5_AUTH_METHOD_NONE => Ok(AuthMethod::None),
        SOCKS5_AUTH_METHOD_PASSWORD => Ok(AuthMethod::Password),
        other => Err(SocksError::UnsupportedAuthMethod(other)),
    }
}

/// Build a username/password sub-negotiation request
///
/// ```text
/// +----+------+----------+------+----------+
/// |VER | ULEN |  UNAME   | PLEN |  PASSWD  |
/// +----+------+----------+------+----------+
/// | 1  |  1   | 1 to 255 |  1   | 1 to 255 |
/// +----+------+----------+------+----------+
/// ```
///
/// Both credentials must be non-empty and at most 255 bytes; anything
/// else is rejected locally before any I/O.
pub fn userpass_request(user: &str, pass: &str) -> Result<Vec<u8>, SocksError> {
    if user.is_empty()
        || user.len() > MAX_CREDENTIAL_LEN
        || pass.is_empty()
        || pass.len() > MAX_CREDENTIAL_LEN
    {
        return Err(SocksError::BadCredentials);
    }

    let mut req = Vec::with_capacity(3 + user.len() + pass.len());
    req.put_u8(SOCKS5_AUTH_VERSION);
    req.put_u8(user.len() as u8);
    req.put_slice(user.as_bytes());
    req.put_u8(pass.len() as u8);
    req.put_slice(pass.as_bytes());
    Ok(req)
}

/// Decode a username/password sub-negotiation reply
///
/// Status 0 means the credentials were accepted.
pub fn parse_userpass_reply(buf: &[u8]) -> Result<(), SocksError> {
    if buf.len() < 2 {
        return Err(SocksError::TruncatedReply {
            need: 2,
            got: buf.len(),
        });
    }
    if buf[1] != 0 {
        return Err(SocksError::CredentialsRejected);
    }
    Ok(())
}

/// Build a SOCKS5 CONNECT request for an IPv4 bounce destination
///
/// ```text
/// +----+-----+-------+------+----------+----------+
/// |VER | CMD |  RSV  | ATYP | DST.ADDR | DST.PORT |
/// +----+-----+-------+------+----------+----------+
/// | 1  |  1  | X'00' |  1   |    4     |    2     |
/// +----+-----+-------+------+----------+----------+
/// ```
pub fn connect_request(dest: SocketAddrV4) -> [u8; 10] {
    let ip = dest.ip().octets();
    let port = dest.port().to_be_bytes();
    [
        SOCKS5_VERSION,
        CMD_CONNECT,
        SOCKS5_RESERVED,
        SOCKS5_ADDR_TYPE_IPV4,
        ip[0],
        ip[1],
        ip[2],
        ip[3],
        port[0],
        port[1],
    ]
}

/// Decode a SOCKS5 CONNECT reply
///
/// ```text
/// +----+-----+-------+------+----------+----------+
/// |VER | REP |  RSV  | ATYP | BND.ADDR | BND.PORT |
/// +----+-----+-------+------+----------+----------+
/// | 1  |  1  | X'00' |  1   | Variable |    2     |
/// +----+-----+-------+------+----------+----------+
/// ```
///
/// The version byte must be 5, the status byte must be 0, and the bound
/// address is decoded per its type. Every field access is length-checked
/// so hostile input can only produce a decode error.
pub fn parse_connect_reply(buf: &[u8]) -> Result<BoundAddr, SocksError> {
    if buf.len() < 4 {
        return Err(SocksError::TruncatedReply {
            need: 4,
            got: buf.len(),
        });
    }
    if buf[0] != SOCKS5_VERSION {
        return Err(SocksError::NotSocksV5);
    }
    match V5Status::from_byte(buf[1]) {
        V5Status::Succeeded => {}
        status => return Err(SocksError::V5Rejected(status)),
    }

    match buf[3] {
        SOCKS5_ADDR_TYPE_IPV4 => {
            if buf.len() < 10 {
                return Err(SocksError::TruncatedReply {
                    need: 10,
                    got: buf.len(),
                });
            }
            let ip = Ipv4Addr::new(buf[4], buf[5], buf[6], buf[7]);
            let port = u16::from_be_bytes([buf[8], buf[9]]);
            Ok(BoundAddr::V4(SocketAddrV4::new(ip, port)))
        }
        SOCKS5_ADDR_TYPE_DOMAIN => {
            if buf.len() < 5 {
                return Err(SocksError::TruncatedReply {
                    need: 5,
                    got: buf.len(),
                });
            }
            let len = buf[4] as usize;
            let need = 5 + len + 2;
            if buf.len() < need {
                return Err(SocksError::TruncatedReply {
                    need,
                    got: buf.len(),
                });
            }
            let name = String::from_utf8_lossy(&buf[5..5 + len]).into_owned();
            let port = u16::from_be_bytes([buf[5 + len], buf[6 + len]]);
            Ok(BoundAddr::Domain(name, port))
        }
        SOCKS5_ADDR_TYPE_IPV6 => Ok(BoundAddr::V6),
        other => Err(SocksError::UnknownAddrType(other)),
    }
}
