//! SOCKS4 negotiation codec
//!
//! Pure, connection-agnostic encoding of the SOCKS4 connect request and
//! decoding of its reply. The scan engine owns all I/O and scheduling.

use crate::error::{SocksError, V4Status};
use crate::socks::consts::*;
use bytes::BufMut;
use std::net::SocketAddrV4;

/// Build a SOCKS4 CONNECT request
///
/// # Request format
///
/// ```text
/// +----+-----+----------+---------+----------+------+
/// |VER | CMD | DST.PORT | DST.IP  |  USERID  | NULL |
/// +----+-----+----------+---------+----------+------+
/// | 1  |  1  |    2     |    4    | Variable |  1   |
/// +----+-----+----------+---------+----------+------+
/// ```
///
/// `dest` is the bounce destination the proxy is asked to relay to.
/// The user-id is truncated so the request fits the fixed request
/// buffer, NUL included.
pub fn connect_request(dest: SocketAddrV4, user: &str) -> Vec<u8> {
    let max_user = SOCKS4_REQUEST_BUF - 8 - 1;
    let user = user.as_bytes();
    let user = &user[..user.len().min(max_user)];

    let mut req = Vec::with_capacity(8 + user.len() + 1);
    req.put_u8(SOCKS4_VERSION);
    req.put_u8(CMD_CONNECT);
    req.put_u16(dest.port());
    req.put_slice(&dest.ip().octets());
    req.put_slice(user);
    req.put_u8(0);
    req
}

/// Decode a SOCKS4 CONNECT reply
///
/// # Reply format
///
/// ```text
/// +------+--------+----------+---------+
/// | NULL | STATUS | DST.PORT | DST.IP  |
/// +------+--------+----------+---------+
/// |  1   |   1    |    2     |    4    |
/// +------+--------+----------+---------+
/// ```
///
/// Only the status byte decides the outcome; 90 grants the request and
/// every other value maps through the fixed [`V4Status`] error table.
pub fn parse_connect_reply(buf: &[u8]) -> Result<(), SocksError> {
    if buf.len() < 2 {
        return Err(SocksError::TruncatedReply {
            need: 2,
            got: buf.len(),
        });
    }
    match V4Status::from_byte(buf[1]) {
        V4Status::Granted => Ok(()),
        status => Err(SocksError::V4Rejected(status)),
    }
}
