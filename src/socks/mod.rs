//! SOCKS wire-protocol codecs
//!
//! Pure request encoders and reply decoders for SOCKS v4 and v5. The
//! codecs know nothing about sockets or scheduling; the scan engine
//! feeds them bytes and acts on the results.

pub mod consts;
pub mod v4;
pub mod v5;

pub use v5::{AuthMethod, BoundAddr};
