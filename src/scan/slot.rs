//! Slot worker: the per-target negotiation state machine
//!
//! Each slot repeatedly pulls the next unattempted target and drives it
//! through the SOCKS4 track and then, when the SOCKS4 transport connect
//! succeeded, the SOCKS5 track. Every phase carries its own timeout
//! budget; a phase failure ends the current track (or, for transport
//! connect failures, the whole target) without disturbing the rest of
//! the scan. Each track opens its own fresh connection.

use crate::scan::engine::ScanOptions;
use crate::scan::event::{EventKind, Proto, ScanEvent};
use crate::socks::{v4, v5, AuthMethod};
use crate::target::{TargetStatus, TargetStore, V4Track, V5Track};
use std::net::Ipv4Addr;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, Mutex};
use tokio::time;
use tracing::{debug, warn};

/// Reply buffer size; both protocols answer well within this
const REPLY_BUF: usize = 128;

pub(crate) struct SlotWorker {
    pub(crate) index: usize,
    pub(crate) opts: Arc<ScanOptions>,
    pub(crate) store: Arc<Mutex<TargetStore>>,
    pub(crate) events: mpsc::UnboundedSender<ScanEvent>,
}

impl SlotWorker {
    /// Drain the store: pull targets in order until none are left
    pub(crate) async fn run(self) {
        loop {
            let pulled = self.store.lock().await.next_unattempted();
            let Some((addr, port)) = pulled else {
                debug!("slot {} out of targets", self.index);
                break;
            };
            self.emit(addr, None, EventKind::Occupied);

            let transport_ok = self.run_v4(addr, port).await;
            if transport_ok {
                self.run_v5(addr, port).await;
            }

            self.mark(addr, |s| s.finish()).await;
            self.emit(addr, None, EventKind::TargetFinished);
        }
    }

    /// SOCKS4 track; returns whether the transport connect succeeded
    async fn run_v4(&self, addr: Ipv4Addr, port: u16) -> bool {
        let proto = Proto::V4;
        self.mark(addr, |s| s.advance_v4(V4Track::Connecting)).await;
        self.emit(addr, Some(proto), EventKind::Connecting);

        let mut stream = match self.connect(addr, port).await {
            Ok(stream) => stream,
            Err(reason) => {
                self.mark(addr, |s| s.advance_v4(V4Track::Done { successful: false }))
                    .await;
                self.emit(addr, Some(proto), EventKind::Failed(reason));
                return false;
            }
        };
        self.mark(addr, |s| s.advance_v4(V4Track::Connected)).await;
        self.emit(addr, Some(proto), EventKind::Connected);

        let req = v4::connect_request(self.opts.bounce, &self.opts.username);
        if let Err(reason) = self.send(&mut stream, &req, "connect request").await {
            self.end_v4(addr, proto, reason).await;
            return true;
        }
        self.mark(addr, |s| s.advance_v4(V4Track::RequestSent)).await;
        self.emit(addr, Some(proto), EventKind::RequestSent);

        let reply = match self.recv(&mut stream, "connect reply").await {
            Ok(reply) => reply,
            Err(reason) => {
                self.end_v4(addr, proto, reason).await;
                return true;
            }
        };
        self.mark(addr, |s| s.advance_v4(V4Track::ReplyReceived)).await;

        match v4::parse_connect_reply(&reply) {
            Ok(()) => {
                self.mark(addr, |s| s.advance_v4(V4Track::Done { successful: true }))
                    .await;
                self.emit(addr, Some(proto), EventKind::Success);
            }
            Err(err) => self.end_v4(addr, proto, err.to_string()).await,
        }
        true
    }

    /// SOCKS5 track, on its own fresh connection
    async fn run_v5(&self, addr: Ipv4Addr, port: u16) {
        let proto = Proto::V5;
        self.mark(addr, |s| s.advance_v5(V5Track::Connecting)).await;
        self.emit(addr, Some(proto), EventKind::Connecting);

        let mut stream = match self.connect(addr, port).await {
            Ok(stream) => stream,
            Err(reason) => {
                self.end_v5(addr, proto, reason).await;
                return;
            }
        };
        self.mark(addr, |s| s.advance_v5(V5Track::Connected)).await;
        self.emit(addr, Some(proto), EventKind::Connected);

        // Auth method negotiation
        if let Err(reason) = self.send(&mut stream, &v5::auth_request(), "auth proposal").await {
            self.end_v5(addr, proto, reason).await;
            return;
        }
        self.mark(addr, |s| s.advance_v5(V5Track::AuthRequestSent))
            .await;
        self.emit(addr, Some(proto), EventKind::AuthRequestSent);

        let reply = match self.recv(&mut stream, "auth reply").await {
            Ok(reply) => reply,
            Err(reason) => {
                self.end_v5(addr, proto, reason).await;
                return;
            }
        };
        self.mark(addr, |s| s.advance_v5(V5Track::AuthReplyReceived))
            .await;

        match v5::parse_auth_reply(&reply) {
            Ok(AuthMethod::None) => {
                self.mark(addr, |s| s.advance_v5(V5Track::AuthNoneOk)).await;
                self.emit(addr, Some(proto), EventKind::AuthNoneOk);
            }
            Ok(AuthMethod::Password) => {
                // Capability discovered; credentials are never sent.
                self.mark(addr, |s| s.advance_v5(V5Track::PasswordRequired))
                    .await;
                self.emit(addr, Some(proto), EventKind::PasswordRequired);
                return;
            }
            Err(err) => {
                self.end_v5(addr, proto, err.to_string()).await;
                return;
            }
        }

        // Connect request through the proxy to the bounce destination
        let req = v5::connect_request(self.opts.bounce);
        if let Err(reason) = self.send(&mut stream, &req, "connect request").await {
            self.end_v5(addr, proto, reason).await;
            return;
        }
        self.mark(addr, |s| s.advance_v5(V5Track::RequestSent)).await;
        self.emit(addr, Some(proto), EventKind::RequestSent);

        let reply = match self.recv(&mut stream, "connect reply").await {
            Ok(reply) => reply,
            Err(reason) => {
                self.end_v5(addr, proto, reason).await;
                return;
            }
        };
        self.mark(addr, |s| s.advance_v5(V5Track::ReplyReceived)).await;

        match v5::parse_connect_reply(&reply) {
            Ok(bound) => {
                debug!("slot {} {} v5 bound address: {:?}", self.index, addr, bound);
                self.mark(addr, |s| s.advance_v5(V5Track::Done { successful: true }))
                    .await;
                self.emit(addr, Some(proto), EventKind::Success);
            }
            Err(err) => self.end_v5(addr, proto, err.to_string()).await,
        }
    }

    /// Connect to the target, bounded by the configured timeout
    async fn connect(&self, addr: Ipv4Addr, port: u16) -> Result<TcpStream, String> {
        match time::timeout(self.opts.timeout, TcpStream::connect((addr, port))).await {
            Err(_) => Err("unable to connect: Connection timed out".to_string()),
            Ok(Err(e)) => Err(format!("unable to connect: {}", e)),
            Ok(Ok(stream)) => {
                if let Err(e) = stream.set_nodelay(true) {
                    warn!("failed to set nodelay on {}: {}", addr, e);
                }
                Ok(stream)
            }
        }
    }

    /// Write a request, bounded by the configured timeout
    async fn send(
        &self,
        stream: &mut TcpStream,
        bytes: &[u8],
        what: &str,
    ) -> Result<(), String> {
        match time::timeout(self.opts.timeout, stream.write_all(bytes)).await {
            Err(_) => Err(format!("error writing {}: Connection timed out", what)),
            Ok(Err(e)) => Err(format!("error writing {}: {}", what, e)),
            Ok(Ok(())) => Ok(()),
        }
    }

    /// Read one reply, bounded by the configured timeout
    ///
    /// A zero-byte read means the peer closed the connection and is a
    /// distinct failure reason.
    async fn recv(&self, stream: &mut TcpStream, what: &str) -> Result<Vec<u8>, String> {
        let mut buf = [0u8; REPLY_BUF];
        match time::timeout(self.opts.timeout, stream.read(&mut buf)).await {
            Err(_) => Err(format!("unable to read {}: Connection timed out", what)),
            Ok(Err(e)) => Err(format!("error reading {}: {}", what, e)),
            Ok(Ok(0)) => Err(format!(
                "error reading {}: Remote end closed connection",
                what
            )),
            Ok(Ok(n)) => Ok(buf[..n].to_vec()),
        }
    }

    async fn end_v4(&self, addr: Ipv4Addr, proto: Proto, reason: String) {
        self.mark(addr, |s| s.advance_v4(V4Track::Done { successful: false }))
            .await;
        self.emit(addr, Some(proto), EventKind::Failed(reason));
    }

    async fn end_v5(&self, addr: Ipv4Addr, proto: Proto, reason: String) {
        self.mark(addr, |s| s.advance_v5(V5Track::Done { successful: false }))
            .await;
        self.emit(addr, Some(proto), EventKind::Failed(reason));
    }

    async fn mark<F>(&self, addr: Ipv4Addr, f: F)
    where
        F: FnOnce(&mut TargetStatus),
    {
        self.store.lock().await.mark(addr, f);
    }

    fn emit(&self, addr: Ipv4Addr, proto: Option<Proto>, kind: EventKind) {
        // The receiver outlives the workers; a send failure means the
        // scan is being torn down and the event no longer matters.
        let _ = self.events.send(ScanEvent {
            slot: self.index,
            addr,
            proto,
            kind,
        });
    }
}
