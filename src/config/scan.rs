//! Scan configuration types
//!
//! Defines the settings record for a scan run. The record is assembled
//! once (file defaults, then CLI overrides), validated, and never
//! mutated after the scan starts.

use crate::error::ScanError;
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddrV4};
use std::time::Duration;
use tokio::net::lookup_host;

/// Default bounce destination host
pub const DEFAULT_BOUNCE_HOST: &str = "198.108.130.5";
/// Default bounce destination port
pub const DEFAULT_BOUNCE_PORT: u16 = 53;

/// A minute should be more than enough time to connect
fn default_timeout_secs() -> u64 {
    60
}

/// 5 simultaneous probes is a sane default
fn default_parallelism() -> u32 {
    5
}

fn default_remote() -> String {
    format!("{}:{}", DEFAULT_BOUNCE_HOST, DEFAULT_BOUNCE_PORT)
}

fn default_target_port() -> u16 {
    crate::socks::consts::SOCKS_PORT
}

/// Reported username defaults to the running user's name
fn default_username() -> String {
    std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "nobody".to_string())
}

/// Root configuration structure
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    /// Scan settings
    #[serde(default)]
    pub scan: ScanConfig,
}

/// Scan settings record
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ScanConfig {
    /// Number of parallel scan slots (1..=300)
    #[serde(default = "default_parallelism")]
    pub parallelism: u32,

    /// Connect/reply timeout in seconds (1..=600)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Bounce destination, "host[:port]"
    #[serde(default = "default_remote")]
    pub remote: String,

    /// Username reported in SOCKS4 requests
    #[serde(default = "default_username")]
    pub username: String,

    /// Port probed on every target
    #[serde(default = "default_target_port")]
    pub target_port: u16,

    /// Verbosity level
    #[serde(default)]
    pub verbose: u8,
}

impl Default for ScanConfig {
    fn default() -> Self {
        ScanConfig {
            parallelism: default_parallelism(),
            timeout_secs: default_timeout_secs(),
            remote: default_remote(),
            username: default_username(),
            target_port: default_target_port(),
            verbose: 0,
        }
    }
}

impl ScanConfig {
    /// Validate option ranges
    pub fn validate(&self) -> Result<(), ScanError> {
        if self.parallelism < 1 || self.parallelism > 300 {
            return Err(ScanError::Config(format!(
                "invalid slot count value: {}",
                self.parallelism
            )));
        }
        if self.timeout_secs < 1 || self.timeout_secs > 600 {
            return Err(ScanError::Config(format!(
                "invalid timeout value: {}",
                self.timeout_secs
            )));
        }
        if self.target_port == 0 {
            return Err(ScanError::Config("invalid target port: 0".to_string()));
        }
        Ok(())
    }

    /// Connect/reply timeout as a duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Resolve the bounce destination to an IPv4 socket address
    ///
    /// Accepts "host", "host:port", "ip" or "ip:port"; a missing port
    /// falls back to the default bounce port.
    pub async fn resolve_remote(&self) -> Result<SocketAddrV4, ScanError> {
        let (host, port) = split_host_port(&self.remote, DEFAULT_BOUNCE_PORT)?;

        let addrs = lookup_host((host.as_str(), port))
            .await
            .map_err(|_| ScanError::Resolve(self.remote.clone()))?;

        for addr in addrs {
            if let IpAddr::V4(v4) = addr.ip() {
                return Ok(SocketAddrV4::new(v4, addr.port()));
            }
        }
        Err(ScanError::Resolve(self.remote.clone()))
    }
}

/// Split a "host[:port]" spec
fn split_host_port(spec: &str, default_port: u16) -> Result<(String, u16), ScanError> {
    match spec.rsplit_once(':') {
        Some((host, port)) => {
            let port = port
                .parse::<u16>()
                .map_err(|_| ScanError::Config(format!("invalid port in remote: {}", spec)))?;
            Ok((host.to_string(), port))
        }
        None => Ok((spec.to_string(), default_port)),
    }
}
