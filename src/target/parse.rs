//! Target specification parsing
//!
//! A target spec is a dotted IPv4 address, a hostname, or a CIDR block.
//! CIDR blocks expand to their usable hosts (the all-zero and all-ones
//! host suffixes are excluded; /31 and /32 expand to their literal
//! addresses). Hostnames resolve to every IPv4 record.

use crate::error::ScanError;
use crate::target::TargetStore;
use ipnet::Ipv4Net;
use std::net::{IpAddr, Ipv4Addr};
use std::path::Path;
use tokio::net::lookup_host;
use tracing::{debug, trace};

/// Add one target spec to the store; returns the number of new targets
pub async fn add_spec(store: &mut TargetStore, spec: &str) -> Result<usize, ScanError> {
    trace!("add_spec({:?})", spec);

    if spec.contains('/') {
        return add_cidr(store, spec);
    }

    if let Ok(addr) = spec.parse::<Ipv4Addr>() {
        return Ok(usize::from(store.insert(addr)));
    }

    add_hostname(store, spec).await
}

/// Load target specs from a file, one per line
///
/// Blank lines are skipped; trailing CR/LF is stripped. Any invalid
/// line aborts the load.
pub async fn load_file(store: &mut TargetStore, path: &Path) -> Result<usize, ScanError> {
    let content = tokio::fs::read_to_string(path).await.map_err(|e| {
        ScanError::Target(format!("unable to load targets from {:?}: {}", path, e))
    })?;

    let mut added = 0;
    for line in content.lines() {
        let line = line.trim_end_matches('\r');
        if line.is_empty() {
            continue;
        }
        added += add_spec(store, line).await?;
    }
    debug!("loaded {} targets from {:?}", added, path);
    Ok(added)
}

fn add_cidr(store: &mut TargetStore, spec: &str) -> Result<usize, ScanError> {
    let net: Ipv4Net = spec
        .parse()
        .map_err(|_| ScanError::Target(format!("invalid CIDR block: {}", spec)))?;

    let mut added = 0;
    for addr in net.hosts() {
        added += usize::from(store.insert(addr));
    }
    Ok(added)
}

async fn add_hostname(store: &mut TargetStore, host: &str) -> Result<usize, ScanError> {
    // Port is only needed to satisfy the resolver interface.
    let addrs = lookup_host((host, 0))
        .await
        .map_err(|_| ScanError::Target(format!("invalid host/ip: {}", host)))?;

    let mut added = 0;
    for addr in addrs {
        if let IpAddr::V4(v4) = addr.ip() {
            added += usize::from(store.insert(v4));
        }
    }
    if added == 0 {
        return Err(ScanError::Resolve(host.to_string()));
    }
    Ok(added)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_add_single_ip() {
        let mut store = TargetStore::new(1080);
        let n = add_spec(&mut store, "10.0.0.5").await.unwrap();
        assert_eq!(n, 1);
        assert_eq!(store.iter().next().unwrap().addr, Ipv4Addr::new(10, 0, 0, 5));
    }

    #[tokio::test]
    async fn test_add_duplicate_ip() {
        let mut store = TargetStore::new(1080);
        add_spec(&mut store, "10.0.0.5").await.unwrap();
        let n = add_spec(&mut store, "10.0.0.5").await.unwrap();
        assert_eq!(n, 0);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_cidr_excludes_base_and_broadcast() {
        let mut store = TargetStore::new(1080);
        let n = add_spec(&mut store, "10.0.0.0/30").await.unwrap();
        assert_eq!(n, 2);
        let addrs: Vec<_> = store.iter().map(|t| t.addr).collect();
        assert_eq!(
            addrs,
            vec![Ipv4Addr::new(10, 0, 0, 1), Ipv4Addr::new(10, 0, 0, 2)]
        );
    }

    #[tokio::test]
    async fn test_cidr_host_route() {
        let mut store = TargetStore::new(1080);
        let n = add_spec(&mut store, "10.0.0.5/32").await.unwrap();
        assert_eq!(n, 1);
        assert_eq!(store.iter().next().unwrap().addr, Ipv4Addr::new(10, 0, 0, 5));
    }

    #[tokio::test]
    async fn test_cidr_24_count() {
        let mut store = TargetStore::new(1080);
        let n = add_spec(&mut store, "192.0.2.0/24").await.unwrap();
        assert_eq!(n, 254);
    }

    #[tokio::test]
    async fn test_invalid_cidr() {
        let mut store = TargetStore::new(1080);
        let err = add_spec(&mut store, "10.0.0.0/33").await.unwrap_err();
        assert!(matches!(err, ScanError::Target(_)));
    }

    #[tokio::test]
    async fn test_load_file_skips_blank_lines() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "10.0.0.1\r\n\r\n10.0.0.2\n\n10.0.0.0/30\n").unwrap();

        let mut store = TargetStore::new(1080);
        let n = load_file(&mut store, file.path()).await.unwrap();
        // 10.0.0.1 and 10.0.0.2 overlap with the /30 expansion
        assert_eq!(n, 2);
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn test_load_file_missing() {
        let mut store = TargetStore::new(1080);
        let err = load_file(&mut store, Path::new("/nonexistent/targets.txt"))
            .await
            .unwrap_err();
        assert!(matches!(err, ScanError::Target(_)));
    }
}
