//! Hostname resolution cache (C6).
//!
//! An append-only cache of hostname-to-address mappings. There is no
//! eviction and no TTL: once a hostname resolves, the mapping is good for
//! the lifetime of the process. Lookups are a linear scan, which is fine at
//! the scale this proxy is built for and mirrors the original's
//! linked-list cache.

use crate::error::ResolveError;
use dns_lookup::lookup_host;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Mutex;
use tokio::task;

#[derive(Debug, Clone)]
pub struct Entry {
    pub host: String,
    pub ip: Ipv4Addr,
}

#[derive(Default)]
pub struct ResolverCache {
    entries: Mutex<Vec<Entry>>,
}

impl ResolverCache {
    pub fn new() -> ResolverCache {
        ResolverCache { entries: Mutex::new(Vec::new()) }
    }

    fn find(&self, host: &str) -> Option<Ipv4Addr> {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .find(|e| e.host == host)
            .map(|e| e.ip)
    }

    fn insert(&self, host: &str, ip: Ipv4Addr) {
        let mut entries = self.entries.lock().unwrap();
        if entries.iter().any(|e| e.host == host) {
            return;
        }
        entries.push(Entry { host: host.to_string(), ip });
    }

    /// Resolves `host` to a loopback-or-routable IPv4 address and port 80,
    /// consulting (and populating) the cache. The actual DNS call runs on a
    /// blocking-pool thread so it cannot stall sibling connections on the
    /// single-threaded reactor.
    pub async fn resolve(&self, host: &str) -> Result<SocketAddr, ResolveError> {
        if let Some(ip) = self.find(host) {
            return Ok(SocketAddr::new(IpAddr::V4(ip), 80));
        }

        let host_owned = host.to_string();
        let addrs = task::spawn_blocking(move || lookup_host(&host_owned))
            .await
            .expect("resolver blocking task panicked")
            .map_err(ResolveError::Lookup)?;

        let ip = addrs
            .into_iter()
            .find_map(|addr| match addr {
                IpAddr::V4(v4) => Some(v4),
                IpAddr::V6(_) => None,
            })
            .ok_or(ResolveError::NoAddress)?;

        self.insert(host, ip);
        Ok(SocketAddr::new(IpAddr::V4(ip), 80))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_rejects_duplicate_insert() {
        let cache = ResolverCache::new();
        cache.insert("example.com", Ipv4Addr::new(1, 2, 3, 4));
        cache.insert("example.com", Ipv4Addr::new(9, 9, 9, 9));
        assert_eq!(cache.find("example.com"), Some(Ipv4Addr::new(1, 2, 3, 4)));
    }

    #[test]
    fn cache_miss_returns_none() {
        let cache = ResolverCache::new();
        assert_eq!(cache.find("nowhere.example"), None);
    }
}
