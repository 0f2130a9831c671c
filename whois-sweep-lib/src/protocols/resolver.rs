//! Hostname resolution for WHOIS servers.
//!
//! Every query resolves its server again: registries rotate WHOIS hosts
//! through round-robin DNS, so addresses are never pinned or cached.

use crate::error::DomainCheckError;
use async_trait::async_trait;
use std::fmt;
use std::io;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

/// Backend that turns a hostname into candidate addresses.
///
/// The production backend asks the system resolver; tests substitute a
/// static table so exchanges can target local mock servers.
#[async_trait]
pub trait HostLookup: Send + Sync {
    async fn lookup(&self, host: &str) -> io::Result<Vec<IpAddr>>;
}

/// Lookup through the operating system resolver (`getaddrinfo`).
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemLookup;

#[async_trait]
impl HostLookup for SystemLookup {
    async fn lookup(&self, host: &str) -> io::Result<Vec<IpAddr>> {
        let addrs = tokio::net::lookup_host((host, 0)).await?;
        Ok(addrs.map(|addr| addr.ip()).collect())
    }
}

/// Resolver with a dedicated lookup timeout.
#[derive(Clone)]
pub struct Resolver {
    lookup: Arc<dyn HostLookup>,
    timeout: Duration,
}

impl Resolver {
    /// System resolver with the default 5 second budget.
    pub fn new() -> Self {
        Self::with_timeout(Duration::from_secs(5))
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_lookup(Arc::new(SystemLookup), timeout)
    }

    /// Use a custom lookup backend.
    pub fn with_lookup(lookup: Arc<dyn HostLookup>, timeout: Duration) -> Self {
        Self { lookup, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Resolve `host` to a single address, preferring IPv4.
    ///
    /// # Errors
    ///
    /// Returns `DomainCheckError::Resolution` if the lookup fails, returns no
    /// addresses, or does not finish within the timeout.
    pub async fn resolve(&self, host: &str) -> Result<IpAddr, DomainCheckError> {
        let addrs = tokio::time::timeout(self.timeout, self.lookup.lookup(host))
            .await
            .map_err(|_| DomainCheckError::resolution_timeout(host, self.timeout))?
            .map_err(|e| DomainCheckError::resolution(host, e.to_string()))?;

        pick_address(&addrs)
            .ok_or_else(|| DomainCheckError::resolution(host, "no addresses returned"))
    }
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Resolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolver")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

fn pick_address(addrs: &[IpAddr]) -> Option<IpAddr> {
    addrs
        .iter()
        .find(|addr| addr.is_ipv4())
        .or_else(|| addrs.first())
        .copied()
}
