//! Decides which reads count towards the daily access statistics.

use std::net::IpAddr;

use ipnet::IpNet;

/// Address-range check excluding the operator's own traffic from the counters.
#[derive(Debug, Clone, Default)]
pub struct AccessPolicy {
    excluded: Vec<IpNet>,
}

impl AccessPolicy {
    /// Build a policy excluding the given networks.
    #[must_use]
    pub fn new(excluded: Vec<IpNet>) -> Self {
        Self { excluded }
    }

    /// Whether a read from `client` should be counted.
    ///
    /// Unknown clients are not counted. IPv4-mapped IPv6 addresses are matched
    /// against the IPv4 networks.
    #[must_use]
    pub fn counts(&self, client: Option<IpAddr>) -> bool {
        let Some(addr) = client else {
            return false;
        };
        let addr = match addr {
            IpAddr::V6(v6) => v6.to_ipv4_mapped().map_or(addr, IpAddr::V4),
            IpAddr::V4(_) => addr,
        };
        !self.excluded.iter().any(|net| net.contains(&addr))
    }
}
