//! Engine settings with the defaults of the hosted deployment.

use std::time::Duration;

use ipnet::IpNet;

/// User agent sent with every page request; some sites block unknown clients.
pub const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/105.0.0.0 Safari/537.36";

/// Tunables shared by the orchestrator and the daily service.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// User agent for page requests and the shared client.
    pub user_agent: String,
    /// Upper bound for each page request.
    pub fetch_timeout: Duration,
    /// Lifetime of the refetch throttle token.
    pub throttle_window: Duration,
    /// Lifetime of the daily cache entry and its counters.
    pub entry_ttl: Duration,
    /// Client networks whose reads are not counted as accesses.
    pub excluded_networks: Vec<IpNet>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            user_agent: USER_AGENT.to_owned(),
            fetch_timeout: Duration::from_secs(20),
            throttle_window: Duration::from_secs(3 * 60),
            entry_ttl: Duration::from_secs(24 * 60 * 60),
            excluded_networks: default_excluded_networks(),
        }
    }
}

fn default_excluded_networks() -> Vec<IpNet> {
    ["127.0.0.0/8", "::1/128"]
        .into_iter()
        .filter_map(|net| net.parse().ok())
        .collect()
}
