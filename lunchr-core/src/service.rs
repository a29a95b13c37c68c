//! Daily cache and refetch throttle in front of the orchestrator.

use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::access::AccessPolicy;
use crate::config::EngineConfig;
use crate::model::SourceMenu;
use crate::orchestrator::Orchestrator;
use crate::registry::SourceRegistry;
use crate::store::{CacheStore, StoreError};

#[derive(thiserror::Error, Debug)]
/// Failures that reach the caller of [`LunchService::today`].
pub enum ServiceError {
    /// The cache store is the only source of truth; without it there is no answer.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// The cached entry could not be encoded or decoded.
    #[error("Cache entry encoding error: {0}")]
    Encoding(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, Default)]
/// A request for today's menus.
pub struct MenuRequest {
    /// Refetch even when today's entry is cached.
    pub refresh: bool,
    /// Address of the requesting client, used for the access statistics.
    pub client: Option<IpAddr>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Today's menus together with the usage counters.
pub struct DailyMenus {
    /// Unix time of the fetch that produced `menus`.
    pub last_fetch: i64,
    /// Number of full fetches today.
    pub fetch_count: i64,
    /// Number of counted reads today.
    pub access_count: i64,
    /// Unix time of the first counted read today.
    pub first_access: Option<i64>,
    /// One menu per source.
    pub menus: Vec<SourceMenu>,
}

#[derive(Debug, Clone)]
/// Answer of [`LunchService::today`].
pub enum MenuOutcome {
    /// Cached or freshly fetched menus.
    Menus(DailyMenus),
    /// Another refetch ran moments ago; try again later.
    Throttled,
}

/// What is stored under the day key.
#[derive(Debug, Serialize, Deserialize)]
struct CachedEntry {
    last_fetch: i64,
    fetch_count: i64,
    menus: Vec<SourceMenu>,
}

type Clock = Arc<dyn Fn() -> DateTime<Local> + Send + Sync>;

/// Public entry point serving today's menus.
pub struct LunchService {
    registry: Arc<SourceRegistry>,
    orchestrator: Orchestrator,
    store: Arc<dyn CacheStore>,
    policy: AccessPolicy,
    throttle_window: Duration,
    entry_ttl: Duration,
    clock: Clock,
}

impl LunchService {
    /// Create a new service bound to the provided registry and store.
    #[must_use]
    pub fn new(
        registry: Arc<SourceRegistry>,
        orchestrator: Orchestrator,
        store: Arc<dyn CacheStore>,
        config: &EngineConfig,
    ) -> Self {
        Self {
            registry,
            orchestrator,
            store,
            policy: AccessPolicy::new(config.excluded_networks.clone()),
            throttle_window: config.throttle_window,
            entry_ttl: config.entry_ttl,
            clock: Arc::new(Local::now),
        }
    }

    /// Replace the wall clock, e.g. to pin the day in tests.
    #[must_use]
    pub fn with_clock<F>(mut self, clock: F) -> Self
    where
        F: Fn() -> DateTime<Local> + Send + Sync + 'static,
    {
        self.clock = Arc::new(clock);
        self
    }

    /// Sources the service aggregates.
    #[must_use]
    pub fn registry(&self) -> &SourceRegistry {
        &self.registry
    }

    /// Today's menus, fetched at most once per throttle window.
    ///
    /// Serves the cached entry unless it is missing or `request.refresh` is
    /// set. A refetch only runs for the caller that takes the throttle token;
    /// everyone else gets [`MenuOutcome::Throttled`] and the cache stays as it is.
    ///
    /// # Errors
    ///
    /// Returns a [`ServiceError`] when the cache store fails.
    pub async fn today(&self, request: MenuRequest) -> Result<MenuOutcome, ServiceError> {
        let now = (self.clock)();
        let key = day_key(now.date_naive());

        let cached = if request.refresh {
            None
        } else {
            self.store.get(&key).await?
        };

        let entry = match cached {
            Some(raw) => {
                tracing::debug!(key = %key, "serving cached menus");
                serde_json::from_str::<CachedEntry>(&raw)?
            }
            None => match self.refetch(&key, now).await? {
                Some(entry) => entry,
                None => return Ok(MenuOutcome::Throttled),
            },
        };

        if self.policy.counts(request.client) {
            self.record_access(&key, now).await?;
        }

        let (access_count, first_access) = tokio::try_join!(
            self.counter(&key, "access_count"),
            self.counter(&key, "first_access"),
        )?;

        Ok(MenuOutcome::Menus(DailyMenus {
            last_fetch: entry.last_fetch,
            fetch_count: entry.fetch_count,
            access_count: access_count.unwrap_or(0),
            first_access,
            menus: entry.menus,
        }))
    }

    /// Run the orchestrator if the throttle token can be taken.
    async fn refetch(
        &self,
        key: &str,
        now: DateTime<Local>,
    ) -> Result<Option<CachedEntry>, ServiceError> {
        let throttle_key = format!("{key}.throttle");
        let attempt = self
            .store
            .incr_expiring(&throttle_key, self.throttle_window)
            .await?;
        if attempt != 1 {
            tracing::info!(key, attempt, "refetch throttled");
            return Ok(None);
        }

        tracing::info!(key, sources = self.registry.len(), "refetching menus");
        let menus = self.orchestrator.gather(self.registry.all()).await;

        let fetch_count_key = format!("{key}.fetch_count");
        let fetch_count = self
            .store
            .incr_expiring(&fetch_count_key, self.entry_ttl)
            .await?;

        let entry = CachedEntry {
            last_fetch: now.timestamp(),
            fetch_count,
            menus,
        };
        let encoded = serde_json::to_string(&entry)?;
        self.store.set(key, &encoded, Some(self.entry_ttl)).await?;
        Ok(Some(entry))
    }

    async fn record_access(&self, key: &str, now: DateTime<Local>) -> Result<(), ServiceError> {
        let access_key = format!("{key}.access_count");
        let first_key = format!("{key}.first_access");
        let timestamp = now.timestamp().to_string();

        let (_, first) = tokio::try_join!(
            self.store.incr_expiring(&access_key, self.entry_ttl),
            self.store.set_nx(&first_key, &timestamp),
        )?;
        if first {
            self.store.expire(&first_key, self.entry_ttl).await?;
        }
        Ok(())
    }

    async fn counter(&self, key: &str, name: &str) -> Result<Option<i64>, ServiceError> {
        let raw = self.store.get(&format!("{key}.{name}")).await?;
        Ok(raw.and_then(|value| value.parse().ok()))
    }
}

/// Cache key of the given day, e.g. `restaurants.18-10-2026`.
#[must_use]
pub fn day_key(day: NaiveDate) -> String {
    format!("restaurants.{}", day.format("%d-%m-%Y"))
}
