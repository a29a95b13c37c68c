//! Key-value store holding the daily cache entry, counters and throttle token.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::time::Instant;

#[derive(thiserror::Error, Debug)]
/// Errors raised by a cache store backend.
pub enum StoreError {
    /// The backend could not be reached or rejected the command.
    #[error("Cache store unavailable: {0}")]
    Unavailable(String),
    /// A counter key holds something that is not an integer.
    #[error("Value at {0} is not an integer")]
    NotAnInteger(String),
}

#[async_trait]
/// Operations the daily service needs from its store.
///
/// Every operation on a single key must be atomic with respect to concurrent
/// callers; `incr` is the coordination primitive behind the refetch throttle.
pub trait CacheStore: Send + Sync {
    /// Read a value.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] when the backend fails.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Write a value, replacing any previous one, optionally expiring after `ttl`.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] when the backend fails.
    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), StoreError>;

    /// Increment an integer counter, creating it at 0 first, and return the new value.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] when the backend fails or the key holds a non-integer.
    async fn incr(&self, key: &str) -> Result<i64, StoreError>;

    /// Like [`CacheStore::incr`], and a counter created by this call expires
    /// after `ttl`. Both happen in one atomic step.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] when the backend fails or the key holds a non-integer.
    async fn incr_expiring(&self, key: &str, ttl: Duration) -> Result<i64, StoreError>;

    /// Let an existing key expire after `ttl`.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] when the backend fails.
    async fn expire(&self, key: &str, ttl: Duration) -> Result<(), StoreError>;

    /// Write a value only if the key is not set; returns whether it was written.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] when the backend fails.
    async fn set_nx(&self, key: &str, value: &str) -> Result<bool, StoreError>;
}

#[derive(Debug, Clone)]
struct Slot {
    value: String,
    expires_at: Option<Instant>,
}

impl Slot {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|deadline| deadline > now)
    }
}

/// In-process store for single-instance deployments and tests.
///
/// Expiry follows Tokio's clock, so paused-time tests can advance past it.
#[derive(Debug, Default)]
pub struct MemoryStore {
    slots: Mutex<HashMap<String, Slot>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

/// Drop every expired slot.
fn sweep(slots: &mut HashMap<String, Slot>) {
    let now = Instant::now();
    slots.retain(|_, slot| slot.is_live(now));
}

/// Increment the counter at `key`, creating it with `expires_at` when missing.
fn bump(
    slots: &mut HashMap<String, Slot>,
    key: &str,
    expires_at: Option<Instant>,
) -> Result<i64, StoreError> {
    sweep(slots);
    let Some(slot) = slots.get_mut(key) else {
        slots.insert(
            key.to_owned(),
            Slot {
                value: "1".to_owned(),
                expires_at,
            },
        );
        return Ok(1);
    };

    let current = slot
        .value
        .parse::<i64>()
        .map_err(|_parse_err| StoreError::NotAnInteger(key.to_owned()))?;
    let next = current.saturating_add(1);
    slot.value = next.to_string();
    Ok(next)
}

/// Drop the slot at `key` when it has expired and return the live one, if any.
fn live_slot<'map>(slots: &'map mut HashMap<String, Slot>, key: &str) -> Option<&'map mut Slot> {
    let now = Instant::now();
    if slots.get(key).is_some_and(|slot| !slot.is_live(now)) {
        slots.remove(key);
    }
    slots.get_mut(key)
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut slots = self.slots.lock().await;
        Ok(live_slot(&mut slots, key).map(|slot| slot.value.clone()))
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), StoreError> {
        let mut slots = self.slots.lock().await;
        sweep(&mut slots);
        slots.insert(
            key.to_owned(),
            Slot {
                value: value.to_owned(),
                expires_at: ttl.map(|ttl| Instant::now() + ttl),
            },
        );
        Ok(())
    }

    async fn incr(&self, key: &str) -> Result<i64, StoreError> {
        let mut slots = self.slots.lock().await;
        bump(&mut slots, key, None)
    }

    async fn incr_expiring(&self, key: &str, ttl: Duration) -> Result<i64, StoreError> {
        let mut slots = self.slots.lock().await;
        bump(&mut slots, key, Some(Instant::now() + ttl))
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<(), StoreError> {
        let mut slots = self.slots.lock().await;
        if let Some(slot) = live_slot(&mut slots, key) {
            slot.expires_at = Some(Instant::now() + ttl);
        }
        Ok(())
    }

    async fn set_nx(&self, key: &str, value: &str) -> Result<bool, StoreError> {
        let mut slots = self.slots.lock().await;
        sweep(&mut slots);
        if slots.contains_key(key) {
            return Ok(false);
        }
        slots.insert(
            key.to_owned(),
            Slot {
                value: value.to_owned(),
                expires_at: None,
            },
        );
        Ok(true)
    }
}

#[cfg(feature = "redis")]
pub use self::redis_store::RedisStore;

#[cfg(feature = "redis")]
mod redis_store {
    use std::time::Duration;

    use async_trait::async_trait;
    use once_cell::sync::Lazy;
    use redis::aio::ConnectionManager;
    use redis::{AsyncCommands, Script};

    use super::{CacheStore, StoreError};

    impl From<redis::RedisError> for StoreError {
        fn from(err: redis::RedisError) -> Self {
            StoreError::Unavailable(err.to_string())
        }
    }

    /// Store backed by a Redis server.
    #[derive(Clone)]
    pub struct RedisStore {
        connection: ConnectionManager,
    }

    impl RedisStore {
        /// Connect to the server at `url`, e.g. `redis://localhost/`.
        ///
        /// # Errors
        ///
        /// Returns a [`StoreError`] when the URL is invalid or the server is unreachable.
        pub async fn connect(url: &str) -> Result<Self, StoreError> {
            let client = redis::Client::open(url)?;
            let connection = client.get_connection_manager().await?;
            Ok(Self { connection })
        }
    }

    /// `INCR` that sets the expiry of a counter it creates, atomically on the server.
    static INCR_EXPIRING: Lazy<Script> = Lazy::new(|| {
        Script::new(
            r"
            local count = redis.call('INCR', KEYS[1])
            if count == 1 then
                redis.call('EXPIRE', KEYS[1], ARGV[1])
            end
            return count
            ",
        )
    });

    fn whole_seconds(ttl: Duration) -> u64 {
        ttl.as_secs().max(1)
    }

    #[async_trait]
    impl CacheStore for RedisStore {
        async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
            let mut connection = self.connection.clone();
            Ok(connection.get(key).await?)
        }

        async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), StoreError> {
            let mut connection = self.connection.clone();
            match ttl {
                Some(ttl) => {
                    connection
                        .set_ex::<_, _, ()>(key, value, whole_seconds(ttl))
                        .await?;
                }
                None => connection.set::<_, _, ()>(key, value).await?,
            }
            Ok(())
        }

        async fn incr(&self, key: &str) -> Result<i64, StoreError> {
            let mut connection = self.connection.clone();
            Ok(connection.incr(key, 1_i64).await?)
        }

        async fn incr_expiring(&self, key: &str, ttl: Duration) -> Result<i64, StoreError> {
            let mut connection = self.connection.clone();
            Ok(INCR_EXPIRING
                .key(key)
                .arg(whole_seconds(ttl))
                .invoke_async(&mut connection)
                .await?)
        }

        async fn expire(&self, key: &str, ttl: Duration) -> Result<(), StoreError> {
            let mut connection = self.connection.clone();
            let seconds = i64::try_from(whole_seconds(ttl)).unwrap_or(i64::MAX);
            connection.expire::<_, ()>(key, seconds).await?;
            Ok(())
        }

        async fn set_nx(&self, key: &str, value: &str) -> Result<bool, StoreError> {
            let mut connection = self.connection.clone();
            Ok(connection.set_nx(key, value).await?)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn incr_counts_from_one() {
        let store = MemoryStore::new();
        assert_eq!(store.incr("counter").await.unwrap(), 1);
        assert_eq!(store.incr("counter").await.unwrap(), 2);
        assert_eq!(store.get("counter").await.unwrap().as_deref(), Some("2"));
    }

    #[tokio::test]
    async fn incr_rejects_non_integers() {
        let store = MemoryStore::new();
        store.set("menu", "{}", None).await.unwrap();
        assert!(matches!(
            store.incr("menu").await,
            Err(StoreError::NotAnInteger(_))
        ));
    }

    #[tokio::test]
    async fn set_nx_keeps_the_first_value() {
        let store = MemoryStore::new();
        assert!(store.set_nx("first", "10").await.unwrap());
        assert!(!store.set_nx("first", "20").await.unwrap());
        assert_eq!(store.get("first").await.unwrap().as_deref(), Some("10"));
    }

    #[tokio::test(start_paused = true)]
    async fn incr_expiring_sets_the_lifetime_once() {
        let store = MemoryStore::new();
        let window = Duration::from_secs(180);
        assert_eq!(store.incr_expiring("throttle", window).await.unwrap(), 1);

        tokio::time::advance(Duration::from_secs(100)).await;
        assert_eq!(store.incr_expiring("throttle", window).await.unwrap(), 2);

        tokio::time::advance(Duration::from_secs(81)).await;
        assert_eq!(store.incr_expiring("throttle", window).await.unwrap(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn writes_drop_expired_keys_of_past_days() {
        let store = MemoryStore::new();
        let day = Duration::from_secs(24 * 60 * 60);
        store
            .set("restaurants.18-10-2026", "{}", Some(day))
            .await
            .unwrap();
        store
            .incr_expiring("restaurants.18-10-2026.access_count", day)
            .await
            .unwrap();

        tokio::time::advance(day + Duration::from_secs(1)).await;
        store
            .set("restaurants.19-10-2026", "{}", Some(day))
            .await
            .unwrap();

        let slots = store.slots.lock().await;
        assert_eq!(slots.len(), 1);
        assert!(slots.contains_key("restaurants.19-10-2026"));
    }

    #[tokio::test(start_paused = true)]
    async fn expired_keys_disappear() {
        let store = MemoryStore::new();
        store.incr("throttle").await.unwrap();
        store
            .expire("throttle", Duration::from_secs(180))
            .await
            .unwrap();
        store
            .set("entry", "x", Some(Duration::from_secs(60)))
            .await
            .unwrap();

        tokio::time::advance(Duration::from_secs(61)).await;
        assert_eq!(store.get("entry").await.unwrap(), None);
        assert_eq!(store.incr("throttle").await.unwrap(), 2);

        tokio::time::advance(Duration::from_secs(120)).await;
        assert_eq!(store.incr("throttle").await.unwrap(), 1);
    }
}
