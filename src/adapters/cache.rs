//! In-memory TTL cache and a caching decorator for data ports.
//!
//! Time comes from an injected [`Clock`] so expiry can be driven
//! deterministically in tests.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use chrono::NaiveDate;
use log::debug;

use crate::domain::error::TradelabError;
use crate::domain::ohlcv::OhlcvBar;
use crate::ports::data_port::DataPort;

pub const DEFAULT_TTL: Duration = Duration::from_secs(3600);

pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<Instant>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Mutex::new(Instant::now()),
        }
    }

    pub fn advance(&self, by: Duration) {
        *lock(&self.now) += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *lock(&self.now)
    }
}

// A panic while holding the lock leaves the map itself consistent.
fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

struct Entry<V> {
    value: V,
    expires_at: Instant,
}

pub struct TtlCache<K, V> {
    entries: Mutex<HashMap<K, Entry<V>>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl<K: Eq + Hash, V: Clone> TtlCache<K, V> {
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, Arc::new(SystemClock))
    }

    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
            clock,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Clone of the live value for `key`. Expired entries are evicted.
    pub fn get(&self, key: &K) -> Option<V> {
        let now = self.clock.now();
        let mut entries = lock(&self.entries);
        match entries.get(key) {
            Some(entry) if now < entry.expires_at => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    pub fn insert(&self, key: K, value: V) {
        let expires_at = self.clock.now() + self.ttl;
        lock(&self.entries).insert(key, Entry { value, expires_at });
    }

    /// Drop every expired entry.
    pub fn purge_expired(&self) {
        let now = self.clock.now();
        lock(&self.entries).retain(|_, e| now < e.expires_at);
    }

    pub fn clear(&self) {
        lock(&self.entries).clear();
    }

    /// Entry count, including entries that have expired but not been evicted.
    pub fn len(&self) -> usize {
        lock(&self.entries).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

type BarsKey = (String, NaiveDate, NaiveDate);

/// Wraps a [`DataPort`], serving repeated `(symbol, start, end)` requests
/// from a [`TtlCache`]. Failures are never cached.
pub struct CachingDataPort<P> {
    inner: P,
    cache: TtlCache<BarsKey, Vec<OhlcvBar>>,
}

impl<P: DataPort> CachingDataPort<P> {
    pub fn new(inner: P, ttl: Duration) -> Self {
        Self {
            inner,
            cache: TtlCache::new(ttl),
        }
    }

    pub fn with_clock(inner: P, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner,
            cache: TtlCache::with_clock(ttl, clock),
        }
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }
}

impl<P: DataPort> DataPort for CachingDataPort<P> {
    fn fetch_ohlcv(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<OhlcvBar>, TradelabError> {
        let key = (symbol.to_string(), start_date, end_date);
        if let Some(bars) = self.cache.get(&key) {
            debug!("cache hit: {} {}..{}", symbol, start_date, end_date);
            return Ok(bars);
        }
        debug!("cache miss: {} {}..{}", symbol, start_date, end_date);
        let bars = self.inner.fetch_ohlcv(symbol, start_date, end_date)?;
        self.cache.insert(key, bars.clone());
        Ok(bars)
    }

    fn list_symbols(&self) -> Result<Vec<String>, TradelabError> {
        self.inner.list_symbols()
    }
}
