use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

use crate::models::{HireOut, Maintenance, Transaction, Truck};

pub const DEFAULT_LIST_TTL: Duration = Duration::from_secs(30);

pub const KEY_TRUCKS: &str = "trucks";
pub const KEY_HIRE_OUTS: &str = "hire-outs";
pub const KEY_MAINTENANCES: &str = "maintenances";
pub const KEY_TRANSACTIONS: &str = "transactions";

struct Entry<T> {
    rows: Arc<Vec<T>>,
    expires_at: Instant,
}

/// Read-through cache for one list query.
///
/// The slot mutex is the single owner of the entry: a load holds it from the query until the
/// result is stored, and `invalidate` has to take it too. An invalidation issued after a write
/// therefore either runs before the next load starts or clears whatever an in-flight load
/// stored, so stale rows cannot outlive the write.
pub struct ListCache<T> {
    key: &'static str,
    ttl: Duration,
    slot: Mutex<Option<Entry<T>>>,
}

impl<T> ListCache<T> {
    pub fn new(key: &'static str, ttl: Duration) -> Self {
        Self {
            key,
            ttl,
            slot: Mutex::new(None),
        }
    }

    pub fn key(&self) -> &'static str {
        self.key
    }

    /// Returns the cached snapshot while it is fresh, otherwise runs `load` and caches its
    /// rows. A failed load leaves the slot empty and hands the error back.
    pub async fn get_or_load<F, E>(&self, load: F) -> Result<Arc<Vec<T>>, E>
    where
        F: FnOnce() -> Result<Vec<T>, E>,
    {
        let mut slot = self.slot.lock().await;
        let now = Instant::now();

        if let Some(entry) = slot.as_ref() {
            if entry.expires_at > now {
                debug!(cache_key = self.key, "list cache hit");
                return Ok(Arc::clone(&entry.rows));
            }
        }

        debug!(cache_key = self.key, "list cache miss");
        *slot = None;
        let rows = Arc::new(load()?);
        *slot = Some(Entry {
            rows: Arc::clone(&rows),
            expires_at: now + self.ttl,
        });
        Ok(rows)
    }

    pub async fn invalidate(&self) {
        let mut slot = self.slot.lock().await;
        if slot.take().is_some() {
            debug!(cache_key = self.key, "list cache invalidated");
        }
    }
}

/// One cache per list endpoint. Writes invalidate only the list they touch.
pub struct ListCaches {
    pub trucks: ListCache<Truck>,
    pub hire_outs: ListCache<HireOut>,
    pub maintenances: ListCache<Maintenance>,
    pub transactions: ListCache<Transaction>,
}

impl ListCaches {
    pub fn new(ttl: Duration) -> Self {
        Self {
            trucks: ListCache::new(KEY_TRUCKS, ttl),
            hire_outs: ListCache::new(KEY_HIRE_OUTS, ttl),
            maintenances: ListCache::new(KEY_MAINTENANCES, ttl),
            transactions: ListCache::new(KEY_TRANSACTIONS, ttl),
        }
    }
}

impl Default for ListCaches {
    fn default() -> Self {
        Self::new(DEFAULT_LIST_TTL)
    }
}
