//! # Keyed Lock Registry
//!
//! Hands out one read-write lock per key, created on first use and evicted
//! once idle. Entries are created through the map's entry API, so concurrent
//! callers for the same key always observe the same lock.
//!
//! An entry is only evicted when the registry holds the sole reference to its
//! lock. Guards and pending acquisitions keep a clone of the `Arc`, so a lock
//! that is held or awaited can never be swapped for a fresh one.

use std::fmt;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use thiserror::Error;
use tokio::sync::{OwnedRwLockReadGuard, OwnedRwLockWriteGuard, RwLock};
use tokio::time::{self, Duration, Instant};

/// Bounds and timing for a [`LockRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistrySettings {
    /// Entry count above which least-recently-used idle entries are dropped.
    pub capacity: usize,
    /// How long an unreferenced entry may sit unused before eviction.
    pub idle_ttl: Duration,
    /// Upper bound on waiting for a lock. `None` waits indefinitely.
    pub acquire_timeout: Option<Duration>,
    /// Run an eviction sweep every this many acquisitions.
    pub sweep_interval: u64,
}

impl Default for RegistrySettings {
    fn default() -> Self {
        Self {
            capacity: 100_000,
            idle_ttl: Duration::from_secs(600),
            acquire_timeout: Some(Duration::from_secs(5)),
            sweep_interval: 1024,
        }
    }
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("lock not acquired within {waited:?}")]
pub struct LockTimeout {
    pub waited: Duration,
}

struct Slot {
    lock: Arc<RwLock<()>>,
    last_access: Instant,
}

impl Slot {
    fn in_use(&self) -> bool {
        Arc::strong_count(&self.lock) > 1
    }
}

/// Process-wide registry of per-key locks. Build one at startup and share it
/// behind an `Arc`.
pub struct LockRegistry<K> {
    slots: DashMap<K, Slot>,
    settings: RegistrySettings,
    acquisitions: AtomicU64,
    /// Acquisition count of the last over-capacity sweep that could not get
    /// back under capacity; `0` when none is outstanding.
    stalled_at: AtomicU64,
}

impl<K> LockRegistry<K>
where
    K: Eq + Hash + Clone + fmt::Debug,
{
    pub fn new(settings: RegistrySettings) -> Self {
        Self {
            slots: DashMap::new(),
            settings,
            acquisitions: AtomicU64::new(0),
            stalled_at: AtomicU64::new(0),
        }
    }

    /// Acquires the exclusive lock for `key`.
    pub async fn write(&self, key: K) -> Result<WriteGuard<K>, LockTimeout> {
        let lock = self.lock_for(&key);
        let guard = match self.settings.acquire_timeout {
            Some(limit) => time::timeout(limit, lock.write_owned())
                .await
                .map_err(|_| LockTimeout { waited: limit })?,
            None => lock.write_owned().await,
        };
        tracing::trace!(?key, "write lock acquired");
        Ok(WriteGuard { key, _guard: guard })
    }

    /// Acquires the shared lock for `key`. Readers only wait for writers.
    pub async fn read(&self, key: K) -> Result<ReadGuard<K>, LockTimeout> {
        let lock = self.lock_for(&key);
        let guard = match self.settings.acquire_timeout {
            Some(limit) => time::timeout(limit, lock.read_owned())
                .await
                .map_err(|_| LockTimeout { waited: limit })?,
            None => lock.read_owned().await,
        };
        Ok(ReadGuard { key, _guard: guard })
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn contains(&self, key: &K) -> bool {
        self.slots.contains_key(key)
    }

    /// Drops idle, unreferenced entries past their TTL, then trims the oldest
    /// unreferenced entries while above capacity. Returns the number evicted.
    pub fn evict_expired(&self) -> usize {
        let now = Instant::now();
        let ttl = self.settings.idle_ttl;
        let mut evicted = 0;
        self.slots.retain(|_, slot| {
            let keep = slot.in_use() || now.duration_since(slot.last_access) < ttl;
            if !keep {
                evicted += 1;
            }
            keep
        });
        evicted += self.trim_to_capacity();
        if evicted > 0 {
            tracing::debug!(evicted, remaining = self.slots.len(), "lock registry sweep");
        }
        evicted
    }

    fn lock_for(&self, key: &K) -> Arc<RwLock<()>> {
        let now = Instant::now();
        let lock = {
            let mut slot = self.slots.entry(key.clone()).or_insert_with(|| Slot {
                lock: Arc::new(RwLock::new(())),
                last_access: now,
            });
            slot.last_access = now;
            Arc::clone(&slot.lock)
        };
        // The shard guard is released above; sweeping takes shard locks itself.
        self.maybe_sweep();
        lock
    }

    fn maybe_sweep(&self) {
        let count = self.acquisitions.fetch_add(1, Ordering::Relaxed) + 1;
        let interval = self.settings.sweep_interval.max(1);
        if count % interval != 0 {
            if self.slots.len() <= self.settings.capacity {
                return;
            }
            // Every entry was held last time; wait for the next periodic sweep.
            let stalled = self.stalled_at.load(Ordering::Relaxed);
            if stalled != 0 && count.saturating_sub(stalled) < interval {
                return;
            }
        }
        let evicted = self.evict_expired();
        let stalled = if evicted == 0 && self.slots.len() > self.settings.capacity {
            count
        } else {
            0
        };
        self.stalled_at.store(stalled, Ordering::Relaxed);
    }

    fn trim_to_capacity(&self) -> usize {
        let excess = self.slots.len().saturating_sub(self.settings.capacity);
        if excess == 0 {
            return 0;
        }

        let mut idle: Vec<(K, Instant)> = self
            .slots
            .iter()
            .filter(|entry| !entry.value().in_use())
            .map(|entry| (entry.key().clone(), entry.value().last_access))
            .collect();
        idle.sort_by_key(|(_, last_access)| *last_access);

        let mut evicted = 0;
        for (key, seen_at) in idle.into_iter().take(excess) {
            let removed = self
                .slots
                .remove_if(&key, |_, slot| !slot.in_use() && slot.last_access <= seen_at);
            if removed.is_some() {
                evicted += 1;
            }
        }
        if evicted < excess {
            tracing::warn!(
                capacity = self.settings.capacity,
                len = self.slots.len(),
                "lock registry above capacity with all remaining entries in use"
            );
        }
        evicted
    }
}

impl<K: Eq + Hash> fmt::Debug for LockRegistry<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LockRegistry")
            .field("entries", &self.slots.len())
            .field("settings", &self.settings)
            .finish()
    }
}

/// Proof that the exclusive lock for `key` is held. Releases on drop.
#[must_use = "the lock is released as soon as the guard is dropped"]
pub struct WriteGuard<K> {
    key: K,
    _guard: OwnedRwLockWriteGuard<()>,
}

impl<K> WriteGuard<K> {
    pub fn key(&self) -> &K {
        &self.key
    }
}

impl<K: fmt::Debug> fmt::Debug for WriteGuard<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WriteGuard").field("key", &self.key).finish()
    }
}

#[must_use = "the lock is released as soon as the guard is dropped"]
pub struct ReadGuard<K> {
    key: K,
    _guard: OwnedRwLockReadGuard<()>,
}

impl<K> ReadGuard<K> {
    pub fn key(&self) -> &K {
        &self.key
    }
}

impl<K: fmt::Debug> fmt::Debug for ReadGuard<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadGuard").field("key", &self.key).finish()
    }
}
