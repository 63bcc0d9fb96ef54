//! Resolution cache with sliding expiration.
//!
//! Every operation goes through the same `DashMap`, so a lookup that
//! refreshes an entry, an insert and the sweeper's eviction pass are
//! mutually exclusive for any given key. The map itself is never handed out.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::time::Instant;

use crate::observability::metrics;
use crate::resolve::target::TargetSet;

#[derive(Debug)]
struct CacheEntry {
    resolved: Arc<TargetSet>,
    expires_at: Instant,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at <= now
    }
}

/// Domain to resolved target set, expiring `ttl` after last use.
#[derive(Debug)]
pub struct ResolutionCache {
    entries: DashMap<String, CacheEntry>,
    ttl: Duration,
}

impl ResolutionCache {
    /// Create an empty cache whose entries live for `ttl` after last use.
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Look up a domain, extending its lifetime on a hit.
    pub fn get(&self, domain: &str) -> Option<Arc<TargetSet>> {
        self.get_at(domain, Instant::now())
    }

    /// [`get`](Self::get) with an explicit clock reading.
    ///
    /// An expired entry reads as a miss but stays in place; removing it is
    /// left to [`evict_expired`](Self::evict_expired).
    pub fn get_at(&self, domain: &str, now: Instant) -> Option<Arc<TargetSet>> {
        // get_mut holds the shard write lock, so the expiry check and the
        // refresh below cannot interleave with a put or an eviction.
        let mut entry = self.entries.get_mut(domain)?;
        if entry.is_expired(now) {
            return None;
        }
        entry.expires_at = now + self.ttl;
        Some(Arc::clone(&entry.resolved))
    }

    /// Insert or replace the entry for a domain. Last writer wins.
    pub fn put(&self, domain: impl Into<String>, resolved: TargetSet) -> Arc<TargetSet> {
        self.put_at(domain, resolved, Instant::now())
    }

    /// [`put`](Self::put) with an explicit clock reading.
    pub fn put_at(
        &self,
        domain: impl Into<String>,
        resolved: TargetSet,
        now: Instant,
    ) -> Arc<TargetSet> {
        let resolved = Arc::new(resolved);
        self.entries.insert(
            domain.into(),
            CacheEntry {
                resolved: Arc::clone(&resolved),
                expires_at: now + self.ttl,
            },
        );
        metrics::record_cache_size(self.entries.len());
        resolved
    }

    /// Remove every entry that expired at or before `now`.
    ///
    /// Returns the number of entries removed.
    pub fn evict_expired(&self, now: Instant) -> usize {
        let mut evicted = 0;
        self.entries.retain(|_, entry| {
            if entry.is_expired(now) {
                evicted += 1;
                false
            } else {
                true
            }
        });
        metrics::record_cache_size(self.entries.len());
        evicted
    }

    /// Number of entries, expired ones included until swept.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
