//! Per-run memoization of item enrichment.
//!
//! [`EnrichmentCache`] is an explicit value owned by whoever drives a run.
//! Dropping it (or calling [`clear`](EnrichmentCache::clear)) is the only
//! way entries go away early; nothing is shared between runs.

use dailybrief_config::CacheConfig;
use dailybrief_core::{EnrichedItem, ItemEnricher, WorkItem};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

/// TTL cache of enriched items keyed by `repo#number`.
pub struct EnrichmentCache {
    ttl: Duration,
    entries: HashMap<String, (Instant, EnrichedItem)>,
    hits: u64,
    misses: u64,
}

impl EnrichmentCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: HashMap::new(),
            hits: 0,
            misses: 0,
        }
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(Duration::from_secs(config.ttl_secs))
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Fresh entry for `key`, if any. Stale entries are evicted on lookup.
    pub fn get(&mut self, key: &str) -> Option<EnrichedItem> {
        let fresh = match self.entries.get(key) {
            Some((stored, _)) => stored.elapsed() < self.ttl,
            None => false,
        };

        if fresh {
            self.hits += 1;
            return self.entries.get(key).map(|(_, item)| item.clone());
        }

        self.entries.remove(key);
        self.misses += 1;
        None
    }

    pub fn insert(&mut self, enriched: EnrichedItem) {
        self.entries
            .insert(enriched.item.key(), (Instant::now(), enriched));
    }

    /// Remove every expired entry; returns how many were removed.
    pub fn purge_expired(&mut self) -> usize {
        let before = self.entries.len();
        let ttl = self.ttl;
        self.entries.retain(|_, (stored, _)| stored.elapsed() < ttl);
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            entries: self.entries.len(),
        }
    }
}

/// Enrich `items` in rank order, reusing fresh cache entries.
///
/// Items whose enrichment fails are left out; the relative order of the
/// rest is preserved.
pub async fn enrich_ranked(
    items: &[WorkItem],
    enricher: &dyn ItemEnricher,
    cache: &mut EnrichmentCache,
) -> Vec<EnrichedItem> {
    let mut enriched = Vec::with_capacity(items.len());

    for item in items {
        let key = item.key();
        if let Some(hit) = cache.get(&key) {
            debug!(item = %key, "Enrichment cache hit");
            enriched.push(hit);
            continue;
        }

        match enricher.enrich(item).await {
            Ok(result) => {
                cache.insert(result.clone());
                enriched.push(result);
            }
            Err(e) => {
                warn!(item = %key, error = %e, "Enrichment failed, skipping item");
            }
        }
    }

    enriched
}
