//! In-memory result cache for simulation runs
//!
//! Keys are SHA-256 digests of a canonical serialization of the inputs, so
//! map insertion order never affects the key. The cache is bounded and
//! evicts the least recently used entry; lookup, insert, and eviction all
//! happen under a single lock, so concurrent callers can never push the
//! cache past capacity. Clearing it at any time affects performance only.

use crate::params::ModelParameters;
use crate::simulation::distributions::DistributionSpec;
use crate::simulation::statistics::MonteCarloResult;
use log::debug;
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

/// Cache key for one simulation invocation.
///
/// Canonicalizes the inputs (struct fields and distribution names sorted)
/// before hashing, so two calls with identically valued inputs produce the
/// same key regardless of how the caller built its maps.
pub fn cache_key(
    params: &ModelParameters,
    distributions: &HashMap<String, DistributionSpec>,
    iterations: u32,
) -> String {
    let sorted: BTreeMap<&str, &DistributionSpec> = distributions
        .iter()
        .map(|(name, spec)| (name.as_str(), spec))
        .collect();
    let canonical = serde_json::json!({
        "params": params,
        "distributions": sorted,
        "iterations": iterations,
    });

    let mut hasher = Sha256::new();
    hasher.update(canonical.to_string().as_bytes());
    format!("{:x}", hasher.finalize())
}

struct CacheEntry {
    value: MonteCarloResult,
    last_used: u64,
}

struct CacheInner {
    entries: HashMap<String, CacheEntry>,
    tick: u64,
}

/// Bounded LRU cache of simulation results.
pub struct ResultCache {
    inner: Mutex<CacheInner>,
    capacity: usize,
}

impl ResultCache {
    /// Create a cache holding at most `capacity` entries (at least one).
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(CacheInner {
                entries: HashMap::new(),
                tick: 0,
            }),
            capacity: capacity.max(1),
        }
    }

    /// Look up a result, refreshing its recency on a hit.
    pub fn get(&self, key: &str) -> Option<MonteCarloResult> {
        let mut inner = self.inner.lock().unwrap();
        inner.tick += 1;
        let tick = inner.tick;
        inner.entries.get_mut(key).map(|entry| {
            entry.last_used = tick;
            entry.value.clone()
        })
    }

    /// Insert a result, evicting the least recently used entry when full.
    pub fn put(&self, key: String, value: MonteCarloResult) {
        let mut inner = self.inner.lock().unwrap();
        inner.tick += 1;
        let tick = inner.tick;

        if let Some(entry) = inner.entries.get_mut(&key) {
            entry.value = value;
            entry.last_used = tick;
            return;
        }

        if inner.entries.len() >= self.capacity {
            // Evict the entry with the oldest recency marker
            let oldest = inner
                .entries
                .iter()
                .min_by_key(|(_, entry)| entry.last_used)
                .map(|(key, _)| key.clone());
            if let Some(oldest_key) = oldest {
                inner.entries.remove(&oldest_key);
                debug!(
                    "evicted cached simulation {}",
                    oldest_key.get(..12).unwrap_or(&oldest_key)
                );
            }
        }

        inner.entries.insert(key, CacheEntry { value, last_used: tick });
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every cached entry.
    pub fn clear(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.entries.clear();
    }
}
