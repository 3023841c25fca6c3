//! Oracle-state cache: memoizes the expensive per-`(slot, fork)` artifacts.
//!
//! Proving many validators against the same state re-uses the same validator
//! subtree, balance subtree, and top-level roots; rebuilding them per call
//! would re-hash the whole registry every time. Entries are immutable once
//! published and expire by age.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use alloy_primitives::B256;
use parking_lot::Mutex;

use crate::fork::ForkName;
use crate::merkle::MerkleTree;
use crate::proof::ProofError;

/// Default cache TTL in seconds (5 minutes).
pub const DEFAULT_CACHE_EXPIRY_SECONDS: u64 = 300;

/// Cache key: exact match on slot and fork.
pub type CacheKey = (u64, ForkName);

/// The memoized artifacts for one beacon state.
#[derive(Debug)]
pub struct StateTrees {
    /// One root per immediate field of the state container.
    pub top_level_roots: Vec<B256>,
    /// Depth-40 tree over validator container roots (before length mix-in).
    pub validator_tree: MerkleTree,
    /// Depth-38 tree over packed balance chunks (before length mix-in).
    pub balance_tree: MerkleTree,
}

#[derive(Debug)]
struct CacheSlot {
    created_at: Instant,
    trees: Mutex<Option<Arc<StateTrees>>>,
}

/// TTL cache with single-flight builds.
///
/// The outer lock only guards the key map. Building happens under the
/// per-slot lock, so concurrent requests for the same missing key wait for
/// the in-flight build instead of repeating it, while other keys proceed. A
/// build that returns an error publishes nothing; the next caller retries.
#[derive(Debug)]
pub struct StateCache {
    ttl: Duration,
    slots: Mutex<HashMap<CacheKey, Arc<CacheSlot>>>,
    builds: AtomicU64,
}

impl StateCache {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            slots: Mutex::new(HashMap::new()),
            builds: AtomicU64::new(0),
        }
    }

    /// Number of completed tree builds. Cache hits do not increment it.
    #[must_use]
    pub fn build_count(&self) -> u64 {
        self.builds.load(Ordering::Relaxed)
    }

    /// Number of live (unexpired) entries.
    #[must_use]
    pub fn len(&self) -> usize {
        let slots = self.slots.lock();
        slots.values().filter(|slot| slot.created_at.elapsed() < self.ttl).count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Look up `key`, building once on miss or expiry.
    pub fn get_or_build<F>(&self, key: CacheKey, build: F) -> Result<Arc<StateTrees>, ProofError>
    where
        F: FnOnce() -> Result<StateTrees, ProofError>,
    {
        let slot = {
            let mut slots = self.slots.lock();
            // age-based eviction; the working set is one or two slots
            slots.retain(|_, slot| slot.created_at.elapsed() < self.ttl);
            match slots.get(&key) {
                Some(existing) => Arc::clone(existing),
                None => {
                    let fresh = Arc::new(CacheSlot {
                        created_at: Instant::now(),
                        trees: Mutex::new(None),
                    });
                    slots.insert(key, Arc::clone(&fresh));
                    fresh
                }
            }
        };

        let mut trees = slot.trees.lock();
        if let Some(existing) = trees.as_ref() {
            return Ok(Arc::clone(existing));
        }

        let built = Arc::new(build()?);
        self.builds.fetch_add(1, Ordering::Relaxed);
        *trees = Some(Arc::clone(&built));
        tracing::debug!(slot = key.0, fork = %key.1, "cached beacon state trees");
        Ok(built)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_trees() -> Result<StateTrees, ProofError> {
        Ok(StateTrees {
            top_level_roots: vec![B256::ZERO],
            validator_tree: MerkleTree::from_leaves(vec![], 4)?,
            balance_tree: MerkleTree::from_leaves(vec![], 4)?,
        })
    }

    #[test]
    fn test_second_lookup_is_a_hit() {
        let cache = StateCache::new(Duration::from_secs(300));
        let key = (100, ForkName::Deneb);

        let first = cache.get_or_build(key, empty_trees).unwrap();
        let second = cache.get_or_build(key, || panic!("must not rebuild")).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.build_count(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_distinct_keys_build_separately() {
        let cache = StateCache::new(Duration::from_secs(300));
        cache.get_or_build((1, ForkName::Deneb), empty_trees).unwrap();
        cache.get_or_build((1, ForkName::Electra), empty_trees).unwrap();
        cache.get_or_build((2, ForkName::Deneb), empty_trees).unwrap();
        assert_eq!(cache.build_count(), 3);
        assert_eq!(cache.len(), 3);
    }

    #[test]
    fn test_zero_ttl_rebuilds_every_lookup() {
        let cache = StateCache::new(Duration::ZERO);
        let key = (7, ForkName::Capella);
        cache.get_or_build(key, empty_trees).unwrap();
        cache.get_or_build(key, empty_trees).unwrap();
        assert_eq!(cache.build_count(), 2);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_failed_build_publishes_nothing() {
        let cache = StateCache::new(Duration::from_secs(300));
        let key = (9, ForkName::Deneb);

        let err = cache
            .get_or_build(key, || Err(ProofError::StateAccess("boom".into())))
            .unwrap_err();
        assert!(matches!(err, ProofError::StateAccess(_)));
        assert_eq!(cache.build_count(), 0);

        // the slot is reusable and the next build succeeds
        cache.get_or_build(key, empty_trees).unwrap();
        assert_eq!(cache.build_count(), 1);
    }
}
