//! # Resource Cache
//!
//! A content-addressed, budget-bounded store for derived artifacts that are
//! expensive to rebuild. The widget factory keys bitmap fonts by their
//! (glyph table, sprite, palette) triple so every label asking for the same
//! triple shares one font.
//!
//! Values are handed out as `Arc<V>`: callers share the artifact read-only,
//! and an evicted entry stays alive for as long as someone still holds it.
//!
//! The cache may be touched from outside the tick thread, so all state sits
//! behind one `Mutex`.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard};

use thiserror::Error;

/// Why an insert was refused. The caller may still use the artifact.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CacheError {
    #[error("key `{key}` is already cached")]
    Duplicate { key: String },

    #[error("cost {cost} of `{key}` exceeds the whole cache budget {budget}")]
    OverBudget { key: String, cost: usize, budget: usize },
}

struct Entry<V> {
    value: Arc<V>,
    cost: usize,
    last_used: u64,
}

struct Inner<K, V> {
    entries: HashMap<K, Entry<V>>,
    weight: usize,
    clock: u64,
}

impl<K: Eq + Hash, V> Inner<K, V> {
    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }
}

/// Budget-bounded LRU cache from `K` to shared `V`.
pub struct ResourceCache<K, V> {
    budget: usize,
    inner: Mutex<Inner<K, V>>,
}

impl<K, V> ResourceCache<K, V>
where
    K: Eq + Hash + Clone + std::fmt::Display,
{
    /// An empty cache holding at most `budget` units of cost.
    pub fn new(budget: usize) -> Self {
        Self {
            budget,
            inner: Mutex::new(Inner {
                entries: HashMap::new(),
                weight: 0,
                clock: 0,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner<K, V>> {
        // A panic while holding the lock leaves the map consistent: every
        // mutation is a single insert/remove plus a weight update.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Look up `key`, marking it most recently used.
    pub fn retrieve(&self, key: &K) -> Option<Arc<V>> {
        let mut inner = self.lock();
        let stamp = inner.tick();
        let entry = inner.entries.get_mut(key)?;
        entry.last_used = stamp;
        Some(Arc::clone(&entry.value))
    }

    /// Store `value` under `key` at the given cost.
    ///
    /// Least recently used entries are evicted until the new entry fits.
    pub fn insert(&self, key: K, value: Arc<V>, cost: usize) -> Result<(), CacheError> {
        if cost > self.budget {
            return Err(CacheError::OverBudget {
                key: key.to_string(),
                cost,
                budget: self.budget,
            });
        }

        let mut inner = self.lock();
        if inner.entries.contains_key(&key) {
            return Err(CacheError::Duplicate {
                key: key.to_string(),
            });
        }

        while inner.weight + cost > self.budget {
            let Some(victim) = inner
                .entries
                .iter()
                .min_by_key(|(_, e)| e.last_used)
                .map(|(k, _)| k.clone())
            else {
                break;
            };
            if let Some(evicted) = inner.entries.remove(&victim) {
                inner.weight -= evicted.cost;
                log::debug!("cache: evicted `{victim}` (cost {})", evicted.cost);
            }
        }

        let last_used = inner.tick();
        inner.weight += cost;
        inner.entries.insert(
            key,
            Entry {
                value,
                cost,
                last_used,
            },
        );
        Ok(())
    }

    pub fn contains(&self, key: &K) -> bool {
        self.lock().entries.contains_key(key)
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sum of the costs of all cached entries.
    pub fn weight(&self) -> usize {
        self.lock().weight
    }

    pub fn budget(&self) -> usize {
        self.budget
    }

    pub fn clear(&self) {
        let mut inner = self.lock();
        inner.entries.clear();
        inner.weight = 0;
    }
}
