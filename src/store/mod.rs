mod entry;
mod policy;

pub use entry::Metadata;

use std::collections::HashMap;
use std::hash::Hash;
use std::ops::Deref;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use strum_macros::{Display, EnumString};
use thiserror::Error as ThisError;
use tracing::debug;

use entry::Entry;
use policy::{Adaptive, Clock, Lfu, Ordered, Policy, Random, TinyLfu, TwoQueues, Unbounded};

/// The cache as served over the wire: string keys, string values.
pub type Store = Cache<String, String>;

/// An entry may be reachable through at most this many secondary indexes.
pub const MAX_SECONDARY_INDEXES: usize = 2;

#[derive(Debug, ThisError, PartialEq)]
pub enum CacheError {
    #[error("Too many secondary indexes ({0}), maximum {MAX_SECONDARY_INDEXES} allowed")]
    TooManySecondaryIndexes(usize),
    #[error("Out of memory, increase memory or use eviction policy other than none")]
    OutOfMemory,
    #[error("{0} eviction requires a capacity of at least 1")]
    ZeroCapacity(EvictionPolicy),
}

/// Rule used to make room once a bounded store is full. Fixed for the lifetime of a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum EvictionPolicy {
    /// Unbounded, nothing is ever evicted.
    None,
    Random,
    Lru,
    Mru,
    Fifo,
    Lfu,
    Clock,
    /// Adaptive replacement cache.
    Arc,
    #[strum(to_string = "2QUEUE", serialize = "TWOQUEUES")]
    TwoQueues,
    TinyLfu,
}

impl EvictionPolicy {
    fn build<K>(self, capacity: usize) -> Box<dyn Policy<K>>
    where
        K: Eq + Hash + Clone + Send + 'static,
    {
        match self {
            EvictionPolicy::None => Box::new(Unbounded),
            EvictionPolicy::Random => Box::new(Random::new()),
            EvictionPolicy::Lru => Box::new(Ordered::lru()),
            EvictionPolicy::Mru => Box::new(Ordered::mru()),
            EvictionPolicy::Fifo => Box::new(Ordered::fifo()),
            EvictionPolicy::Lfu => Box::new(Lfu::new()),
            EvictionPolicy::Clock => Box::new(Clock::new()),
            EvictionPolicy::Arc => Box::new(Adaptive::new(capacity)),
            EvictionPolicy::TwoQueues => Box::new(TwoQueues::new(capacity)),
            EvictionPolicy::TinyLfu => Box::new(TinyLfu::new(capacity)),
        }
    }
}

/// The Cache holds values under a primary key and keeps two independent secondary indexes,
/// each mapping an auxiliary key to a primary key. Entries that no longer fit are evicted
/// according to the policy chosen at construction.
///
/// The cache is shared across connections and cloned cheaply through reference counting. All
/// of its structures sit behind a single lock, so a primary key and the index entries pointing
/// at it always change together.
pub struct Cache<K, V> {
    inner: Arc<InnerCache<K, V>>,
}

impl<K, V> Clone for Cache<K, V> {
    fn clone(&self) -> Self {
        Cache {
            inner: self.inner.clone(),
        }
    }
}

impl<K, V> Cache<K, V>
where
    K: Eq + Hash + Clone + Send + 'static,
{
    /// Creates an empty cache. `capacity` is ignored by [`EvictionPolicy::None`] and must be
    /// positive for every other policy.
    pub fn new(policy: EvictionPolicy, capacity: usize) -> Result<Cache<K, V>, CacheError> {
        let capacity = match policy {
            EvictionPolicy::None => None,
            _ if capacity == 0 => return Err(CacheError::ZeroCapacity(policy)),
            _ => Some(capacity),
        };

        let state = State {
            primary: HashMap::new(),
            index_one: HashMap::new(),
            index_two: HashMap::new(),
            policy: policy.build(capacity.unwrap_or_default()),
        };

        let inner = Arc::new(InnerCache {
            state: Mutex::new(state),
            policy,
            capacity,
        });

        Ok(Cache { inner })
    }
}

impl<K, V> Deref for Cache<K, V> {
    type Target = InnerCache<K, V>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

pub struct InnerCache<K, V> {
    state: Mutex<State<K, V>>,
    policy: EvictionPolicy,
    capacity: Option<usize>,
}

impl<K, V> InnerCache<K, V> {
    pub fn lock(&self) -> CacheLocked<'_, K, V> {
        // Poisoning is ignored, no operation leaves the maps half updated.
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        CacheLocked {
            state,
            capacity: self.capacity,
        }
    }

    pub fn policy(&self) -> EvictionPolicy {
        self.policy
    }

    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }
}

struct State<K, V> {
    primary: HashMap<K, Entry<V>>,
    index_one: HashMap<K, K>,
    index_two: HashMap<K, K>,
    policy: Box<dyn Policy<K>>,
}

pub struct CacheLocked<'a, K, V> {
    state: MutexGuard<'a, State<K, V>>,
    capacity: Option<usize>,
}

impl<'a, K, V> CacheLocked<'a, K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Stores `value` under `key`, replacing any previous value. `secondary_keys[0]` and
    /// `secondary_keys[1]`, when present, are pointed at `key` in index one and two, taking
    /// over whatever those slots pointed at before.
    ///
    /// Index entries left over from an earlier `put` of the same key with different secondary
    /// keys are kept; only [`remove`](Self::remove) and eviction clean them up.
    pub fn put(&mut self, key: K, value: V, secondary_keys: &[Option<K>]) -> Result<(), CacheError> {
        if secondary_keys.len() > MAX_SECONDARY_INDEXES {
            return Err(CacheError::TooManySecondaryIndexes(secondary_keys.len()));
        }

        // Nothing is modified until every map has room for the new entries.
        let state = &mut *self.state;
        state
            .primary
            .try_reserve(1)
            .map_err(|_| CacheError::OutOfMemory)?;
        let indexes = [&mut state.index_one, &mut state.index_two];
        for (index, secondary_key) in indexes.into_iter().zip(secondary_keys) {
            if secondary_key.is_some() {
                index.try_reserve(1).map_err(|_| CacheError::OutOfMemory)?;
            }
        }

        match state.primary.get_mut(&key) {
            Some(entry) => {
                entry.update(value);
                state.policy.updated(&key);
            }
            None => {
                if self.capacity.is_some_and(|capacity| state.primary.len() >= capacity) {
                    self.evict();
                }

                let state = &mut *self.state;
                state.primary.insert(key.clone(), Entry::new(value));
                state.policy.inserted(&key);
            }
        }

        let state = &mut *self.state;
        let indexes = [&mut state.index_one, &mut state.index_two];
        for (index, secondary_key) in indexes.into_iter().zip(secondary_keys) {
            if let Some(secondary_key) = secondary_key {
                index.insert(secondary_key.clone(), key.clone());
            }
        }

        Ok(())
    }

    pub fn get(&mut self, key: &K) -> Option<V> {
        let state = &mut *self.state;
        let value = state.primary.get_mut(key)?.read().clone();
        state.policy.accessed(key);
        Some(value)
    }

    pub fn get_by_index_one(&mut self, secondary_key: &K) -> Option<V> {
        let key = self.state.index_one.get(secondary_key)?.clone();
        self.get(&key)
    }

    pub fn get_by_index_two(&mut self, secondary_key: &K) -> Option<V> {
        let key = self.state.index_two.get(secondary_key)?.clone();
        self.get(&key)
    }

    /// Removes `key` and every secondary index entry pointing at it.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let state = &mut *self.state;
        let entry = state.primary.remove(key);
        if entry.is_some() {
            state.policy.removed(key);
        }
        self.remove_index_entries(key);

        entry.map(Entry::into_value)
    }

    pub fn size(&self) -> usize {
        self.state.primary.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.primary.is_empty()
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.state.primary.contains_key(key)
    }

    pub fn contains_value(&self, value: &V) -> bool
    where
        V: PartialEq,
    {
        self.state
            .primary
            .values()
            .any(|entry| entry.value() == value)
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.state.primary.keys()
    }

    pub fn metadata(&self, key: &K) -> Option<Metadata> {
        self.state.primary.get(key).map(Entry::metadata)
    }

    pub fn clear(&mut self) {
        let state = &mut *self.state;
        state.primary.clear();
        state.index_one.clear();
        state.index_two.clear();
        state.policy.clear();
    }

    fn evict(&mut self) {
        let Some(victim) = self.state.policy.victim() else {
            return;
        };

        self.state.primary.remove(&victim);
        self.remove_index_entries(&victim);
        debug!("evicted entry to stay within capacity {:?}", self.capacity);
    }

    fn remove_index_entries(&mut self, key: &K) {
        let state = &mut *self.state;
        state.index_one.retain(|_, target| target != key);
        state.index_two.retain(|_, target| target != key);
    }
}
