use rand::Rng;
use std::collections::hash_map::DefaultHasher;
use std::collections::{BTreeMap, HashMap};
use std::hash::{Hash, Hasher};

/// Bookkeeping for one eviction rule. The store reports every change to its primary keys and
/// asks for a victim when a new key would exceed the capacity.
pub(crate) trait Policy<K>: Send {
    /// A key that was not in the store has been added.
    fn inserted(&mut self, key: &K);
    /// An existing key has been overwritten.
    fn updated(&mut self, key: &K);
    /// An existing key has been read.
    fn accessed(&mut self, key: &K);
    fn removed(&mut self, key: &K);
    /// Picks the next key to evict and forgets it.
    fn victim(&mut self) -> Option<K>;
    fn clear(&mut self);
}

/// Never evicts.
pub(crate) struct Unbounded;

impl<K> Policy<K> for Unbounded {
    fn inserted(&mut self, _key: &K) {}
    fn updated(&mut self, _key: &K) {}
    fn accessed(&mut self, _key: &K) {}
    fn removed(&mut self, _key: &K) {}

    fn victim(&mut self) -> Option<K> {
        None
    }

    fn clear(&mut self) {}
}

/// Keeps keys in a dense vector so a uniformly random one can be taken in O(1).
pub(crate) struct Random<K> {
    keys: Vec<K>,
    positions: HashMap<K, usize>,
}

impl<K> Random<K> {
    pub(crate) fn new() -> Random<K> {
        Random {
            keys: vec![],
            positions: HashMap::new(),
        }
    }
}

impl<K: Eq + Hash + Clone> Random<K> {
    fn take(&mut self, position: usize) -> K {
        let key = self.keys.swap_remove(position);
        self.positions.remove(&key);
        if let Some(moved) = self.keys.get(position) {
            self.positions.insert(moved.clone(), position);
        }
        key
    }
}

impl<K: Eq + Hash + Clone + Send> Policy<K> for Random<K> {
    fn inserted(&mut self, key: &K) {
        self.positions.insert(key.clone(), self.keys.len());
        self.keys.push(key.clone());
    }

    fn updated(&mut self, _key: &K) {}

    fn accessed(&mut self, _key: &K) {}

    fn removed(&mut self, key: &K) {
        if let Some(&position) = self.positions.get(key) {
            self.take(position);
        }
    }

    fn victim(&mut self) -> Option<K> {
        if self.keys.is_empty() {
            return None;
        }
        let position = rand::thread_rng().gen_range(0..self.keys.len());
        Some(self.take(position))
    }

    fn clear(&mut self) {
        self.keys.clear();
        self.positions.clear();
    }
}

/// Keys ordered from least to most recently touched, by a logical clock.
struct Recency<K> {
    clock: u64,
    order: BTreeMap<u64, K>,
    stamps: HashMap<K, u64>,
}

impl<K> Recency<K> {
    fn new() -> Recency<K> {
        Recency {
            clock: 0,
            order: BTreeMap::new(),
            stamps: HashMap::new(),
        }
    }

    fn len(&self) -> usize {
        self.order.len()
    }

    fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    fn oldest(&self) -> Option<&K> {
        self.order.first_key_value().map(|(_, key)| key)
    }

    fn clear(&mut self) {
        self.order.clear();
        self.stamps.clear();
    }
}

impl<K: Eq + Hash + Clone> Recency<K> {
    /// Adds `key` as the newest entry, moving it there if already present.
    fn touch(&mut self, key: &K) {
        if let Some(previous) = self.stamps.insert(key.clone(), self.clock) {
            self.order.remove(&previous);
        }
        self.order.insert(self.clock, key.clone());
        self.clock += 1;
    }

    fn contains(&self, key: &K) -> bool {
        self.stamps.contains_key(key)
    }

    fn remove(&mut self, key: &K) -> bool {
        match self.stamps.remove(key) {
            Some(stamp) => {
                self.order.remove(&stamp);
                true
            }
            None => false,
        }
    }

    fn pop_oldest(&mut self) -> Option<K> {
        let (_, key) = self.order.pop_first()?;
        self.stamps.remove(&key);
        Some(key)
    }

    fn pop_newest(&mut self) -> Option<K> {
        let (_, key) = self.order.pop_last()?;
        self.stamps.remove(&key);
        Some(key)
    }
}

/// Backs LRU, MRU and FIFO, which only differ in which events move a key to the newest
/// position and which end gets evicted.
pub(crate) struct Ordered<K> {
    recency: Recency<K>,
    refresh_on_use: bool,
    evict_newest: bool,
}

impl<K> Ordered<K> {
    pub(crate) fn lru() -> Ordered<K> {
        Self::new(true, false)
    }

    pub(crate) fn mru() -> Ordered<K> {
        Self::new(true, true)
    }

    pub(crate) fn fifo() -> Ordered<K> {
        Self::new(false, false)
    }

    fn new(refresh_on_use: bool, evict_newest: bool) -> Ordered<K> {
        Ordered {
            recency: Recency::new(),
            refresh_on_use,
            evict_newest,
        }
    }
}

impl<K: Eq + Hash + Clone + Send> Policy<K> for Ordered<K> {
    fn inserted(&mut self, key: &K) {
        self.recency.touch(key);
    }

    fn updated(&mut self, key: &K) {
        if self.refresh_on_use {
            self.recency.touch(key);
        }
    }

    fn accessed(&mut self, key: &K) {
        if self.refresh_on_use {
            self.recency.touch(key);
        }
    }

    fn removed(&mut self, key: &K) {
        self.recency.remove(key);
    }

    fn victim(&mut self) -> Option<K> {
        if self.evict_newest {
            self.recency.pop_newest()
        } else {
            self.recency.pop_oldest()
        }
    }

    fn clear(&mut self) {
        self.recency.clear();
    }
}

/// Least frequently used. Ties go to the key inserted first.
pub(crate) struct Lfu<K> {
    sequence: u64,
    // (frequency, insertion sequence) -> key
    order: BTreeMap<(u64, u64), K>,
    ranks: HashMap<K, (u64, u64)>,
}

impl<K> Lfu<K> {
    pub(crate) fn new() -> Lfu<K> {
        Lfu {
            sequence: 0,
            order: BTreeMap::new(),
            ranks: HashMap::new(),
        }
    }
}

impl<K: Eq + Hash + Clone> Lfu<K> {
    fn bump(&mut self, key: &K) {
        if let Some(rank) = self.ranks.get_mut(key) {
            if let Some(key) = self.order.remove(&*rank) {
                rank.0 += 1;
                self.order.insert(*rank, key);
            }
        }
    }

    #[cfg(test)]
    fn frequency(&self, key: &K) -> Option<u64> {
        self.ranks.get(key).map(|&(frequency, _)| frequency)
    }
}

impl<K: Eq + Hash + Clone + Send> Policy<K> for Lfu<K> {
    fn inserted(&mut self, key: &K) {
        let rank = (1, self.sequence);
        self.sequence += 1;
        self.ranks.insert(key.clone(), rank);
        self.order.insert(rank, key.clone());
    }

    fn updated(&mut self, key: &K) {
        self.bump(key);
    }

    fn accessed(&mut self, key: &K) {
        self.bump(key);
    }

    fn removed(&mut self, key: &K) {
        if let Some(rank) = self.ranks.remove(key) {
            self.order.remove(&rank);
        }
    }

    fn victim(&mut self) -> Option<K> {
        let (_, key) = self.order.pop_first()?;
        self.ranks.remove(&key);
        Some(key)
    }

    fn clear(&mut self) {
        self.order.clear();
        self.ranks.clear();
    }
}

/// Second chance. Keys sit on a ring with a reference bit that every use sets; the hand
/// clears bits as it sweeps and evicts the first key whose bit is already clear.
pub(crate) struct Clock<K> {
    ring: Vec<K>,
    referenced: HashMap<K, bool>,
    hand: usize,
}

impl<K> Clock<K> {
    pub(crate) fn new() -> Clock<K> {
        Clock {
            ring: vec![],
            referenced: HashMap::new(),
            hand: 0,
        }
    }
}

impl<K: Eq + Hash + Clone> Clock<K> {
    fn reference(&mut self, key: &K) {
        if let Some(bit) = self.referenced.get_mut(key) {
            *bit = true;
        }
    }
}

impl<K: Eq + Hash + Clone + Send> Policy<K> for Clock<K> {
    fn inserted(&mut self, key: &K) {
        // New keys go right behind the hand so they are the last to be swept.
        self.hand = self.hand.min(self.ring.len());
        self.ring.insert(self.hand, key.clone());
        self.hand += 1;
        self.referenced.insert(key.clone(), true);
    }

    fn updated(&mut self, key: &K) {
        self.reference(key);
    }

    fn accessed(&mut self, key: &K) {
        self.reference(key);
    }

    fn removed(&mut self, key: &K) {
        if self.referenced.remove(key).is_none() {
            return;
        }
        if let Some(position) = self.ring.iter().position(|k| k == key) {
            self.ring.remove(position);
            if position < self.hand {
                self.hand -= 1;
            }
        }
    }

    fn victim(&mut self) -> Option<K> {
        if self.ring.is_empty() {
            return None;
        }

        // Terminates within two sweeps: the first one clears every bit.
        loop {
            if self.hand >= self.ring.len() {
                self.hand = 0;
            }

            let key = &self.ring[self.hand];
            match self.referenced.get_mut(key) {
                Some(bit) if *bit => {
                    *bit = false;
                    self.hand += 1;
                }
                _ => {
                    let key = self.ring.remove(self.hand);
                    self.referenced.remove(&key);
                    return Some(key);
                }
            }
        }
    }

    fn clear(&mut self) {
        self.ring.clear();
        self.referenced.clear();
        self.hand = 0;
    }
}

/// Adaptive replacement. Keys seen once live in `recent`, keys seen again move to
/// `frequent`. Evicted keys are remembered as ghosts, and a miss on a ghost shifts `target`
/// (the share of the capacity given to `recent`) towards the list that lost it.
pub(crate) struct Adaptive<K> {
    capacity: usize,
    target: usize,
    recent: Recency<K>,
    frequent: Recency<K>,
    recent_ghosts: Recency<K>,
    frequent_ghosts: Recency<K>,
}

impl<K> Adaptive<K> {
    pub(crate) fn new(capacity: usize) -> Adaptive<K> {
        Adaptive {
            capacity,
            target: 0,
            recent: Recency::new(),
            frequent: Recency::new(),
            recent_ghosts: Recency::new(),
            frequent_ghosts: Recency::new(),
        }
    }

    #[cfg(test)]
    fn target(&self) -> usize {
        self.target
    }
}

impl<K: Eq + Hash + Clone> Adaptive<K> {
    fn promote(&mut self, key: &K) {
        if self.recent.remove(key) || self.frequent.contains(key) {
            self.frequent.touch(key);
        }
    }

    // Ghost lists together never remember more keys than the cache holds.
    fn trim_ghosts(&mut self) {
        while self.recent_ghosts.len() + self.frequent_ghosts.len() > self.capacity {
            if self.recent_ghosts.len() >= self.frequent_ghosts.len() {
                self.recent_ghosts.pop_oldest();
            } else {
                self.frequent_ghosts.pop_oldest();
            }
        }
    }
}

impl<K: Eq + Hash + Clone + Send> Policy<K> for Adaptive<K> {
    fn inserted(&mut self, key: &K) {
        if self.recent_ghosts.contains(key) {
            let delta = (self.frequent_ghosts.len() / self.recent_ghosts.len()).max(1);
            self.target = (self.target + delta).min(self.capacity);
            self.recent_ghosts.remove(key);
            self.frequent.touch(key);
        } else if self.frequent_ghosts.contains(key) {
            let delta = (self.recent_ghosts.len() / self.frequent_ghosts.len()).max(1);
            self.target = self.target.saturating_sub(delta);
            self.frequent_ghosts.remove(key);
            self.frequent.touch(key);
        } else {
            self.recent.touch(key);
        }
    }

    fn updated(&mut self, key: &K) {
        self.promote(key);
    }

    fn accessed(&mut self, key: &K) {
        self.promote(key);
    }

    fn removed(&mut self, key: &K) {
        self.recent.remove(key);
        self.frequent.remove(key);
        self.recent_ghosts.remove(key);
        self.frequent_ghosts.remove(key);
    }

    fn victim(&mut self) -> Option<K> {
        let from_recent =
            !self.recent.is_empty() && (self.recent.len() > self.target || self.frequent.is_empty());

        let key = if from_recent {
            let key = self.recent.pop_oldest()?;
            self.recent_ghosts.touch(&key);
            key
        } else {
            let key = self.frequent.pop_oldest()?;
            self.frequent_ghosts.touch(&key);
            key
        };

        self.trim_ghosts();
        Some(key)
    }

    fn clear(&mut self) {
        self.target = 0;
        self.recent.clear();
        self.frequent.clear();
        self.recent_ghosts.clear();
        self.frequent_ghosts.clear();
    }
}

/// 2Q. New keys enter a small FIFO (`fresh`) and are evicted from there first, remembered
/// as ghosts. A key inserted again while its ghost is remembered goes straight to the LRU
/// `hot` queue, so one-off scans do not flush keys that are actually reused.
pub(crate) struct TwoQueues<K> {
    fresh_capacity: usize,
    ghost_capacity: usize,
    fresh: Recency<K>,
    hot: Recency<K>,
    ghosts: Recency<K>,
}

impl<K> TwoQueues<K> {
    pub(crate) fn new(capacity: usize) -> TwoQueues<K> {
        TwoQueues {
            fresh_capacity: (capacity / 4).max(1),
            ghost_capacity: (capacity / 2).max(1),
            fresh: Recency::new(),
            hot: Recency::new(),
            ghosts: Recency::new(),
        }
    }
}

impl<K: Eq + Hash + Clone + Send> Policy<K> for TwoQueues<K> {
    fn inserted(&mut self, key: &K) {
        if self.ghosts.remove(key) {
            self.hot.touch(key);
        } else {
            self.fresh.touch(key);
        }
    }

    fn updated(&mut self, key: &K) {
        self.accessed(key);
    }

    fn accessed(&mut self, key: &K) {
        // Hits in the fresh queue do not reorder it.
        if self.hot.contains(key) {
            self.hot.touch(key);
        }
    }

    fn removed(&mut self, key: &K) {
        self.fresh.remove(key);
        self.hot.remove(key);
        self.ghosts.remove(key);
    }

    fn victim(&mut self) -> Option<K> {
        if self.fresh.len() > self.fresh_capacity || self.hot.is_empty() {
            let key = self.fresh.pop_oldest()?;
            self.ghosts.touch(&key);
            while self.ghosts.len() > self.ghost_capacity {
                self.ghosts.pop_oldest();
            }
            Some(key)
        } else {
            self.hot.pop_oldest()
        }
    }

    fn clear(&mut self) {
        self.fresh.clear();
        self.hot.clear();
        self.ghosts.clear();
    }
}

/// TinyLFU admission in front of an LRU. New keys land in a small `window`; once it
/// overflows they move to `main`. When room is needed the oldest window key competes with
/// the oldest main key and the one with the lower estimated frequency is evicted.
pub(crate) struct TinyLfu<K> {
    window_capacity: usize,
    window: Recency<K>,
    main: Recency<K>,
    sketch: FrequencySketch,
}

impl<K> TinyLfu<K> {
    pub(crate) fn new(capacity: usize) -> TinyLfu<K> {
        TinyLfu {
            window_capacity: (capacity / 100).max(1),
            window: Recency::new(),
            main: Recency::new(),
            sketch: FrequencySketch::new(capacity),
        }
    }
}

impl<K: Eq + Hash + Clone + Send> Policy<K> for TinyLfu<K> {
    fn inserted(&mut self, key: &K) {
        self.sketch.increment(key);
        self.window.touch(key);

        if self.window.len() > self.window_capacity {
            if let Some(overflow) = self.window.pop_oldest() {
                self.main.touch(&overflow);
            }
        }
    }

    fn updated(&mut self, key: &K) {
        self.accessed(key);
    }

    fn accessed(&mut self, key: &K) {
        self.sketch.increment(key);
        if self.window.contains(key) {
            self.window.touch(key);
        } else if self.main.contains(key) {
            self.main.touch(key);
        }
    }

    fn removed(&mut self, key: &K) {
        self.window.remove(key);
        self.main.remove(key);
    }

    fn victim(&mut self) -> Option<K> {
        let candidate = self.window.oldest().cloned();
        let resident = self.main.oldest().cloned();

        match (candidate, resident) {
            (Some(candidate), Some(resident)) => {
                self.window.remove(&candidate);
                if self.sketch.frequency(&candidate) > self.sketch.frequency(&resident) {
                    self.main.remove(&resident);
                    self.main.touch(&candidate);
                    Some(resident)
                } else {
                    Some(candidate)
                }
            }
            (Some(_), None) => self.window.pop_oldest(),
            (None, _) => self.main.pop_oldest(),
        }
    }

    fn clear(&mut self) {
        self.window.clear();
        self.main.clear();
        self.sketch.clear();
    }
}

const SKETCH_DEPTH: usize = 4;
const SKETCH_SEEDS: [u64; SKETCH_DEPTH] = [
    0x9e37_79b9_7f4a_7c15,
    0xc2b2_ae3d_27d4_eb4f,
    0x1656_67b1_9e37_79f9,
    0x85eb_ca77_c2b2_ae63,
];

/// Count-min sketch of access frequencies. Every counter is halved once the number of
/// increments reaches the sample size, so old popularity fades.
struct FrequencySketch {
    width: usize,
    table: Vec<u8>,
    additions: usize,
    sample_size: usize,
}

impl FrequencySketch {
    fn new(capacity: usize) -> FrequencySketch {
        let width = capacity.clamp(16, 1 << 20).next_power_of_two();
        FrequencySketch {
            width,
            table: vec![0; width * SKETCH_DEPTH],
            additions: 0,
            sample_size: width * 10,
        }
    }

    fn slot<K: Hash>(&self, row: usize, key: &K) -> usize {
        let mut hasher = DefaultHasher::new();
        SKETCH_SEEDS[row].hash(&mut hasher);
        key.hash(&mut hasher);
        row * self.width + (hasher.finish() as usize & (self.width - 1))
    }

    fn increment<K: Hash>(&mut self, key: &K) {
        for row in 0..SKETCH_DEPTH {
            let slot = self.slot(row, key);
            self.table[slot] = self.table[slot].saturating_add(1);
        }

        self.additions += 1;
        if self.additions >= self.sample_size {
            self.table.iter_mut().for_each(|counter| *counter /= 2);
            self.additions /= 2;
        }
    }

    fn frequency<K: Hash>(&self, key: &K) -> u8 {
        (0..SKETCH_DEPTH)
            .map(|row| self.table[self.slot(row, key)])
            .min()
            .unwrap_or(0)
    }

    fn clear(&mut self) {
        self.table.iter_mut().for_each(|counter| *counter = 0);
        self.additions = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn insert_all<P: Policy<&'static str>>(policy: &mut P, keys: &[&'static str]) {
        for key in keys {
            policy.inserted(key);
        }
    }

    #[test]
    fn unbounded_never_picks_a_victim() {
        let mut policy = Unbounded;
        Policy::<&str>::inserted(&mut policy, &"a");

        assert_eq!(Policy::<&str>::victim(&mut policy), None);
    }

    #[test]
    fn lru_evicts_least_recently_used() {
        let mut policy = Ordered::lru();
        insert_all(&mut policy, &["a", "b", "c"]);

        policy.accessed(&"a");
        policy.updated(&"b");

        assert_eq!(policy.victim(), Some("c"));
        assert_eq!(policy.victim(), Some("a"));
        assert_eq!(policy.victim(), Some("b"));
        assert_eq!(policy.victim(), None);
    }

    #[test]
    fn mru_evicts_most_recently_used() {
        let mut policy = Ordered::mru();
        insert_all(&mut policy, &["a", "b", "c"]);

        policy.accessed(&"a");

        assert_eq!(policy.victim(), Some("a"));
        assert_eq!(policy.victim(), Some("c"));
    }

    #[test]
    fn fifo_ignores_access() {
        let mut policy = Ordered::fifo();
        insert_all(&mut policy, &["a", "b", "c"]);

        policy.accessed(&"a");
        policy.updated(&"a");

        assert_eq!(policy.victim(), Some("a"));
        assert_eq!(policy.victim(), Some("b"));
    }

    #[test]
    fn ordered_forgets_removed_keys() {
        let mut policy = Ordered::lru();
        insert_all(&mut policy, &["a", "b"]);

        policy.removed(&"a");

        assert_eq!(policy.victim(), Some("b"));
        assert_eq!(policy.victim(), None);
    }

    #[test]
    fn lfu_evicts_least_frequent() {
        let mut policy = Lfu::new();
        insert_all(&mut policy, &["a", "b", "c"]);

        policy.accessed(&"a");
        policy.accessed(&"a");
        policy.accessed(&"b");

        assert_eq!(policy.frequency(&"a"), Some(3));
        assert_eq!(policy.frequency(&"b"), Some(2));
        assert_eq!(policy.victim(), Some("c"));
        assert_eq!(policy.victim(), Some("b"));
    }

    #[test]
    fn lfu_ties_go_to_oldest_insertion() {
        let mut policy = Lfu::new();
        insert_all(&mut policy, &["a", "b", "c"]);

        policy.accessed(&"a");
        policy.accessed(&"b");
        policy.accessed(&"c");

        assert_eq!(policy.victim(), Some("a"));
    }

    #[test]
    fn lfu_put_counts_as_use() {
        let mut policy = Lfu::new();
        insert_all(&mut policy, &["a", "b"]);

        policy.updated(&"a");

        assert_eq!(policy.victim(), Some("b"));
    }

    #[test]
    fn random_picks_a_tracked_key() {
        let mut policy = Random::new();
        insert_all(&mut policy, &["a", "b", "c"]);
        policy.removed(&"b");

        let mut victims = vec![policy.victim().unwrap(), policy.victim().unwrap()];
        victims.sort();

        assert_eq!(victims, vec!["a", "c"]);
        assert_eq!(policy.victim(), None);
    }

    #[test]
    fn clock_gives_referenced_keys_a_second_chance() {
        let mut policy = Clock::new();
        insert_all(&mut policy, &["a", "b", "c"]);

        // First sweep clears every bit and comes back around to "a".
        assert_eq!(policy.victim(), Some("a"));

        policy.accessed(&"b");
        assert_eq!(policy.victim(), Some("c"));
        assert_eq!(policy.victim(), Some("b"));
        assert_eq!(policy.victim(), None);
    }

    #[test]
    fn clock_forgets_removed_keys() {
        let mut policy = Clock::new();
        insert_all(&mut policy, &["a", "b", "c"]);

        policy.removed(&"a");

        let mut victims = vec![policy.victim().unwrap(), policy.victim().unwrap()];
        victims.sort();
        assert_eq!(victims, vec!["b", "c"]);
    }

    #[test]
    fn arc_adapts_towards_the_list_that_lost_a_key() {
        let mut policy = Adaptive::new(2);
        insert_all(&mut policy, &["a", "b"]);

        // "a" is seen twice and moves to the frequent list.
        policy.accessed(&"a");
        assert_eq!(policy.victim(), Some("b"));

        policy.inserted(&"c");
        assert_eq!(policy.victim(), Some("c"));

        // "b" comes back while its ghost is remembered: recency gets more room and "b" is
        // now considered frequent.
        policy.inserted(&"b");
        assert_eq!(policy.target(), 1);
        assert_eq!(policy.victim(), Some("a"));

        // Same for a key evicted from the frequent list, which shrinks the target again.
        policy.inserted(&"a");
        assert_eq!(policy.target(), 0);
        assert_eq!(policy.victim(), Some("b"));
        assert_eq!(policy.victim(), Some("a"));
        assert_eq!(policy.victim(), None);
    }

    #[test]
    fn arc_forgets_removed_keys() {
        let mut policy = Adaptive::new(4);
        insert_all(&mut policy, &["a", "b"]);
        policy.accessed(&"b");

        policy.removed(&"a");
        policy.removed(&"b");

        assert_eq!(policy.victim(), None);
    }

    #[test]
    fn two_queues_evicts_fresh_keys_first() {
        let mut policy = TwoQueues::new(4);
        insert_all(&mut policy, &["a", "b", "c", "d"]);

        // A hit while still in the fresh queue does not save "a".
        policy.accessed(&"a");
        assert_eq!(policy.victim(), Some("a"));

        // Inserted again while remembered, "a" goes to the hot queue.
        policy.inserted(&"a");
        assert_eq!(policy.victim(), Some("b"));
        assert_eq!(policy.victim(), Some("c"));

        // The fresh queue is back to its share, so the hot queue gives up its oldest key.
        assert_eq!(policy.victim(), Some("a"));
        assert_eq!(policy.victim(), Some("d"));
        assert_eq!(policy.victim(), None);
    }

    #[test]
    fn two_queues_hot_queue_is_lru() {
        let mut policy = TwoQueues::new(8);
        insert_all(&mut policy, &["a", "b", "c"]);
        for _ in 0..3 {
            policy.victim();
        }
        insert_all(&mut policy, &["a", "b", "c"]);

        policy.accessed(&"a");

        assert_eq!(policy.victim(), Some("b"));
        assert_eq!(policy.victim(), Some("c"));
        assert_eq!(policy.victim(), Some("a"));
    }

    #[test]
    fn tinylfu_rejects_newcomers_with_little_history() {
        let mut policy = TinyLfu::new(3);
        insert_all(&mut policy, &["a", "b", "c"]);

        for _ in 0..3 {
            policy.accessed(&"a");
        }

        // "c" (window) and "b" (oldest in main) were both seen once, the newcomer loses.
        assert_eq!(policy.victim(), Some("c"));

        policy.inserted(&"d");
        for _ in 0..3 {
            policy.accessed(&"d");
        }

        // "d" is now more popular than "b" and takes its place in main.
        assert_eq!(policy.victim(), Some("b"));

        policy.inserted(&"e");
        assert_eq!(policy.victim(), Some("e"));
    }

    #[test]
    fn tinylfu_forgets_removed_keys() {
        let mut policy = TinyLfu::new(3);
        insert_all(&mut policy, &["a", "b"]);

        policy.removed(&"a");

        assert_eq!(policy.victim(), Some("b"));
        assert_eq!(policy.victim(), None);
    }

    #[test]
    fn sketch_counts_and_ages() {
        let mut sketch = FrequencySketch::new(16);

        for _ in 0..100 {
            sketch.increment(&"a");
        }
        assert_eq!(sketch.frequency(&"a"), 100);
        assert_eq!(sketch.frequency(&"never"), 0);

        // The 160th increment reaches the sample size and halves every counter.
        for _ in 0..60 {
            sketch.increment(&"b");
        }
        assert_eq!(sketch.frequency(&"a"), 50);
        assert_eq!(sketch.frequency(&"b"), 30);
    }

    #[test]
    fn clear_resets_bookkeeping() {
        let mut policy = Lfu::new();
        insert_all(&mut policy, &["a", "b"]);

        policy.clear();

        assert_eq!(policy.victim(), None);
    }
}
