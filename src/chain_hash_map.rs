//! ChainHashMap: bucket array with inline heads and arena-backed overflow chains.

use crate::config::Config;
use crate::error::{PutError, TableError};
use crate::key_ops::{KeyOps, Nullable};
use crate::release::{NoRelease, Release};
use core::mem;
use slotmap::{new_key_type, SlotMap};

new_key_type! {
    /// Arena key linking overflow chain nodes.
    struct NodeKey;
}

#[derive(Debug)]
struct Entry<K, V> {
    key: K,
    value: V,
    hash: u32,
}

#[derive(Debug)]
struct Node<K, V> {
    entry: Entry<K, V>,
    next: Option<NodeKey>,
}

/// A bucket. The occupied head lives inline in the bucket array; a slot
/// with a non-empty chain is never vacant.
#[derive(Debug)]
enum Slot<K, V> {
    Vacant,
    Occupied(Node<K, V>),
}

/// Where a key was found within its slot.
#[derive(Copy, Clone, Debug)]
enum Location {
    Head,
    /// `prev` is `None` when the predecessor is the inline head.
    Chained {
        prev: Option<NodeKey>,
        node: NodeKey,
    },
}

fn alloc_buckets<K, V>(capacity: usize) -> Result<Vec<Slot<K, V>>, TableError> {
    #[cfg(test)]
    let capacity = if alloc_failure::take() { usize::MAX } else { capacity };
    let mut buckets = Vec::new();
    buckets.try_reserve_exact(capacity)?;
    buckets.resize_with(capacity, || Slot::Vacant);
    Ok(buckets)
}


/// Occupancy snapshot returned by [`ChainHashMap::stats`].
#[derive(Clone, Debug, PartialEq)]
pub struct ChainStats {
    /// Live key/value pairs
    pub len: usize,
    /// Bucket slots
    pub capacity: usize,
    /// Slots holding an inline head
    pub occupied_slots: usize,
    /// Overflow nodes across all chains
    pub chain_nodes: usize,
    /// Entries in the fullest slot, head included
    pub longest_chain: usize,
    /// `len / capacity`
    pub load_factor: f64,
}

/// Single-threaded hash map with separate chaining.
///
/// Hashing and key equality come from `O: KeyOps<K>`. Keys and values the
/// map lets go of are passed to the `FK`/`FV` release hooks, exactly once
/// each.
pub struct ChainHashMap<K, V, O, FK = NoRelease, FV = NoRelease>
where
    FK: Release<K>,
    FV: Release<V>,
{
    ops: O,
    key_release: FK,
    value_release: FV,
    buckets: Vec<Slot<K, V>>,
    chains: SlotMap<NodeKey, Node<K, V>>,
    mask: usize,
    count: usize,
    growth_threshold: usize,
    config: Config,
}

impl<K, V, O> ChainHashMap<K, V, O>
where
    O: KeyOps<K>,
{
    /// Creates an empty map with 128 slots and no release hooks.
    pub fn new(ops: O) -> Result<Self, TableError> {
        Self::with_config(ops, NoRelease, NoRelease, Config::default())
    }
}

impl<K, V, O, FK, FV> ChainHashMap<K, V, O, FK, FV>
where
    O: KeyOps<K>,
    FK: Release<K>,
    FV: Release<V>,
{
    /// Creates an empty map whose released keys and values go to the
    /// given hooks.
    pub fn with_release(ops: O, key_release: FK, value_release: FV) -> Result<Self, TableError> {
        Self::with_config(ops, key_release, value_release, Config::default())
    }

    /// # Panics
    ///
    /// Panics if `config.initial_capacity` is not a power of two or
    /// `config.fill_rate` is outside `(0, 1]`.
    pub fn with_config(
        ops: O,
        key_release: FK,
        value_release: FV,
        config: Config,
    ) -> Result<Self, TableError> {
        config.validate();
        let capacity = config.initial_capacity;
        let buckets = alloc_buckets(capacity)?;
        log::trace!("Created chain hash map with {capacity} slots");
        Ok(Self {
            ops,
            key_release,
            value_release,
            buckets,
            chains: SlotMap::with_key(),
            mask: capacity - 1,
            count: 0,
            growth_threshold: config.growth_threshold(capacity),
            config,
        })
    }

    pub fn len(&self) -> usize {
        self.count
    }
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
    /// Number of bucket slots, always a power of two.
    pub fn capacity(&self) -> usize {
        self.buckets.len()
    }

    #[inline]
    fn slot_index(&self, hash: u32) -> usize {
        hash as usize & self.mask
    }

    #[inline]
    fn matches(&self, entry: &Entry<K, V>, hash: u32, key: &K) -> bool {
        entry.hash == hash && self.ops.equal(&entry.key, key)
    }

    fn locate(&self, idx: usize, hash: u32, key: &K) -> Option<Location> {
        let Slot::Occupied(head) = &self.buckets[idx] else {
            return None;
        };
        if self.matches(&head.entry, hash, key) {
            return Some(Location::Head);
        }
        let mut prev = None;
        let mut cursor = head.next;
        while let Some(node_key) = cursor {
            let node = &self.chains[node_key];
            if self.matches(&node.entry, hash, key) {
                return Some(Location::Chained {
                    prev,
                    node: node_key,
                });
            }
            prev = Some(node_key);
            cursor = node.next;
        }
        None
    }

    fn entry(&self, idx: usize, loc: Location) -> Option<&Entry<K, V>> {
        match loc {
            Location::Head => match &self.buckets[idx] {
                Slot::Occupied(head) => Some(&head.entry),
                Slot::Vacant => None,
            },
            Location::Chained { node, .. } => self.chains.get(node).map(|n| &n.entry),
        }
    }

    fn entry_mut(&mut self, idx: usize, loc: Location) -> Option<&mut Entry<K, V>> {
        match loc {
            Location::Head => match &mut self.buckets[idx] {
                Slot::Occupied(head) => Some(&mut head.entry),
                Slot::Vacant => None,
            },
            Location::Chained { node, .. } => self.chains.get_mut(node).map(|n| &mut n.entry),
        }
    }

    /// Inserts `key -> value`, replacing the value of an equal key.
    ///
    /// On replacement the previously stored key and value go through the
    /// release hooks and the caller's pair takes their place. A new pair
    /// lands in the slot's inline head when it is vacant, otherwise in a
    /// chain node prepended after the head. Reaching the growth threshold
    /// doubles the slot count before returning.
    ///
    /// Every pair is stored, including null pointers. Use
    /// [`put_nullable`](Self::put_nullable) to skip pairs whose key and
    /// value are both null.
    pub fn put(&mut self, key: K, value: V) -> Result<(), PutError<K, V>> {
        let hash = self.ops.hash(&key);
        let idx = self.slot_index(hash);

        if let Some(loc) = self.locate(idx, hash, &key) {
            if let Some(entry) = self.entry_mut(idx, loc) {
                let old_key = mem::replace(&mut entry.key, key);
                let old_value = mem::replace(&mut entry.value, value);
                entry.hash = hash;
                self.key_release.release(old_key);
                self.value_release.release(old_value);
                return Ok(());
            }
        }

        let entry = Entry { key, value, hash };
        let slot = &mut self.buckets[idx];
        match slot {
            Slot::Vacant => {
                *slot = Slot::Occupied(Node { entry, next: None });
            }
            Slot::Occupied(head) => {
                if let Some(budget) = self.config.node_budget {
                    if self.chains.len() >= budget {
                        return Err(PutError {
                            key: entry.key,
                            value: entry.value,
                            cause: TableError::NodeBudgetExhausted { budget },
                        });
                    }
                }
                let node_key = self.chains.insert(Node {
                    entry,
                    next: head.next,
                });
                head.next = Some(node_key);
            }
        }

        self.count += 1;
        if self.count >= self.growth_threshold {
            self.grow();
        }
        Ok(())
    }

    /// Like [`put`](Self::put), except that a pair whose key and value are
    /// both null is dropped without touching the map and reports success.
    /// A null key with a live value, or the reverse, is stored as usual.
    pub fn put_nullable(&mut self, key: K, value: V) -> Result<(), PutError<K, V>>
    where
        K: Nullable,
        V: Nullable,
    {
        if key.is_null() && value.is_null() {
            log::trace!("Ignoring put of a null key with a null value");
            return Ok(());
        }
        self.put(key, value)
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        let hash = self.ops.hash(key);
        let idx = self.slot_index(hash);
        let loc = self.locate(idx, hash, key)?;
        self.entry(idx, loc).map(|e| &e.value)
    }

    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let hash = self.ops.hash(key);
        let idx = self.slot_index(hash);
        let loc = self.locate(idx, hash, key)?;
        self.entry_mut(idx, loc).map(|e| &mut e.value)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        let hash = self.ops.hash(key);
        self.locate(self.slot_index(hash), hash, key).is_some()
    }

    /// Removes `key`, passing the stored key and value to the release hooks.
    /// Returns `false` if the key was not present.
    pub fn remove(&mut self, key: &K) -> bool {
        match self.unlink(key) {
            Some(entry) => {
                self.release(entry);
                true
            }
            None => false,
        }
    }

    /// Removes `key` and hands the stored pair to the caller. Release hooks
    /// do not run.
    pub fn take(&mut self, key: &K) -> Option<(K, V)> {
        self.unlink(key).map(|e| (e.key, e.value))
    }

    fn unlink(&mut self, key: &K) -> Option<Entry<K, V>> {
        let hash = self.ops.hash(key);
        let idx = self.slot_index(hash);
        let loc = self.locate(idx, hash, key)?;

        let removed = match loc {
            Location::Head => {
                let slot = &mut self.buckets[idx];
                let Slot::Occupied(head) = slot else {
                    return None;
                };
                let next = head.next;
                match next {
                    // Pull the successor up so the head stays populated.
                    Some(succ_key) => {
                        let succ = self.chains.remove(succ_key)?;
                        head.next = succ.next;
                        mem::replace(&mut head.entry, succ.entry)
                    }
                    None => match mem::replace(slot, Slot::Vacant) {
                        Slot::Occupied(node) => node.entry,
                        Slot::Vacant => return None,
                    },
                }
            }
            Location::Chained { prev, node } => {
                let unlinked = self.chains.remove(node)?;
                match prev {
                    None => {
                        if let Slot::Occupied(head) = &mut self.buckets[idx] {
                            head.next = unlinked.next;
                        }
                    }
                    Some(prev_key) => self.chains[prev_key].next = unlinked.next,
                }
                unlinked.entry
            }
        };

        self.count -= 1;
        Some(removed)
    }

    /// Doubles the slot count and rehashes every entry under the new mask.
    ///
    /// Chain nodes keep their arena slot and are relinked; an inline head
    /// that lands on an occupied slot gets a fresh node. If the new array
    /// cannot be allocated the map stays as it is and the next insertion
    /// retries.
    fn grow(&mut self) {
        let old_capacity = self.buckets.len();
        let Some(capacity) = old_capacity.checked_mul(2) else {
            log::warn!("Cannot grow chain hash map beyond {old_capacity} slots");
            return;
        };
        let mut buckets = match alloc_buckets::<K, V>(capacity) {
            Ok(buckets) => buckets,
            Err(e) => {
                log::warn!("Skipping resize to {capacity} slots: {e}");
                return;
            }
        };
        let mask = capacity - 1;

        for slot in mem::take(&mut self.buckets) {
            let Slot::Occupied(head) = slot else {
                continue;
            };
            let mut cursor = head.next;
            Self::place(&mut buckets, &mut self.chains, mask, head.entry);

            while let Some(node_key) = cursor {
                let node = &self.chains[node_key];
                cursor = node.next;
                let target = &mut buckets[node.entry.hash as usize & mask];
                match target {
                    Slot::Vacant => {
                        if let Some(node) = self.chains.remove(node_key) {
                            *target = Slot::Occupied(Node {
                                entry: node.entry,
                                next: None,
                            });
                        }
                    }
                    Slot::Occupied(new_head) => {
                        self.chains[node_key].next = new_head.next;
                        new_head.next = Some(node_key);
                    }
                }
            }
        }

        self.buckets = buckets;
        self.mask = mask;
        self.growth_threshold = self.config.growth_threshold(capacity);
        log::debug!(
            "Grew chain hash map from {old_capacity} to {capacity} slots ({} entries)",
            self.count
        );
    }

    fn place(
        buckets: &mut [Slot<K, V>],
        chains: &mut SlotMap<NodeKey, Node<K, V>>,
        mask: usize,
        entry: Entry<K, V>,
    ) {
        let slot = &mut buckets[entry.hash as usize & mask];
        match slot {
            Slot::Vacant => *slot = Slot::Occupied(Node { entry, next: None }),
            Slot::Occupied(head) => {
                let node_key = chains.insert(Node {
                    entry,
                    next: head.next,
                });
                head.next = Some(node_key);
            }
        }
    }

    /// Iterates over live entries in unspecified order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            buckets: self.buckets.iter(),
            chains: &self.chains,
            cursor: None,
        }
    }

    pub fn stats(&self) -> ChainStats {
        let mut occupied_slots = 0;
        let mut longest_chain = 0;
        for slot in &self.buckets {
            let Slot::Occupied(head) = slot else {
                continue;
            };
            occupied_slots += 1;
            let mut length = 1;
            let mut cursor = head.next;
            while let Some(node_key) = cursor {
                length += 1;
                cursor = self.chains[node_key].next;
            }
            longest_chain = longest_chain.max(length);
        }
        let capacity = self.buckets.len();
        ChainStats {
            len: self.count,
            capacity,
            occupied_slots,
            chain_nodes: self.chains.len(),
            longest_chain,
            load_factor: self.count as f64 / capacity as f64,
        }
    }

    /// Walks the whole structure and checks its bookkeeping.
    #[cfg(test)]
    pub(crate) fn assert_invariants(&self) {
        let capacity = self.buckets.len();
        assert!(capacity.is_power_of_two());
        assert_eq!(self.mask, capacity - 1);
        let mut live = 0;
        let mut linked = 0;
        for (idx, slot) in self.buckets.iter().enumerate() {
            let Slot::Occupied(head) = slot else {
                continue;
            };
            assert_eq!(head.entry.hash as usize & self.mask, idx, "head in wrong slot");
            live += 1;
            let mut cursor = head.next;
            while let Some(node_key) = cursor {
                let node = &self.chains[node_key];
                assert_eq!(node.entry.hash as usize & self.mask, idx, "node in wrong chain");
                live += 1;
                linked += 1;
                cursor = node.next;
            }
        }
        assert_eq!(live, self.count, "count out of sync");
        assert_eq!(linked, self.chains.len(), "orphaned chain nodes");
    }
}

impl<K, V, O, FK, FV> ChainHashMap<K, V, O, FK, FV>
where
    FK: Release<K>,
    FV: Release<V>,
{
    fn release(&mut self, entry: Entry<K, V>) {
        self.key_release.release(entry.key);
        self.value_release.release(entry.value);
    }
}

impl<K, V, O, FK, FV> Drop for ChainHashMap<K, V, O, FK, FV>
where
    FK: Release<K>,
    FV: Release<V>,
{
    fn drop(&mut self) {
        for slot in mem::take(&mut self.buckets) {
            let Slot::Occupied(head) = slot else {
                continue;
            };
            let mut cursor = head.next;
            self.release(head.entry);
            while let Some(node_key) = cursor {
                let Some(node) = self.chains.remove(node_key) else {
                    break;
                };
                cursor = node.next;
                self.release(node.entry);
            }
        }
        for (_, node) in self.chains.drain() {
            self.key_release.release(node.entry.key);
            self.value_release.release(node.entry.value);
        }
        self.count = 0;
    }
}

/// Iterator over `(&K, &V)` pairs of a `ChainHashMap`.
pub struct Iter<'a, K, V> {
    buckets: core::slice::Iter<'a, Slot<K, V>>,
    chains: &'a SlotMap<NodeKey, Node<K, V>>,
    cursor: Option<NodeKey>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(node_key) = self.cursor {
            if let Some(node) = self.chains.get(node_key) {
                self.cursor = node.next;
                return Some((&node.entry.key, &node.entry.value));
            }
        }
        for slot in self.buckets.by_ref() {
            if let Slot::Occupied(head) = slot {
                self.cursor = head.next;
                return Some((&head.entry.key, &head.entry.value));
            }
        }
        None
    }
}

impl<'a, K, V, O, FK, FV> IntoIterator for &'a ChainHashMap<K, V, O, FK, FV>
where
    O: KeyOps<K>,
    FK: Release<K>,
    FV: Release<V>,
{
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
