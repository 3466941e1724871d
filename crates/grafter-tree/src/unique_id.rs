use std::hash::Hash;

use rustc_hash::FxHashMap;

/// Dense debug identifiers for nodes, keyed by node identity.
///
/// Handles are never compared by payload, so two equal-looking nodes get
/// different ids. Ids start at 1 and are never reused until [`UniqueIds::reset`].
#[derive(Debug)]
pub struct UniqueIds<K> {
    ids: FxHashMap<K, u32>,
    next: u32,
}

impl<K> Default for UniqueIds<K> {
    fn default() -> Self {
        Self { ids: FxHashMap::default(), next: 1 }
    }
}

impl<K: Copy + Eq + Hash> UniqueIds<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the id of `key`, assigning the next one on first sight.
    pub fn get(&mut self, key: K) -> u32 {
        let next = &mut self.next;
        *self.ids.entry(key).or_insert_with(|| {
            let id = *next;
            *next += 1;
            id
        })
    }

    /// Returns the id of `key` without assigning one.
    pub fn lookup(&self, key: K) -> Option<u32> {
        self.ids.get(&key).copied()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Forgets every assignment and restarts numbering at 1.
    pub fn reset(&mut self) {
        self.ids.clear();
        self.next = 1;
    }
}
