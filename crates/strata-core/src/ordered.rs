// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Insertion-ordered map keyed by [`ObjectId`].
//!
//! Replacing an existing key keeps its original position; removing and
//! re-inserting moves it to the end.

use std::collections::BTreeMap;

use rustc_hash::FxHashMap;
use strata_port::ObjectId;

#[derive(Debug, Clone)]
pub(crate) struct OrderedMap<V> {
    entries: FxHashMap<ObjectId, (u64, V)>,
    order: BTreeMap<u64, ObjectId>,
    next_seq: u64,
}

impl<V> Default for OrderedMap<V> {
    fn default() -> Self {
        Self {
            entries: FxHashMap::default(),
            order: BTreeMap::new(),
            next_seq: 0,
        }
    }
}

impl<V> OrderedMap<V> {
    pub(crate) fn insert(&mut self, id: ObjectId, value: V) {
        if let Some(slot) = self.entries.get_mut(id.as_str()) {
            slot.1 = value;
            return;
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        self.order.insert(seq, id.clone());
        self.entries.insert(id, (seq, value));
    }

    pub(crate) fn remove(&mut self, id: &str) -> Option<V> {
        let (seq, value) = self.entries.remove(id)?;
        self.order.remove(&seq);
        Some(value)
    }

    pub(crate) fn get(&self, id: &str) -> Option<&V> {
        self.entries.get(id).map(|(_, v)| v)
    }

    pub(crate) fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (&ObjectId, &V)> {
        self.order.values().filter_map(move |id| {
            self.entries
                .get_key_value(id.as_str())
                .map(|(key, (_, value))| (key, value))
        })
    }

    pub(crate) fn keys(&self) -> impl Iterator<Item = &ObjectId> {
        self.order.values()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    fn id(s: &str) -> ObjectId {
        ObjectId::new(s).unwrap()
    }

    #[test]
    fn replacement_keeps_position() {
        let mut map = OrderedMap::default();
        map.insert(id("a"), 1);
        map.insert(id("b"), 2);
        map.insert(id("a"), 3);
        let items: Vec<_> = map.iter().map(|(k, v)| (k.as_str().to_owned(), *v)).collect();
        assert_eq!(items, vec![("a".into(), 3), ("b".into(), 2)]);
    }

    #[test]
    fn reinsert_after_remove_moves_to_end() {
        let mut map = OrderedMap::default();
        map.insert(id("a"), 1);
        map.insert(id("b"), 2);
        assert_eq!(map.remove("a"), Some(1));
        assert_eq!(map.remove("a"), None);
        map.insert(id("a"), 4);
        let keys: Vec<_> = map.keys().map(ObjectId::as_str).collect();
        assert_eq!(keys, vec!["b", "a"]);
        assert_eq!(map.len(), 2);
    }
}
