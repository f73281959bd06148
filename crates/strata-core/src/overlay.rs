// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Per-layer override sets.
//!
//! Every identifier a layer mentions is in one of three states: present here,
//! tombstoned here, or absent from the overlay (inherit from the parent).
use strata_port::ObjectId;

use crate::ordered::OrderedMap;

/// What one layer says about one identifier.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Override<T> {
    /// Added or replaced at this layer.
    Present(T),
    /// Removed at this layer; ancestors may still hold it.
    Tombstone,
}

/// Ordered set of local overrides for one kind of object.
#[derive(Debug, Clone)]
pub(crate) struct Overlay<T> {
    entries: OrderedMap<Override<T>>,
}

impl<T> Default for Overlay<T> {
    fn default() -> Self {
        Self {
            entries: OrderedMap::default(),
        }
    }
}

impl<T> Overlay<T> {
    pub(crate) fn set(&mut self, id: ObjectId, value: T) {
        self.entries.insert(id, Override::Present(value));
    }

    pub(crate) fn tombstone(&mut self, id: ObjectId) {
        self.entries.insert(id, Override::Tombstone);
    }

    /// Drops any local opinion about `id` so it inherits again.
    pub(crate) fn forget(&mut self, id: &str) {
        self.entries.remove(id);
    }

    pub(crate) fn get(&self, id: &str) -> Option<&Override<T>> {
        self.entries.get(id)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (&ObjectId, &Override<T>)> {
        self.entries.iter()
    }

    pub(crate) fn ids(&self) -> Vec<ObjectId> {
        self.entries.keys().cloned().collect()
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }
}
