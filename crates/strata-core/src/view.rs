// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Read-only views over a layer's effective state.
//!
//! Views borrow the ancestor chain and resolve lookups on demand, so a point
//! query costs one lookup per layer rather than a full fold.

use strata_port::{ObjectId, SceneError};

use crate::attached::{AttachedObject, AttachedObjectStore};
use crate::ident::LayerId;
use crate::layer::Layer;
use crate::store::{fold_attached, fold_world, lookup, SceneStore};
use crate::world::{CollisionObject, CollisionWorld};

/// Effective collision world of one layer.
#[derive(Debug)]
pub struct WorldView<'a> {
    chain: Vec<&'a Layer>,
}

impl<'a> WorldView<'a> {
    /// Whether `id` is visible as a free-standing object.
    pub fn has(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Resolves `id` through the chain.
    pub fn get(&self, id: &str) -> Option<&'a CollisionObject> {
        lookup(self.chain.iter().copied().map(|l| &l.world), id)
    }

    /// Visible identifiers. Order is unspecified.
    pub fn ids(&self) -> Vec<ObjectId> {
        self.resolve().ids()
    }

    /// Number of visible objects.
    pub fn len(&self) -> usize {
        self.resolve().len()
    }

    /// Whether no object is visible.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Materializes the view.
    pub fn resolve(&self) -> CollisionWorld {
        fold_world(&self.chain)
    }
}

/// Effective attached-object store of one layer.
#[derive(Debug)]
pub struct AttachedView<'a> {
    chain: Vec<&'a Layer>,
}

impl<'a> AttachedView<'a> {
    /// Whether `id` is attached.
    pub fn has(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Resolves `id` through the chain.
    pub fn get(&self, id: &str) -> Option<&'a AttachedObject> {
        lookup(self.chain.iter().copied().map(|l| &l.attached), id)
    }

    /// Attached identifiers. Order is unspecified.
    pub fn ids(&self) -> Vec<ObjectId> {
        self.resolve().ids()
    }

    /// Number of attached objects.
    pub fn len(&self) -> usize {
        self.resolve().len()
    }

    /// Whether nothing is attached.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Materializes the view.
    pub fn resolve(&self) -> AttachedObjectStore {
        fold_attached(&self.chain)
    }
}

impl SceneStore {
    /// Effective collision world of `layer`.
    pub fn world(&self, layer: LayerId) -> Result<WorldView<'_>, SceneError> {
        Ok(WorldView {
            chain: self.chain(layer)?,
        })
    }

    /// Effective attached objects of `layer`.
    pub fn attached(&self, layer: LayerId) -> Result<AttachedView<'_>, SceneError> {
        Ok(AttachedView {
            chain: self.chain(layer)?,
        })
    }
}
