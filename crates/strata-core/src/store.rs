// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Layer arena: creation, branching, flattening, lifetime.
//!
//! Layers live in slots addressed by generational [`LayerId`]s. A child stores
//! its parent's id and counts as one holder of the parent, so a parent outlives
//! every reachable child. Effective state is never materialized; it is folded
//! from the ancestor chain on demand.

use std::sync::Arc;

use strata_port::{
    AllowedCollisions, KinematicModel, ObjectId, Pose, SceneError, SemanticModel,
};
use tracing::{debug, warn};

use crate::attached::{AttachedObject, AttachedObjectStore};
use crate::ident::LayerId;
use crate::layer::{Layer, RobotBinding};
use crate::overlay::{Overlay, Override};
use crate::world::{CollisionObject, CollisionWorld};

/// Tunables for a [`SceneStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreOptions {
    /// Emit a warning when a `diff` produces a chain deeper than this.
    pub chain_depth_warning: usize,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            chain_depth_warning: 64,
        }
    }
}

/// Outcome of [`SceneStore::decouple_parent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decouple {
    /// The layer had a parent; its state is now self-contained.
    Flattened,
    /// The layer was already a root; nothing changed.
    AlreadyRoot,
}

#[derive(Debug, Default)]
struct Slot {
    generation: u32,
    layer: Option<Layer>,
}

/// Owner of every scene layer.
///
/// All operations take a [`LayerId`]; a stale or foreign id yields
/// [`SceneError::UnknownLayer`]. Mutations validate fully before touching a
/// layer, so an error never leaves a partial change behind.
#[derive(Debug, Default)]
pub struct SceneStore {
    slots: Vec<Slot>,
    free: Vec<usize>,
    options: StoreOptions,
}

/// One pending change to a layer's overlays.
///
/// Mutating operations compute a list of these against an immutable view of
/// the chain, then [`SceneStore::commit`] applies them infallibly.
#[derive(Debug)]
pub(crate) enum Edit {
    PutWorld(ObjectId, CollisionObject),
    /// Hide a world id; `inherited` selects tombstone vs. plain local drop.
    DropWorld { id: ObjectId, inherited: bool },
    PutAttached(ObjectId, AttachedObject),
    DropAttached { id: ObjectId, inherited: bool },
    ClearLocal,
}

impl SceneStore {
    /// Empty store with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty store with explicit options.
    pub fn with_options(options: StoreOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    /// Active options.
    pub fn options(&self) -> StoreOptions {
        self.options
    }

    /// Number of live layers.
    pub fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    /// Whether the store holds no live layers.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether `id` names a live layer.
    pub fn contains(&self, id: LayerId) -> bool {
        self.layer(id).is_ok()
    }

    /// Creates an unconfigured root layer held once by the caller.
    pub fn create_root(&mut self) -> LayerId {
        let id = self.alloc(Layer::new(None, None));
        debug!(layer = %id, "created root layer");
        id
    }

    /// Binds a robot model to a root layer.
    ///
    /// The semantic model must describe the same robot as the kinematic model,
    /// and the kinematic model must know its own root link. Disabled pairs that
    /// reference unknown links are skipped with a warning. On error the layer
    /// keeps its previous binding.
    pub fn configure(
        &mut self,
        id: LayerId,
        kinematics: Arc<dyn KinematicModel>,
        semantic: Arc<SemanticModel>,
    ) -> Result<(), SceneError> {
        let layer = self.layer(id)?;
        if layer.parent.is_some() {
            return Err(SceneError::InvalidArgument(
                "only root layers can be configured; derived layers share their root's robot"
                    .into(),
            ));
        }
        let name = kinematics.name();
        if name.is_empty() {
            return Err(SceneError::InvalidArgument("robot model has no name".into()));
        }
        if semantic.name != name {
            return Err(SceneError::RobotMismatch {
                expected: name.to_owned(),
                found: semantic.name.clone(),
            });
        }
        let root_link = kinematics.root_link();
        if !kinematics.has_link(root_link) {
            return Err(SceneError::UnknownLink(root_link.to_owned()));
        }

        let mut allowed = AllowedCollisions::new();
        for pair in &semantic.disabled_collisions {
            if kinematics.has_link(&pair.link1) && kinematics.has_link(&pair.link2) {
                allowed.allow(&pair.link1, &pair.link2);
            } else {
                warn!(
                    robot = name,
                    link1 = %pair.link1,
                    link2 = %pair.link2,
                    "ignoring disabled collision pair with unknown link"
                );
            }
        }
        debug!(layer = %id, robot = name, allowed = allowed.len(), "configured layer");

        let binding = Arc::new(RobotBinding {
            kinematics,
            semantic,
            allowed,
        });
        self.layer_mut(id)?.robot = Some(binding);
        Ok(())
    }

    /// Derives a child layer that is observably identical to `parent` until
    /// either side is mutated.
    pub fn diff(&mut self, parent: LayerId) -> Result<LayerId, SceneError> {
        self.layer_mut(parent)?.holders += 1;
        let child = self.alloc(Layer::new(Some(parent), None));
        let depth = self.depth(child)?;
        if depth > self.options.chain_depth_warning {
            warn!(
                layer = %child,
                depth,
                threshold = self.options.chain_depth_warning,
                "layer chain is deep; consider decoupling"
            );
        }
        debug!(layer = %child, parent = %parent, depth, "derived layer");
        Ok(child)
    }

    /// Adds one external holder to `id`.
    pub fn retain(&mut self, id: LayerId) -> Result<(), SceneError> {
        self.layer_mut(id)?.holders += 1;
        Ok(())
    }

    /// Drops one holder of `id`. The last release frees the layer and
    /// releases its hold on the parent, which may cascade up the chain.
    pub fn release(&mut self, id: LayerId) -> Result<(), SceneError> {
        let mut next = Some(id);
        while let Some(current) = next {
            let layer = self.layer_mut(current)?;
            layer.holders = layer.holders.saturating_sub(1);
            if layer.holders > 0 {
                break;
            }
            next = layer.parent;
            self.free_slot(current);
            debug!(layer = %current, "freed layer");
        }
        Ok(())
    }

    /// Flattens the ancestor chain into `id`, making it a root.
    ///
    /// Local overrides win over inherited entries; tombstones disappear. The
    /// effective state is unchanged, and afterwards `diff_msg == full_msg`.
    /// The robot binding, if any, moves onto the layer.
    pub fn decouple_parent(&mut self, id: LayerId) -> Result<Decouple, SceneError> {
        let chain = self.chain(id)?;
        let Some(parent) = chain.first().and_then(|layer| layer.parent) else {
            return Ok(Decouple::AlreadyRoot);
        };
        let ancestors = chain.get(1..).unwrap_or_default();

        let mut world = Overlay::default();
        for (oid, obj) in fold_world(ancestors).iter() {
            world.set(oid.clone(), obj.clone());
        }
        let mut attached = Overlay::default();
        for (oid, obj) in fold_attached(ancestors).iter() {
            attached.set(oid.clone(), obj.clone());
        }
        let robot = ancestors.last().and_then(|root| root.robot.clone());

        let layer = self.layer_mut(id)?;
        for (oid, entry) in layer.world.iter() {
            match entry {
                Override::Present(obj) => world.set(oid.clone(), obj.clone()),
                Override::Tombstone => world.forget(oid.as_str()),
            }
        }
        for (oid, entry) in layer.attached.iter() {
            match entry {
                Override::Present(obj) => attached.set(oid.clone(), obj.clone()),
                Override::Tombstone => attached.forget(oid.as_str()),
            }
        }
        layer.world = world;
        layer.attached = attached;
        layer.parent = None;
        layer.robot = robot;
        debug!(layer = %id, parent = %parent, "decoupled layer");
        self.release(parent)?;
        Ok(Decouple::Flattened)
    }

    /// Parent of `id`, if any.
    pub fn parent(&self, id: LayerId) -> Result<Option<LayerId>, SceneError> {
        Ok(self.layer(id)?.parent)
    }

    /// Number of ancestors above `id` (0 for a root).
    pub fn depth(&self, id: LayerId) -> Result<usize, SceneError> {
        Ok(self.chain(id)?.len() - 1)
    }

    /// Robot binding visible from `id` (its root's binding).
    pub fn binding(&self, id: LayerId) -> Result<Option<&RobotBinding>, SceneError> {
        let chain = self.chain(id)?;
        Ok(chain.last().and_then(|root| root.robot.as_deref()))
    }

    /// Whether a robot model is bound to `id`'s chain.
    pub fn is_configured(&self, id: LayerId) -> Result<bool, SceneError> {
        Ok(self.binding(id)?.is_some())
    }

    /// Name of the bound robot, if any.
    pub fn robot_name(&self, id: LayerId) -> Result<Option<&str>, SceneError> {
        Ok(self.binding(id)?.map(RobotBinding::name))
    }

    /// Identifiers with a local world override on `id`, tombstones included.
    pub fn local_world_ids(&self, id: LayerId) -> Result<Vec<ObjectId>, SceneError> {
        Ok(self.layer(id)?.world.ids())
    }

    /// Identifiers with a local attached override on `id`, tombstones included.
    pub fn local_attached_ids(&self, id: LayerId) -> Result<Vec<ObjectId>, SceneError> {
        Ok(self.layer(id)?.attached.ids())
    }

    /// Drops every local override on `id`; it inherits its parent verbatim again.
    pub fn clear_local(&mut self, id: LayerId) -> Result<(), SceneError> {
        self.commit(id, vec![Edit::ClearLocal])
    }

    /// Materializes the effective collision world of `id`.
    pub fn effective_world(&self, id: LayerId) -> Result<CollisionWorld, SceneError> {
        Ok(fold_world(&self.chain(id)?))
    }

    /// Materializes the effective attached-object store of `id`.
    pub fn effective_attached(&self, id: LayerId) -> Result<AttachedObjectStore, SceneError> {
        Ok(fold_attached(&self.chain(id)?))
    }

    /// Inserts or replaces a free-standing object on `layer`.
    ///
    /// An attached object with the same id stops being attached, the same way
    /// a diff message putting that id into the world behaves.
    pub fn add_world_object(
        &mut self,
        layer: LayerId,
        id: ObjectId,
        object: CollisionObject,
    ) -> Result<(), SceneError> {
        let chain = self.chain(layer)?;
        let mut edits = Vec::with_capacity(2);
        if lookup(chain.iter().copied().map(|l| &l.attached), id.as_str()).is_some() {
            edits.push(Edit::DropAttached {
                id: id.clone(),
                inherited: inherited_attached(&chain, id.as_str()),
            });
        }
        edits.push(Edit::PutWorld(id, object));
        self.commit(layer, edits)
    }

    /// Convenience for [`Self::add_world_object`] taking raw parts.
    pub fn add_shape(
        &mut self,
        layer: LayerId,
        id: &str,
        shape: impl Into<strata_port::ShapeHandle>,
        pose: Pose,
    ) -> Result<(), SceneError> {
        let id = ObjectId::new(id)?;
        let object = CollisionObject::new(shape, pose)?;
        self.add_world_object(layer, id, object)
    }

    /// Removes a free-standing object from `layer`'s view.
    ///
    /// Returns whether the object was visible. Inherited objects are
    /// tombstoned; local-only ones are dropped. Absent ids are a no-op.
    pub fn remove_world_object(&mut self, layer: LayerId, id: &str) -> Result<bool, SceneError> {
        let id = ObjectId::new(id)?;
        let chain = self.chain(layer)?;
        let visible = lookup(chain.iter().copied().map(|l| &l.world), id.as_str()).is_some();
        let local = chain
            .first()
            .is_some_and(|l| l.world.get(id.as_str()).is_some());
        if !visible && !local {
            return Ok(false);
        }
        let inherited = inherited_world(&chain, id.as_str());
        self.commit(layer, vec![Edit::DropWorld { id, inherited }])?;
        Ok(visible)
    }

    pub(crate) fn layer(&self, id: LayerId) -> Result<&Layer, SceneError> {
        self.slots
            .get(id.index)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.layer.as_ref())
            .ok_or(SceneError::UnknownLayer)
    }

    fn layer_mut(&mut self, id: LayerId) -> Result<&mut Layer, SceneError> {
        self.slots
            .get_mut(id.index)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.layer.as_mut())
            .ok_or(SceneError::UnknownLayer)
    }

    /// `id` followed by its ancestors, leaf first.
    pub(crate) fn chain(&self, id: LayerId) -> Result<Vec<&Layer>, SceneError> {
        let mut chain = Vec::new();
        let mut next = Some(id);
        while let Some(current) = next {
            let layer = self.layer(current)?;
            next = layer.parent;
            chain.push(layer);
        }
        Ok(chain)
    }

    /// Applies precomputed edits. Only the id lookup can fail, and it runs first.
    pub(crate) fn commit(&mut self, id: LayerId, edits: Vec<Edit>) -> Result<(), SceneError> {
        let layer = self.layer_mut(id)?;
        for edit in edits {
            match edit {
                Edit::PutWorld(oid, obj) => layer.world.set(oid, obj),
                Edit::DropWorld { id: oid, inherited } => {
                    if inherited {
                        layer.world.tombstone(oid);
                    } else {
                        layer.world.forget(oid.as_str());
                    }
                }
                Edit::PutAttached(oid, obj) => layer.attached.set(oid, obj),
                Edit::DropAttached { id: oid, inherited } => {
                    if inherited {
                        layer.attached.tombstone(oid);
                    } else {
                        layer.attached.forget(oid.as_str());
                    }
                }
                Edit::ClearLocal => {
                    layer.world.clear();
                    layer.attached.clear();
                }
            }
        }
        Ok(())
    }

    fn alloc(&mut self, layer: Layer) -> LayerId {
        if let Some(index) = self.free.pop() {
            if let Some(slot) = self.slots.get_mut(index) {
                slot.layer = Some(layer);
                return LayerId {
                    index,
                    generation: slot.generation,
                };
            }
        }
        let index = self.slots.len();
        self.slots.push(Slot {
            generation: 0,
            layer: Some(layer),
        });
        LayerId {
            index,
            generation: 0,
        }
    }

    fn free_slot(&mut self, id: LayerId) {
        if let Some(slot) = self.slots.get_mut(id.index) {
            slot.layer = None;
            slot.generation = slot.generation.wrapping_add(1);
            self.free.push(id.index);
        }
    }
}

/// First opinion along `overlays` (leaf first) about `id`.
pub(crate) fn lookup<'a, T: 'a>(
    overlays: impl IntoIterator<Item = &'a Overlay<T>>,
    id: &str,
) -> Option<&'a T> {
    for overlay in overlays {
        match overlay.get(id) {
            Some(Override::Present(value)) => return Some(value),
            Some(Override::Tombstone) => return None,
            None => {}
        }
    }
    None
}

/// Whether some ancestor of `chain[0]` resolves world id `id`.
pub(crate) fn inherited_world(chain: &[&Layer], id: &str) -> bool {
    let ancestors = chain.get(1..).unwrap_or_default();
    lookup(ancestors.iter().copied().map(|l| &l.world), id).is_some()
}

/// Whether some ancestor of `chain[0]` resolves attached id `id`.
pub(crate) fn inherited_attached(chain: &[&Layer], id: &str) -> bool {
    let ancestors = chain.get(1..).unwrap_or_default();
    lookup(ancestors.iter().copied().map(|l| &l.attached), id).is_some()
}

/// Effective world of a leaf-first chain.
pub(crate) fn fold_world(chain: &[&Layer]) -> CollisionWorld {
    let mut world = CollisionWorld::new();
    for layer in chain.iter().rev() {
        for (oid, entry) in layer.world.iter() {
            match entry {
                Override::Present(obj) => world.add(oid.clone(), obj.clone()),
                Override::Tombstone => {
                    world.remove(oid.as_str());
                }
            }
        }
    }
    world
}

/// Effective attached store of a leaf-first chain.
pub(crate) fn fold_attached(chain: &[&Layer]) -> AttachedObjectStore {
    let mut attached = AttachedObjectStore::new();
    for layer in chain.iter().rev() {
        for (oid, entry) in layer.attached.iter() {
            match entry {
                Override::Present(obj) => attached.add(oid.clone(), obj.clone()),
                Override::Tombstone => {
                    attached.remove(oid.as_str());
                }
            }
        }
    }
    attached
}
