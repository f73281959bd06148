// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Collision world: free-standing objects keyed by id.
use strata_port::{ObjectId, Pose, SceneError, ShapeHandle};

use crate::ordered::OrderedMap;

/// A free-standing object: one shape placed in the world frame.
#[derive(Debug, Clone, PartialEq)]
pub struct CollisionObject {
    /// Geometry (shared).
    pub shape: ShapeHandle,
    /// World-frame pose.
    pub pose: Pose,
}

impl CollisionObject {
    /// Builds an object after validating shape dimensions and pose.
    pub fn new(shape: impl Into<ShapeHandle>, pose: Pose) -> Result<Self, SceneError> {
        let shape = shape.into();
        shape.validate()?;
        if !pose.is_valid() {
            return Err(SceneError::InvalidArgument(format!(
                "pose is not a finite rigid transform: {pose:?}"
            )));
        }
        Ok(Self { shape, pose })
    }
}

/// Insertion-ordered mapping `object id -> (shape, pose)`.
///
/// Identifiers are unique; [`CollisionWorld::add`] overwrites. Enumeration
/// order is stable but callers must not depend on it. Equality ignores order.
#[derive(Debug, Clone, Default)]
pub struct CollisionWorld {
    objects: OrderedMap<CollisionObject>,
}

impl CollisionWorld {
    /// Empty world.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces `id`.
    pub fn add(&mut self, id: ObjectId, object: CollisionObject) {
        self.objects.insert(id, object);
    }

    /// Removes `id` if present; returns whether it was present.
    pub fn remove(&mut self, id: &str) -> bool {
        self.objects.remove(id).is_some()
    }

    /// Whether `id` is present.
    pub fn has(&self, id: &str) -> bool {
        self.objects.contains(id)
    }

    /// Looks up `id`.
    pub fn get(&self, id: &str) -> Option<&CollisionObject> {
        self.objects.get(id)
    }

    /// All identifiers.
    pub fn ids(&self) -> Vec<ObjectId> {
        self.objects.keys().cloned().collect()
    }

    /// Iterate over `(id, object)`.
    pub fn iter(&self) -> impl Iterator<Item = (&ObjectId, &CollisionObject)> {
        self.objects.iter()
    }

    /// Number of objects.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether the world holds no objects.
    pub fn is_empty(&self) -> bool {
        self.objects.len() == 0
    }
}

impl PartialEq for CollisionWorld {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(id, obj)| other.get(id.as_str()) == Some(obj))
    }
}
