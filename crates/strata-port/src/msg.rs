// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Scene message types.
//!
//! These are pure domain objects with no serialization logic.
//! CBOR encoding is handled by strata-codec.

use crate::{Pose, Shape};

/// Maximum number of world plus attached entries allowed in a single [`SceneMsg`].
///
/// Decoders enforce this cap so a malformed or hostile message cannot trigger
/// unbounded allocation.
pub const MAX_OBJECTS: usize = 10_000;

/// What a message entry does to its identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ObjectOperation {
    /// Insert or replace the object.
    Add = 0,
    /// Remove the object (a tombstone in diff messages).
    Remove = 1,
}

/// A single collision object entry.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CollisionObjectMsg {
    /// Object identifier.
    pub id: String,
    /// Add or remove.
    pub operation: ObjectOperation,
    /// Geometry; required for `Add` in world entries, absent for `Remove`.
    pub shape: Option<Shape>,
    /// Pose of the shape. World frame for world entries, link frame for
    /// attached entries.
    pub pose: Pose,
}

impl CollisionObjectMsg {
    /// An `Add` entry.
    pub fn add(id: impl Into<String>, shape: Shape, pose: Pose) -> Self {
        Self {
            id: id.into(),
            operation: ObjectOperation::Add,
            shape: Some(shape),
            pose,
        }
    }

    /// A `Remove` entry (tombstone).
    pub fn remove(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            operation: ObjectOperation::Remove,
            shape: None,
            pose: Pose::identity(),
        }
    }
}

/// An object attached to (moving with) a robot link.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttachedObjectMsg {
    /// Owning link.
    pub link_name: String,
    /// The object; its pose is relative to `link_name`.
    pub object: CollisionObjectMsg,
    /// Robot links the object may touch without reporting a collision.
    pub touch_links: Vec<String>,
}

impl AttachedObjectMsg {
    /// Convenience constructor with no extra touch links.
    pub fn new(link_name: impl Into<String>, object: CollisionObjectMsg) -> Self {
        Self {
            link_name: link_name.into(),
            object,
            touch_links: Vec::new(),
        }
    }
}

/// Serialized scene layer: either the full effective state or a diff against
/// the layer's parent chain.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SceneMsg {
    /// Robot the scene is bound to; empty when unconfigured or unspecified.
    pub robot_name: String,
    /// `true` for a sparse diff, `false` for a complete replacement.
    pub is_diff: bool,
    /// Collision world entries.
    pub world: Vec<CollisionObjectMsg>,
    /// Attached object entries.
    pub attached_objects: Vec<AttachedObjectMsg>,
}

impl SceneMsg {
    /// Total number of entries (world + attached), tombstones included.
    pub fn len(&self) -> usize {
        self.world.len() + self.attached_objects.len()
    }

    /// Same as [`is_empty`].
    pub fn is_empty(&self) -> bool {
        is_empty(self)
    }
}

/// `true` iff the message encodes no world objects, no attached objects, and
/// no tombstones, regardless of whether it is a diff or a full message.
pub fn is_empty(msg: &SceneMsg) -> bool {
    msg.world.is_empty() && msg.attached_objects.is_empty()
}
