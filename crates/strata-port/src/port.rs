// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Collaborator ports consumed by the scene store.
//!
//! The store never loads robot descriptions, computes forward kinematics, or
//! intersects shapes. It asks these traits instead.

use std::collections::BTreeSet;

use crate::{Pose, SceneError, ShapeHandle};

/// Kinematic view of a robot at its current state.
///
/// # Design
///
/// Implementations answer link-frame lookups synchronously. Attach/detach
/// performs every lookup before it mutates anything, so an implementation
/// that fails part-way never leaves a half-applied reclassification.
pub trait KinematicModel: Send + Sync {
    /// Robot name; must match the semantic model bound alongside it.
    fn name(&self) -> &str;

    /// Name of the root link.
    fn root_link(&self) -> &str;

    /// Whether the model has a link called `link`.
    fn has_link(&self, link: &str) -> bool;

    /// Pose of `link` in the world frame, or `None` for unknown links.
    fn link_pose(&self, link: &str) -> Option<Pose>;

    /// Express a world-frame pose relative to `link`.
    fn pose_in_link_frame(&self, world_pose: &Pose, link: &str) -> Result<Pose, SceneError> {
        let link_pose = self
            .link_pose(link)
            .ok_or_else(|| SceneError::UnknownLink(link.to_owned()))?;
        Ok(link_pose.inverse().compose(world_pose))
    }

    /// Express a link-relative pose in the world frame.
    fn pose_in_world_frame(&self, local_pose: &Pose, link: &str) -> Result<Pose, SceneError> {
        let link_pose = self
            .link_pose(link)
            .ok_or_else(|| SceneError::UnknownLink(link.to_owned()))?;
        Ok(link_pose.compose(local_pose))
    }
}

/// A link pair whose contacts are never reported.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DisabledCollision {
    /// First link.
    pub link1: String,
    /// Second link.
    pub link2: String,
    /// Free-form reason (e.g. "Adjacent").
    pub reason: String,
}

/// Semantic robot description bound next to the kinematic model.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SemanticModel {
    /// Robot name; must equal [`KinematicModel::name`].
    pub name: String,
    /// Link pairs excluded from collision reporting.
    pub disabled_collisions: Vec<DisabledCollision>,
}

/// Unordered set of body-name pairs that may touch.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AllowedCollisions {
    pairs: BTreeSet<(String, String)>,
}

impl AllowedCollisions {
    /// Empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allow contacts between `a` and `b` (order-insensitive).
    pub fn allow(&mut self, a: &str, b: &str) {
        self.pairs.insert(Self::key(a, b));
    }

    /// Whether contacts between `a` and `b` are allowed.
    pub fn is_allowed(&self, a: &str, b: &str) -> bool {
        self.pairs.contains(&Self::key(a, b))
    }

    /// Number of allowed pairs.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Whether no pair is allowed.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    fn key(a: &str, b: &str) -> (String, String) {
        if a <= b {
            (a.to_owned(), b.to_owned())
        } else {
            (b.to_owned(), a.to_owned())
        }
    }
}

impl From<&SemanticModel> for AllowedCollisions {
    fn from(model: &SemanticModel) -> Self {
        let mut allowed = Self::new();
        for pair in &model.disabled_collisions {
            allowed.allow(&pair.link1, &pair.link2);
        }
        allowed
    }
}

/// Whether a body is free-standing or carried by a link.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BodyKind {
    /// Fixed in the world.
    World,
    /// Attached to `link`.
    Attached {
        /// Owning link.
        link: String,
    },
}

/// One resolved body handed to the geometric evaluator, posed in the world frame.
#[derive(Clone, Debug, PartialEq)]
pub struct CollisionBody {
    /// Object identifier.
    pub id: String,
    /// Geometry.
    pub shape: ShapeHandle,
    /// World-frame pose.
    pub pose: Pose,
    /// World or attached.
    pub kind: BodyKind,
}

/// Fully resolved input for one collision query.
#[derive(Clone, Copy, Debug)]
pub struct CollisionScene<'a> {
    /// Robot the scene is bound to.
    pub robot: &'a dyn KinematicModel,
    /// Free-standing objects.
    pub world: &'a [CollisionBody],
    /// Objects carried by robot links.
    pub attached: &'a [CollisionBody],
    /// Pairs whose contacts must not be reported.
    pub allowed: &'a AllowedCollisions,
}

impl core::fmt::Debug for dyn KinematicModel + '_ {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("KinematicModel")
            .field("name", &self.name())
            .field("root_link", &self.root_link())
            .finish()
    }
}

/// Collision query parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CollisionRequest {
    /// Collect contact pairs (otherwise stop at the first collision).
    pub contacts: bool,
    /// Upper bound on reported contacts when `contacts` is set.
    pub max_contacts: usize,
}

impl Default for CollisionRequest {
    fn default() -> Self {
        Self {
            contacts: false,
            max_contacts: 1,
        }
    }
}

/// A single reported contact between two named bodies.
#[derive(Clone, Debug, PartialEq)]
pub struct Contact {
    /// First body (object id or link name).
    pub body1: String,
    /// Second body (object id or link name).
    pub body2: String,
    /// Penetration depth estimate in metres (non-negative).
    pub depth: f64,
}

/// Collision query outcome.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CollisionResult {
    /// Whether any non-allowed pair is in collision.
    pub collision: bool,
    /// Contacts, if requested.
    pub contacts: Vec<Contact>,
}

/// Geometric evaluation port.
///
/// The scene store resolves state and shapes the request; implementations do
/// the shape-pair math.
pub trait CollisionEvaluator {
    /// Evaluate `scene` under `request`.
    fn evaluate(&self, scene: &CollisionScene<'_>, request: &CollisionRequest) -> CollisionResult;
}
