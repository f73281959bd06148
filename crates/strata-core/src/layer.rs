// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! One scene snapshot: parent link, local overrides, robot binding.
use std::sync::Arc;

use strata_port::{AllowedCollisions, KinematicModel, SemanticModel};

use crate::attached::AttachedObject;
use crate::ident::LayerId;
use crate::overlay::Overlay;
use crate::world::CollisionObject;

/// Robot model bound to a layer chain by `configure`.
pub struct RobotBinding {
    pub(crate) kinematics: Arc<dyn KinematicModel>,
    pub(crate) semantic: Arc<SemanticModel>,
    /// Seeded from the semantic model's disabled pairs.
    pub(crate) allowed: AllowedCollisions,
}

impl RobotBinding {
    /// Robot name.
    pub fn name(&self) -> &str {
        self.kinematics.name()
    }

    /// Kinematic collaborator.
    pub fn kinematics(&self) -> &dyn KinematicModel {
        self.kinematics.as_ref()
    }

    /// Semantic description.
    pub fn semantic(&self) -> &SemanticModel {
        &self.semantic
    }

    /// Link pairs allowed to touch.
    pub fn allowed(&self) -> &AllowedCollisions {
        &self.allowed
    }
}

impl std::fmt::Debug for RobotBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RobotBinding")
            .field("name", &self.name())
            .field("allowed_pairs", &self.allowed.len())
            .finish_non_exhaustive()
    }
}

#[derive(Debug)]
pub(crate) struct Layer {
    pub(crate) parent: Option<LayerId>,
    pub(crate) world: Overlay<CollisionObject>,
    pub(crate) attached: Overlay<AttachedObject>,
    pub(crate) robot: Option<Arc<RobotBinding>>,
    /// External handles plus one per child layer.
    pub(crate) holders: usize,
}

impl Layer {
    pub(crate) fn new(parent: Option<LayerId>, robot: Option<Arc<RobotBinding>>) -> Self {
        Self {
            parent,
            world: Overlay::default(),
            attached: Overlay::default(),
            robot,
            holders: 1,
        }
    }
}
