// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! World-state contract for Strata.
//!
//! Identifiers, shapes, poses, and scene messages shared by the layered store
//! and the wire codec, plus the traits through which a scene consults robot
//! kinematics and collision geometry. Encoding is left to strata-codec.
//!
//! A [`SceneMsg`] states what exists and what was removed. Link transforms and
//! shape intersections are answered by [`KinematicModel`] and
//! [`CollisionEvaluator`] implementations, and geometry is carried as a
//! [`ShapeHandle`] so layers share it instead of copying.
//!
//! # Crate Features
//!
//! - `serde`: derives `Serialize`/`Deserialize` on messages, shapes, and poses.

use thiserror::Error;

/// Error taxonomy for scene operations.
///
/// Every mutation that returns one of these leaves the target layer unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SceneError {
    /// A malformed identifier, shape, pose, or message.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// The operation needs a bound robot model and the layer has none.
    #[error("scene is not configured with a robot model")]
    NotConfigured,
    /// Attach/detach referenced an identifier the layer cannot resolve.
    #[error("object not found: {0}")]
    ObjectNotFound(String),
    /// The kinematic model does not know the named link.
    #[error("unknown link: {0}")]
    UnknownLink(String),
    /// The layer handle is stale or was never issued by this store.
    #[error("unknown scene layer")]
    UnknownLayer,
    /// A message was produced for a different robot than the one bound here.
    #[error("robot mismatch: scene is bound to {expected:?}, message names {found:?}")]
    RobotMismatch {
        /// Robot name of the target layer.
        expected: String,
        /// Robot name carried by the message.
        found: String,
    },
}

mod math;
mod msg;
mod port;
mod shape;
mod types;

pub use math::{Pose, Quat, Vec3, EPSILON};
pub use msg::{
    is_empty, AttachedObjectMsg, CollisionObjectMsg, ObjectOperation, SceneMsg, MAX_OBJECTS,
};
pub use port::{
    AllowedCollisions, BodyKind, CollisionBody, CollisionEvaluator, CollisionRequest,
    CollisionResult, CollisionScene, Contact, DisabledCollision, KinematicModel, SemanticModel,
};
pub use shape::{Shape, ShapeHandle};
pub use types::ObjectId;
