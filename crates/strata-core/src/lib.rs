// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! strata-core: layered copy-on-write world state for motion planning.
//!
//! A [`SceneStore`] owns scene layers. Each layer records only its local
//! overrides (additions, replacements, tombstones) on top of an optional
//! parent, so planners can branch a baseline cheaply with
//! [`SceneStore::diff`], explore, serialize the minimal delta with
//! [`SceneStore::diff_msg`], and flatten with [`SceneStore::decouple_parent`]
//! when a branch should stand alone.
//!
//! Collision geometry and robot kinematics stay outside this crate; they are
//! reached through the `strata-port` traits.
#![forbid(unsafe_code)]

mod attach;
mod attached;
mod dispatch;
mod ident;
mod layer;
mod ordered;
mod overlay;
mod patch;
mod store;
mod view;
mod world;

pub use attached::{AttachedObject, AttachedObjectStore};
pub use ident::LayerId;
pub use layer::RobotBinding;
pub use store::{Decouple, SceneStore, StoreOptions};
pub use view::{AttachedView, WorldView};
pub use world::{CollisionObject, CollisionWorld};
