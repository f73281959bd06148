// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Shared test doubles and fixtures for Strata crates.
//!
//! # Modules
//!
//! - [`config`] - In-memory config store with fault injection
//! - [`robot`] - Fixed-pose kinematic model and a small two-arm robot fixture
//! - [`evaluator`] - Bounding-sphere collision evaluator
//! - [`messages`] - `SceneMsg` builder
#![forbid(unsafe_code)]

pub mod config;
pub mod evaluator;
pub mod messages;
pub mod robot;

pub use config::{Fault, InMemoryConfigStore};
pub use evaluator::SphereEvaluator;
pub use messages::SceneMsgBuilder;
pub use robot::{fixture_robot, MockKinematics, FIXTURE_ROBOT, GRIPPER_LINK, WRIST_LINK};
