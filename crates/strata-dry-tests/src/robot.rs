// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Fixed-pose kinematic model for tests.

use std::collections::BTreeMap;
use std::sync::Arc;

use strata_port::{DisabledCollision, KinematicModel, Pose, Quat, SemanticModel, Vec3};

/// Name of the robot built by [`fixture_robot`].
pub const FIXTURE_ROBOT: &str = "pr2";
/// Right wrist link of the fixture robot.
pub const WRIST_LINK: &str = "r_wrist_roll_link";
/// Gripper palm link of the fixture robot (adjacent to the wrist).
pub const GRIPPER_LINK: &str = "r_gripper_palm_link";

/// Kinematic model whose link poses are fixed at construction.
///
/// # Example
///
/// ```
/// use strata_dry_tests::MockKinematics;
/// use strata_port::{KinematicModel, Pose, Vec3};
///
/// let robot = MockKinematics::new("arm", "base")
///     .with_link("tool", Pose::from_translation(Vec3::new(0.0, 0.0, 1.0)));
/// assert!(robot.has_link("base"));
/// assert!(robot.link_pose("elbow").is_none());
/// ```
#[derive(Debug, Clone)]
pub struct MockKinematics {
    name: String,
    root: String,
    links: BTreeMap<String, Pose>,
}

impl MockKinematics {
    /// A robot with only its root link, placed at the world origin.
    pub fn new(name: impl Into<String>, root: impl Into<String>) -> Self {
        let root = root.into();
        let mut links = BTreeMap::new();
        links.insert(root.clone(), Pose::identity());
        Self {
            name: name.into(),
            root,
            links,
        }
    }

    /// Adds (or moves) a link at a fixed world pose.
    pub fn with_link(mut self, link: impl Into<String>, pose: Pose) -> Self {
        self.links.insert(link.into(), pose);
        self
    }

    /// A model whose root link is missing; `configure` must reject it.
    pub fn without_root(name: impl Into<String>, root: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            root: root.into(),
            links: BTreeMap::new(),
        }
    }

    /// Link names, sorted.
    pub fn links(&self) -> impl Iterator<Item = &str> {
        self.links.keys().map(String::as_str)
    }
}

impl KinematicModel for MockKinematics {
    fn name(&self) -> &str {
        &self.name
    }

    fn root_link(&self) -> &str {
        &self.root
    }

    fn has_link(&self, link: &str) -> bool {
        self.links.contains_key(link)
    }

    fn link_pose(&self, link: &str) -> Option<Pose> {
        self.links.get(link).copied()
    }
}

/// A small right-arm robot plus its semantic description.
///
/// The wrist sits at `(0.6, -0.2, 0.8)` rotated a quarter turn about Z; the
/// palm is 0.1 m further along the wrist's X axis. Wrist and palm are marked
/// adjacent, as is the torso with the base.
pub fn fixture_robot() -> (Arc<MockKinematics>, Arc<SemanticModel>) {
    let wrist_rot = Quat::from_axis_angle(Vec3::new(0.0, 0.0, 1.0), core::f64::consts::FRAC_PI_2);
    let wrist = Pose::new(Vec3::new(0.6, -0.2, 0.8), wrist_rot);
    let palm = wrist.compose(&Pose::from_translation(Vec3::new(0.1, 0.0, 0.0)));
    let kinematics = MockKinematics::new(FIXTURE_ROBOT, "base_link")
        .with_link(
            "torso_lift_link",
            Pose::from_translation(Vec3::new(0.0, 0.0, 0.5)),
        )
        .with_link(WRIST_LINK, wrist)
        .with_link(GRIPPER_LINK, palm);
    let semantic = SemanticModel {
        name: FIXTURE_ROBOT.into(),
        disabled_collisions: vec![
            DisabledCollision {
                link1: "base_link".into(),
                link2: "torso_lift_link".into(),
                reason: "Adjacent".into(),
            },
            DisabledCollision {
                link1: WRIST_LINK.into(),
                link2: GRIPPER_LINK.into(),
                reason: "Adjacent".into(),
            },
        ],
    };
    (Arc::new(kinematics), Arc::new(semantic))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn fixture_palm_is_offset_along_wrist_x() {
        let (robot, semantic) = fixture_robot();
        assert_eq!(semantic.name, robot.name());
        let palm = robot.link_pose(GRIPPER_LINK).unwrap_or_default();
        let [x, y, z] = palm.translation.to_array();
        assert!((x - 0.6).abs() < 1e-9);
        assert!((y - (-0.1)).abs() < 1e-9);
        assert!((z - 0.8).abs() < 1e-9);
    }

    #[test]
    fn link_frame_round_trip() {
        let (robot, _) = fixture_robot();
        let world = Pose::from_translation(Vec3::new(0.6, -0.2, 1.0));
        let local = robot.pose_in_link_frame(&world, WRIST_LINK).unwrap();
        let back = robot.pose_in_world_frame(&local, WRIST_LINK).unwrap();
        let d = back.translation.sub(&world.translation).length();
        assert!(d < 1e-9);
        assert!(robot.pose_in_link_frame(&world, "nope").is_err());
    }
}
