// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! `SceneMsg` builder for tests.

use strata_port::{AttachedObjectMsg, CollisionObjectMsg, Pose, SceneMsg, Shape, Vec3};

/// Builder for [`SceneMsg`] values.
///
/// # Example
///
/// ```
/// use strata_dry_tests::SceneMsgBuilder;
///
/// let msg = SceneMsgBuilder::diff()
///     .sphere("s1", 0.4, [0.0, 0.0, 0.0])
///     .remove("old")
///     .build();
/// assert!(msg.is_diff);
/// assert_eq!(msg.world.len(), 2);
/// ```
#[derive(Default)]
pub struct SceneMsgBuilder {
    msg: SceneMsg,
}

impl SceneMsgBuilder {
    /// Start a full message.
    pub fn full() -> Self {
        Self::default()
    }

    /// Start a diff message.
    pub fn diff() -> Self {
        let mut builder = Self::default();
        builder.msg.is_diff = true;
        builder
    }

    /// Set the robot name.
    pub fn robot(mut self, name: &str) -> Self {
        self.msg.robot_name = name.to_owned();
        self
    }

    /// Add a world object with an arbitrary shape and pose.
    pub fn object(mut self, id: &str, shape: Shape, pose: Pose) -> Self {
        self.msg.world.push(CollisionObjectMsg::add(id, shape, pose));
        self
    }

    /// Add a world sphere at a translation.
    pub fn sphere(self, id: &str, radius: f64, at: [f64; 3]) -> Self {
        self.object(id, Shape::sphere(radius), Pose::from_translation(Vec3::from(at)))
    }

    /// Add a world tombstone.
    pub fn remove(mut self, id: &str) -> Self {
        self.msg.world.push(CollisionObjectMsg::remove(id));
        self
    }

    /// Add an attached sphere, pose relative to `link`.
    pub fn attached_sphere(mut self, link: &str, id: &str, radius: f64) -> Self {
        self.msg.attached_objects.push(AttachedObjectMsg::new(
            link,
            CollisionObjectMsg::add(id, Shape::sphere(radius), Pose::identity()),
        ));
        self
    }

    /// Add an attached tombstone.
    pub fn detach(mut self, id: &str) -> Self {
        self.msg.attached_objects.push(AttachedObjectMsg::new(
            String::new(),
            CollisionObjectMsg::remove(id),
        ));
        self
    }

    /// Build the message.
    pub fn build(self) -> SceneMsg {
        self.msg
    }
}
