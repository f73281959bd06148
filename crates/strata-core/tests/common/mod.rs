// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![allow(dead_code)]

use strata_core::{LayerId, SceneStore};
use strata_port::{ObjectId, Pose, SceneMsg, Shape, Vec3};
use strata_dry_tests::fixture_robot;

/// Root layer bound to the fixture robot.
pub fn configured_root(store: &mut SceneStore) -> LayerId {
    let root = store.create_root();
    let (kinematics, semantic) = fixture_robot();
    store.configure(root, kinematics, semantic).unwrap();
    root
}

/// Adds a sphere at `at` to `layer`.
pub fn sphere(store: &mut SceneStore, layer: LayerId, id: &str, radius: f64, at: [f64; 3]) {
    store
        .add_shape(
            layer,
            id,
            Shape::sphere(radius),
            Pose::from_translation(Vec3::from(at)),
        )
        .unwrap();
}

/// Sorted visible world ids.
pub fn world_ids(store: &SceneStore, layer: LayerId) -> Vec<String> {
    sorted(store.world(layer).unwrap().ids())
}

/// Sorted attached ids.
pub fn attached_ids(store: &SceneStore, layer: LayerId) -> Vec<String> {
    sorted(store.attached(layer).unwrap().ids())
}

/// Sorted world entry ids of a message.
pub fn msg_world_ids(msg: &SceneMsg) -> Vec<String> {
    let mut ids: Vec<String> = msg.world.iter().map(|e| e.id.clone()).collect();
    ids.sort();
    ids
}

pub fn sorted(ids: Vec<ObjectId>) -> Vec<String> {
    let mut ids: Vec<String> = ids.iter().map(ToString::to_string).collect();
    ids.sort();
    ids
}
