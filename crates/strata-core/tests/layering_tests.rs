// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![allow(missing_docs)]
#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Branching, flattening, and serialization across layer chains.

mod common;

use std::sync::Arc;

use common::{configured_root, msg_world_ids, sphere, world_ids};
use strata_core::{Decouple, SceneStore};
use strata_dry_tests::{fixture_robot, MockKinematics, FIXTURE_ROBOT};
use strata_port::{is_empty, ObjectOperation, SceneError, SemanticModel};

#[test]
fn branch_then_flatten_scenario() {
    let mut store = SceneStore::new();
    let root = configured_root(&mut store);
    sphere(&mut store, root, "s1", 0.4, [0.0, 0.0, 0.0]);
    assert_eq!(world_ids(&store, root), ["s1"]);

    let child = store.diff(root).unwrap();
    sphere(&mut store, child, "s2", 0.5, [0.0, 0.0, 0.0]);
    assert_eq!(world_ids(&store, child), ["s1", "s2"]);
    assert_eq!(world_ids(&store, root), ["s1"]);

    let diff = store.diff_msg(child).unwrap();
    assert!(diff.is_diff);
    assert_eq!(msg_world_ids(&diff), ["s2"]);

    assert_eq!(store.decouple_parent(child), Ok(Decouple::Flattened));
    let diff = store.diff_msg(child).unwrap();
    assert_eq!(msg_world_ids(&diff), ["s1", "s2"]);
    assert_eq!(diff, store.full_msg(child).unwrap());
    assert_eq!(world_ids(&store, child), ["s1", "s2"]);
    assert_eq!(store.parent(child), Ok(None));
}

#[test]
fn parent_and_child_are_isolated() {
    let mut store = SceneStore::new();
    let root = configured_root(&mut store);
    sphere(&mut store, root, "shared", 0.1, [1.0, 0.0, 0.0]);
    let left = store.diff(root).unwrap();
    let right = store.diff(root).unwrap();

    sphere(&mut store, left, "left_only", 0.1, [0.0, 1.0, 0.0]);
    store.remove_world_object(right, "shared").unwrap();
    sphere(&mut store, root, "late", 0.1, [0.0, 0.0, 1.0]);

    assert_eq!(world_ids(&store, left), ["late", "left_only", "shared"]);
    assert_eq!(world_ids(&store, right), ["late"]);
    assert_eq!(world_ids(&store, root), ["late", "shared"]);
}

#[test]
fn diff_message_lists_exactly_local_overrides() {
    let mut store = SceneStore::new();
    let root = configured_root(&mut store);
    sphere(&mut store, root, "a", 0.1, [0.0, 0.0, 0.0]);
    sphere(&mut store, root, "b", 0.1, [0.0, 0.0, 0.0]);
    let child = store.diff(root).unwrap();
    assert!(is_empty(&store.diff_msg(child).unwrap()));

    sphere(&mut store, child, "b", 0.3, [0.0, 0.0, 0.0]);
    sphere(&mut store, child, "c", 0.1, [0.0, 0.0, 0.0]);
    store.remove_world_object(child, "a").unwrap();

    let msg = store.diff_msg(child).unwrap();
    assert_eq!(msg.robot_name, FIXTURE_ROBOT);
    assert_eq!(msg_world_ids(&msg), ["a", "b", "c"]);
    let removed: Vec<_> = msg
        .world
        .iter()
        .filter(|e| e.operation == ObjectOperation::Remove)
        .map(|e| e.id.as_str())
        .collect();
    assert_eq!(removed, ["a"]);
    assert_eq!(common::sorted(store.local_world_ids(child).unwrap()), ["a", "b", "c"]);
}

#[test]
fn emptiness_of_full_messages() {
    let mut store = SceneStore::new();
    let root = configured_root(&mut store);
    assert!(is_empty(&store.full_msg(root).unwrap()));
    sphere(&mut store, root, "s1", 0.4, [0.0, 0.0, 0.0]);
    assert!(!is_empty(&store.full_msg(root).unwrap()));
}

#[test]
fn decouple_keeps_effective_state_and_binding() {
    let mut store = SceneStore::new();
    let root = configured_root(&mut store);
    sphere(&mut store, root, "a", 0.1, [0.0, 0.0, 0.0]);
    sphere(&mut store, root, "b", 0.1, [0.0, 0.0, 0.0]);
    let mid = store.diff(root).unwrap();
    store.remove_world_object(mid, "a").unwrap();
    let leaf = store.diff(mid).unwrap();
    sphere(&mut store, leaf, "b", 0.2, [1.0, 0.0, 0.0]);
    sphere(&mut store, leaf, "c", 0.1, [0.0, 0.0, 0.0]);

    let before = store.effective_world(leaf).unwrap();
    assert_eq!(store.decouple_parent(leaf), Ok(Decouple::Flattened));
    assert_eq!(store.effective_world(leaf).unwrap(), before);
    assert_eq!(store.depth(leaf), Ok(0));
    assert_eq!(store.robot_name(leaf), Ok(Some(FIXTURE_ROBOT)));
    // Tombstones are gone once there is nothing left to hide.
    assert_eq!(common::sorted(store.local_world_ids(leaf).unwrap()), ["b", "c"]);

    // Ancestors are unaffected.
    assert_eq!(world_ids(&store, mid), ["b"]);
    assert_eq!(store.decouple_parent(leaf), Ok(Decouple::AlreadyRoot));
}

#[test]
fn clear_local_restores_inheritance() {
    let mut store = SceneStore::new();
    let root = configured_root(&mut store);
    sphere(&mut store, root, "a", 0.1, [0.0, 0.0, 0.0]);
    let child = store.diff(root).unwrap();
    store.remove_world_object(child, "a").unwrap();
    sphere(&mut store, child, "z", 0.1, [0.0, 0.0, 0.0]);
    store.clear_local(child).unwrap();
    assert_eq!(world_ids(&store, child), ["a"]);
    assert!(store.local_world_ids(child).unwrap().is_empty());
}

#[test]
fn configure_validates_models() {
    let mut store = SceneStore::new();
    let root = store.create_root();
    let (kinematics, _) = fixture_robot();

    let other = Arc::new(SemanticModel {
        name: "other".into(),
        ..SemanticModel::default()
    });
    assert!(matches!(
        store.configure(root, kinematics.clone(), other),
        Err(SceneError::RobotMismatch { .. })
    ));
    assert_eq!(store.is_configured(root), Ok(false));

    let rootless = Arc::new(MockKinematics::without_root("bot", "base"));
    let semantic = Arc::new(SemanticModel {
        name: "bot".into(),
        ..SemanticModel::default()
    });
    assert_eq!(
        store.configure(root, rootless, semantic),
        Err(SceneError::UnknownLink("base".into()))
    );

    let (_, semantic) = fixture_robot();
    store.configure(root, kinematics.clone(), semantic.clone()).unwrap();
    let child = store.diff(root).unwrap();
    assert_eq!(store.is_configured(child), Ok(true));
    assert!(matches!(
        store.configure(child, kinematics, semantic),
        Err(SceneError::InvalidArgument(_))
    ));
}

#[test]
fn operations_on_released_layers_fail() {
    let mut store = SceneStore::new();
    let root = configured_root(&mut store);
    let child = store.diff(root).unwrap();
    store.retain(child).unwrap();
    store.release(child).unwrap();
    assert!(store.contains(child));
    store.release(child).unwrap();
    assert_eq!(store.full_msg(child), Err(SceneError::UnknownLayer));
    assert_eq!(store.diff(child), Err(SceneError::UnknownLayer));
    assert!(store.contains(root));
}

#[test]
fn store_options_follow_loaded_settings() {
    use strata_app_core::settings::SceneSettings;
    use strata_dry_tests::InMemoryConfigStore;

    let config = InMemoryConfigStore::with_settings(&SceneSettings {
        chain_depth_warning: 2,
        ..SceneSettings::default()
    });
    let settings = SceneSettings::load(&config.service()).unwrap();
    let mut store = SceneStore::with_options(settings.store_options());
    assert_eq!(store.options().chain_depth_warning, 2);

    // Past the threshold only logs; derivation keeps working.
    let mut layer = configured_root(&mut store);
    for _ in 0..4 {
        layer = store.diff(layer).unwrap();
    }
    assert_eq!(store.depth(layer), Ok(4));
}
