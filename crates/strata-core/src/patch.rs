// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Scene messages: produce full/diff messages and apply them to layers.
//!
//! A diff message carries only one layer's local overrides, so its size is
//! independent of chain depth. A full message carries the effective state.
//! Applying treats the message as authoritative for every id it mentions.

use std::collections::BTreeSet;

use strata_port::{
    AttachedObjectMsg, CollisionObjectMsg, ObjectId, ObjectOperation, SceneError, SceneMsg,
};
use tracing::{debug, instrument};

use crate::attached::AttachedObject;
use crate::ident::LayerId;
use crate::layer::Layer;
use crate::overlay::Override;
use crate::store::{
    fold_attached, fold_world, inherited_attached, inherited_world, lookup, Edit, SceneStore,
};
use crate::world::CollisionObject;

fn world_entry(id: &ObjectId, obj: &CollisionObject) -> CollisionObjectMsg {
    CollisionObjectMsg::add(id.as_str(), *obj.shape, obj.pose)
}

fn attached_entry(id: &ObjectId, obj: &AttachedObject) -> AttachedObjectMsg {
    AttachedObjectMsg {
        link_name: obj.link_name.clone(),
        object: CollisionObjectMsg::add(id.as_str(), *obj.shape, obj.pose),
        touch_links: obj.touch_links.iter().cloned().collect(),
    }
}

/// Name of the robot bound to `chain`.
fn bound_robot(chain: &[&Layer]) -> Result<String, SceneError> {
    chain
        .last()
        .and_then(|root| root.robot.as_deref())
        .map(|binding| binding.name().to_owned())
        .ok_or(SceneError::NotConfigured)
}

/// A message entry after validation.
enum Entry<T> {
    Put(ObjectId, T),
    Remove(ObjectId),
}

fn check_remove(msg: &SceneMsg, id: &str) -> Result<(), SceneError> {
    if msg.is_diff {
        Ok(())
    } else {
        Err(SceneError::InvalidArgument(format!(
            "full scene message cannot remove {id:?}"
        )))
    }
}

fn parse_world(msg: &SceneMsg) -> Result<Vec<Entry<CollisionObject>>, SceneError> {
    msg.world
        .iter()
        .map(|entry| {
            let id = ObjectId::new(entry.id.as_str())?;
            match entry.operation {
                ObjectOperation::Add => {
                    let shape = entry.shape.ok_or_else(|| {
                        SceneError::InvalidArgument(format!("world object {id} has no shape"))
                    })?;
                    Ok(Entry::Put(id, CollisionObject::new(shape, entry.pose)?))
                }
                ObjectOperation::Remove => {
                    check_remove(msg, id.as_str())?;
                    Ok(Entry::Remove(id))
                }
            }
        })
        .collect()
}

fn parse_attached(msg: &SceneMsg) -> Result<Vec<Entry<AttachedObject>>, SceneError> {
    msg.attached_objects
        .iter()
        .map(|entry| {
            let id = ObjectId::new(entry.object.id.as_str())?;
            match entry.object.operation {
                ObjectOperation::Add => {
                    let shape = entry.object.shape.ok_or_else(|| {
                        SceneError::InvalidArgument(format!("attached object {id} has no shape"))
                    })?;
                    let obj = AttachedObject::new(
                        shape,
                        entry.object.pose,
                        entry.link_name.as_str(),
                        entry.touch_links.iter().cloned(),
                    )?;
                    Ok(Entry::Put(id, obj))
                }
                ObjectOperation::Remove => {
                    check_remove(msg, id.as_str())?;
                    Ok(Entry::Remove(id))
                }
            }
        })
        .collect()
}

impl SceneStore {
    /// Serializes the effective state of `layer`.
    ///
    /// Fails with `NotConfigured` when no robot is bound to the chain.
    pub fn full_msg(&self, layer: LayerId) -> Result<SceneMsg, SceneError> {
        let chain = self.chain(layer)?;
        let robot_name = bound_robot(&chain)?;
        let world = fold_world(&chain);
        let attached = fold_attached(&chain);
        Ok(SceneMsg {
            robot_name,
            is_diff: false,
            world: world.iter().map(|(id, obj)| world_entry(id, obj)).collect(),
            attached_objects: attached
                .iter()
                .map(|(id, obj)| attached_entry(id, obj))
                .collect(),
        })
    }

    /// Serializes only the local overrides of `layer`, tombstones as `Remove`
    /// entries. A root layer produces its full message. Unbound chains fail
    /// with `NotConfigured`.
    pub fn diff_msg(&self, layer: LayerId) -> Result<SceneMsg, SceneError> {
        let chain = self.chain(layer)?;
        let robot_name = bound_robot(&chain)?;
        let Some(local) = chain.first().filter(|l| l.parent.is_some()) else {
            return self.full_msg(layer);
        };
        let world = local
            .world
            .iter()
            .map(|(id, entry)| match entry {
                Override::Present(obj) => world_entry(id, obj),
                Override::Tombstone => CollisionObjectMsg::remove(id.as_str()),
            })
            .collect();
        let attached_objects = local
            .attached
            .iter()
            .map(|(id, entry)| match entry {
                Override::Present(obj) => attached_entry(id, obj),
                Override::Tombstone => {
                    AttachedObjectMsg::new(String::new(), CollisionObjectMsg::remove(id.as_str()))
                }
            })
            .collect();
        Ok(SceneMsg {
            robot_name,
            is_diff: true,
            world,
            attached_objects,
        })
    }

    /// Applies `msg` to `layer`.
    ///
    /// Diff messages merge: mentioned ids are overwritten or removed, the rest
    /// are untouched. Full messages replace: local overrides are cleared and
    /// every inherited id the message does not list is tombstoned, so the
    /// effective state equals the message content. Nothing changes on error.
    #[instrument(level = "debug", skip(self, msg), fields(is_diff = msg.is_diff, entries = msg.len()))]
    pub fn apply_msg(&mut self, layer: LayerId, msg: &SceneMsg) -> Result<(), SceneError> {
        let chain = self.chain(layer)?;
        let bound = bound_robot(&chain).unwrap_or_default();
        if !msg.robot_name.is_empty() && !bound.is_empty() && msg.robot_name != bound {
            return Err(SceneError::RobotMismatch {
                expected: bound,
                found: msg.robot_name.clone(),
            });
        }

        let world = parse_world(msg)?;
        let attached = parse_attached(msg)?;
        let world_puts: BTreeSet<&str> = world
            .iter()
            .filter_map(|e| match e {
                Entry::Put(id, _) => Some(id.as_str()),
                Entry::Remove(_) => None,
            })
            .collect();
        let attached_puts: BTreeSet<&str> = attached
            .iter()
            .filter_map(|e| match e {
                Entry::Put(id, _) => Some(id.as_str()),
                Entry::Remove(_) => None,
            })
            .collect();
        if let Some(id) = world_puts.intersection(&attached_puts).next() {
            return Err(SceneError::InvalidArgument(format!(
                "object {id:?} is listed both as free-standing and attached"
            )));
        }

        let mut edits = Vec::new();
        if msg.is_diff {
            // An object is either free-standing or attached, never both.
            for id in &world_puts {
                if lookup(chain.iter().copied().map(|l| &l.attached), id).is_some() {
                    edits.push(Edit::DropAttached {
                        id: ObjectId::new(*id)?,
                        inherited: inherited_attached(&chain, id),
                    });
                }
            }
            for id in &attached_puts {
                if lookup(chain.iter().copied().map(|l| &l.world), id).is_some() {
                    edits.push(Edit::DropWorld {
                        id: ObjectId::new(*id)?,
                        inherited: inherited_world(&chain, id),
                    });
                }
            }
        } else {
            edits.push(Edit::ClearLocal);
            let ancestors = chain.get(1..).unwrap_or_default();
            for (id, _) in fold_world(ancestors).iter() {
                if !world_puts.contains(id.as_str()) {
                    edits.push(Edit::DropWorld {
                        id: id.clone(),
                        inherited: true,
                    });
                }
            }
            for (id, _) in fold_attached(ancestors).iter() {
                if !attached_puts.contains(id.as_str()) {
                    edits.push(Edit::DropAttached {
                        id: id.clone(),
                        inherited: true,
                    });
                }
            }
        }

        let mut removed = 0usize;
        for entry in world {
            edits.push(match entry {
                Entry::Put(id, obj) => Edit::PutWorld(id, obj),
                Entry::Remove(id) => {
                    removed += 1;
                    let inherited = inherited_world(&chain, id.as_str());
                    Edit::DropWorld { id, inherited }
                }
            });
        }
        for entry in attached {
            edits.push(match entry {
                Entry::Put(id, obj) => Edit::PutAttached(id, obj),
                Entry::Remove(id) => {
                    removed += 1;
                    let inherited = inherited_attached(&chain, id.as_str());
                    Edit::DropAttached { id, inherited }
                }
            });
        }

        let count = edits.len();
        self.commit(layer, edits)?;
        debug!(layer = %layer, edits = count, removed, "applied scene message");
        Ok(())
    }
}
