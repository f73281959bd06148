// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Attach/detach: move objects between the world and robot links.
use std::sync::Arc;

use strata_port::{AttachedObjectMsg, ObjectId, ObjectOperation, SceneError};
use tracing::{debug, instrument};

use crate::attached::AttachedObject;
use crate::ident::LayerId;
use crate::store::{inherited_attached, inherited_world, lookup, Edit, SceneStore};
use crate::world::CollisionObject;

impl SceneStore {
    /// Reclassifies an object as attached to, or detached from, a robot link.
    ///
    /// `Add` without a shape takes the object out of the effective world and
    /// re-expresses its pose in the link frame; `Add` with a shape attaches
    /// that geometry directly (pose already link-relative) and hides any
    /// free-standing object with the same id. `Remove` puts the object back
    /// into `layer`'s world at its current world-frame pose. Every kinematic
    /// lookup happens before the layer is touched.
    #[instrument(level = "debug", skip(self, msg), fields(object = %msg.object.id, link = %msg.link_name))]
    pub fn process_attached_collision_object(
        &mut self,
        layer: LayerId,
        msg: &AttachedObjectMsg,
    ) -> Result<(), SceneError> {
        let chain = self.chain(layer)?;
        let binding = chain
            .last()
            .and_then(|root| root.robot.clone())
            .ok_or(SceneError::NotConfigured)?;
        let kinematics = binding.kinematics();
        let id = ObjectId::new(msg.object.id.as_str())?;
        let world_obj = lookup(chain.iter().copied().map(|l| &l.world), id.as_str());
        let attached_obj = lookup(chain.iter().copied().map(|l| &l.attached), id.as_str());

        let edits = match msg.object.operation {
            ObjectOperation::Add => {
                if !kinematics.has_link(&msg.link_name) {
                    return Err(SceneError::UnknownLink(msg.link_name.clone()));
                }
                let touch = msg.touch_links.iter().cloned();
                let object = match (msg.object.shape, world_obj) {
                    (Some(shape), _) => {
                        AttachedObject::new(shape, msg.object.pose, msg.link_name.as_str(), touch)?
                    }
                    (None, Some(free)) => {
                        let pose = kinematics.pose_in_link_frame(&free.pose, &msg.link_name)?;
                        AttachedObject::new(
                            Arc::clone(&free.shape),
                            pose,
                            msg.link_name.as_str(),
                            touch,
                        )?
                    }
                    (None, None) => return Err(SceneError::ObjectNotFound(id.to_string())),
                };
                let mut edits = Vec::with_capacity(2);
                if world_obj.is_some() {
                    edits.push(Edit::DropWorld {
                        id: id.clone(),
                        inherited: inherited_world(&chain, id.as_str()),
                    });
                }
                edits.push(Edit::PutAttached(id, object));
                edits
            }
            ObjectOperation::Remove => {
                let held = attached_obj.ok_or_else(|| SceneError::ObjectNotFound(id.to_string()))?;
                if !msg.link_name.is_empty() && msg.link_name != held.link_name {
                    return Err(SceneError::InvalidArgument(format!(
                        "object {id} is attached to {:?}, not {:?}",
                        held.link_name, msg.link_name
                    )));
                }
                let pose = kinematics.pose_in_world_frame(&held.pose, &held.link_name)?;
                let object = CollisionObject::new(Arc::clone(&held.shape), pose)?;
                vec![
                    Edit::DropAttached {
                        id: id.clone(),
                        inherited: inherited_attached(&chain, id.as_str()),
                    },
                    Edit::PutWorld(id, object),
                ]
            }
        };
        self.commit(layer, edits)?;
        debug!(layer = %layer, "reclassified object");
        Ok(())
    }
}
