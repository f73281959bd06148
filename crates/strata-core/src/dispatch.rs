// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Collision query dispatch.
use std::sync::Arc;

use strata_port::{
    BodyKind, CollisionBody, CollisionEvaluator, CollisionRequest, CollisionResult,
    CollisionScene, SceneError,
};
use tracing::{debug, instrument};

use crate::ident::LayerId;
use crate::store::{fold_attached, fold_world, SceneStore};

impl SceneStore {
    /// Resolves `layer`'s effective state and hands it to `evaluator`.
    ///
    /// Attached objects are posed in the world frame via the bound kinematic
    /// model. Allowed pairs are the robot's disabled pairs plus each attached
    /// object with its touch links. Fails with `NotConfigured` on an unbound
    /// chain rather than reporting an empty scene as collision-free.
    #[instrument(level = "debug", skip(self, request, evaluator))]
    pub fn check_collision<E>(
        &self,
        layer: LayerId,
        request: &CollisionRequest,
        evaluator: &E,
    ) -> Result<CollisionResult, SceneError>
    where
        E: CollisionEvaluator + ?Sized,
    {
        let chain = self.chain(layer)?;
        let binding = chain
            .last()
            .and_then(|root| root.robot.as_deref())
            .ok_or(SceneError::NotConfigured)?;
        let kinematics = binding.kinematics();

        let world: Vec<CollisionBody> = fold_world(&chain)
            .iter()
            .map(|(id, obj)| CollisionBody {
                id: id.to_string(),
                shape: Arc::clone(&obj.shape),
                pose: obj.pose,
                kind: BodyKind::World,
            })
            .collect();

        let mut allowed = binding.allowed().clone();
        let mut attached = Vec::new();
        for (id, obj) in fold_attached(&chain).iter() {
            let pose = kinematics.pose_in_world_frame(&obj.pose, &obj.link_name)?;
            for link in &obj.touch_links {
                allowed.allow(id.as_str(), link);
            }
            attached.push(CollisionBody {
                id: id.to_string(),
                shape: Arc::clone(&obj.shape),
                pose,
                kind: BodyKind::Attached {
                    link: obj.link_name.clone(),
                },
            });
        }

        let scene = CollisionScene {
            robot: kinematics,
            world: &world,
            attached: &attached,
            allowed: &allowed,
        };
        let result = evaluator.evaluate(&scene, request);
        debug!(
            world = world.len(),
            attached = attached.len(),
            collision = result.collision,
            contacts = result.contacts.len(),
            "evaluated collision query"
        );
        Ok(result)
    }
}
