// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Bounding-sphere collision evaluator.
//!
//! Every body is approximated by the sphere that encloses its shape; robot
//! links are spheres of a configured radius at their link origin. Good enough
//! to tell "far apart" from "overlapping" in tests.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use strata_port::{
    CollisionEvaluator, CollisionRequest, CollisionResult, CollisionScene, Contact, Vec3,
};

/// Sphere-vs-sphere evaluator over robot links, attached objects, and world
/// objects. World objects are not tested against each other.
#[derive(Debug, Default)]
pub struct SphereEvaluator {
    link_radii: BTreeMap<String, f64>,
    calls: AtomicUsize,
}

struct Bound {
    name: String,
    center: Vec3,
    radius: f64,
}

impl SphereEvaluator {
    /// Evaluator with no robot geometry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Gives `link` a collision sphere of `radius`.
    pub fn with_link_sphere(mut self, link: impl Into<String>, radius: f64) -> Self {
        self.link_radii.insert(link.into(), radius);
        self
    }

    /// Number of queries evaluated so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }

    fn links(&self, scene: &CollisionScene<'_>) -> Vec<Bound> {
        self.link_radii
            .iter()
            .filter_map(|(link, radius)| {
                scene.robot.link_pose(link).map(|pose| Bound {
                    name: link.clone(),
                    center: pose.translation,
                    radius: *radius,
                })
            })
            .collect()
    }
}

fn bounds(bodies: &[strata_port::CollisionBody]) -> Vec<Bound> {
    bodies
        .iter()
        .map(|body| Bound {
            name: body.id.clone(),
            center: body.pose.translation,
            radius: body.shape.bounding_radius(),
        })
        .collect()
}

impl CollisionEvaluator for SphereEvaluator {
    fn evaluate(&self, scene: &CollisionScene<'_>, request: &CollisionRequest) -> CollisionResult {
        self.calls.fetch_add(1, Ordering::Relaxed);
        let links = self.links(scene);
        let attached = bounds(scene.attached);
        let world = bounds(scene.world);

        let mut pairs: Vec<(&Bound, &Bound)> = Vec::new();
        for a in &links {
            pairs.extend(attached.iter().chain(&world).map(|b| (a, b)));
        }
        for (i, a) in attached.iter().enumerate() {
            pairs.extend(attached.iter().skip(i + 1).chain(&world).map(|b| (a, b)));
        }

        let mut result = CollisionResult::default();
        for (a, b) in pairs {
            if scene.allowed.is_allowed(&a.name, &b.name) {
                continue;
            }
            let depth = a.radius + b.radius - a.center.sub(&b.center).length();
            if depth <= 0.0 {
                continue;
            }
            result.collision = true;
            if !request.contacts {
                break;
            }
            result.contacts.push(Contact {
                body1: a.name.clone(),
                body2: b.name.clone(),
                depth,
            });
            if result.contacts.len() >= request.max_contacts {
                break;
            }
        }
        result
    }
}
