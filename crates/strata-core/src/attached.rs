// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Attached-object store: objects carried by robot links.
use std::collections::BTreeSet;

use strata_port::{ObjectId, Pose, SceneError, ShapeHandle};

use crate::ordered::OrderedMap;

/// An object that moves with a robot link.
#[derive(Debug, Clone, PartialEq)]
pub struct AttachedObject {
    /// Geometry (shared with the world object it was attached from).
    pub shape: ShapeHandle,
    /// Pose relative to `link_name`.
    pub pose: Pose,
    /// Owning link.
    pub link_name: String,
    /// Links the object may touch; always contains `link_name`.
    pub touch_links: BTreeSet<String>,
}

impl AttachedObject {
    /// Builds an attached object, validating geometry and link name.
    pub fn new(
        shape: impl Into<ShapeHandle>,
        pose: Pose,
        link_name: impl Into<String>,
        touch_links: impl IntoIterator<Item = String>,
    ) -> Result<Self, SceneError> {
        let shape = shape.into();
        shape.validate()?;
        if !pose.is_valid() {
            return Err(SceneError::InvalidArgument(format!(
                "pose is not a finite rigid transform: {pose:?}"
            )));
        }
        let link_name = link_name.into();
        if link_name.is_empty() {
            return Err(SceneError::InvalidArgument(
                "attached object needs a link name".into(),
            ));
        }
        let mut touch_links: BTreeSet<String> =
            touch_links.into_iter().filter(|l| !l.is_empty()).collect();
        touch_links.insert(link_name.clone());
        Ok(Self {
            shape,
            pose,
            link_name,
            touch_links,
        })
    }
}

/// Mapping `object id -> (shape, pose relative to link, link)`.
#[derive(Debug, Clone, Default)]
pub struct AttachedObjectStore {
    objects: OrderedMap<AttachedObject>,
}

impl AttachedObjectStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces `id`.
    pub fn add(&mut self, id: ObjectId, object: AttachedObject) {
        self.objects.insert(id, object);
    }

    /// Removes `id` if present; returns whether it was present.
    pub fn remove(&mut self, id: &str) -> bool {
        self.objects.remove(id).is_some()
    }

    /// Whether `id` is attached.
    pub fn has(&self, id: &str) -> bool {
        self.objects.contains(id)
    }

    /// Looks up `id`.
    pub fn get(&self, id: &str) -> Option<&AttachedObject> {
        self.objects.get(id)
    }

    /// All identifiers.
    pub fn ids(&self) -> Vec<ObjectId> {
        self.objects.keys().cloned().collect()
    }

    /// Identifiers of objects attached to `link`.
    pub fn ids_on_link(&self, link: &str) -> Vec<ObjectId> {
        self.objects
            .iter()
            .filter(|(_, obj)| obj.link_name == link)
            .map(|(id, _)| id.clone())
            .collect()
    }

    /// Iterate over `(id, object)`.
    pub fn iter(&self) -> impl Iterator<Item = (&ObjectId, &AttachedObject)> {
        self.objects.iter()
    }

    /// Number of attached objects.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether nothing is attached.
    pub fn is_empty(&self) -> bool {
        self.objects.len() == 0
    }
}

impl PartialEq for AttachedObjectStore {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(id, obj)| other.get(id.as_str()) == Some(obj))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use strata_port::Shape;

    #[test]
    fn owning_link_is_always_a_touch_link() {
        let obj = AttachedObject::new(
            Shape::sphere(0.1),
            Pose::identity(),
            "r_wrist_roll_link",
            vec!["r_gripper".to_owned(), String::new()],
        )
        .unwrap();
        let links: Vec<_> = obj.touch_links.iter().map(String::as_str).collect();
        assert_eq!(links, vec!["r_gripper", "r_wrist_roll_link"]);
    }

    #[test]
    fn ids_on_link_filters_by_owner() {
        let mut store = AttachedObjectStore::new();
        let on = |link: &str| {
            AttachedObject::new(Shape::sphere(0.1), Pose::identity(), link, Vec::new()).unwrap()
        };
        store.add(ObjectId::new("a").unwrap(), on("l1"));
        store.add(ObjectId::new("b").unwrap(), on("l2"));
        store.add(ObjectId::new("c").unwrap(), on("l1"));
        let ids: Vec<_> = store.ids_on_link("l1").iter().map(ToString::to_string).collect();
        assert_eq!(ids, vec!["a", "c"]);
        assert!(AttachedObject::new(Shape::sphere(0.1), Pose::identity(), "", Vec::new()).is_err());
    }
}
