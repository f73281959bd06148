// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Geometric primitives carried by collision objects.

use std::sync::Arc;

use crate::SceneError;

/// Shared, immutable handle to a shape.
///
/// Layers, resolved views, and messages all point at the same allocation.
pub type ShapeHandle = Arc<Shape>;

/// Geometric primitive, centred on its own frame origin.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "snake_case"))]
pub enum Shape {
    /// Sphere of the given radius.
    Sphere {
        /// Radius in metres.
        radius: f64,
    },
    /// Axis-aligned box with full side lengths `[x, y, z]`.
    Box {
        /// Full extents in metres.
        size: [f64; 3],
    },
    /// Cylinder along the local Z axis.
    Cylinder {
        /// Radius in metres.
        radius: f64,
        /// Full length along Z in metres.
        length: f64,
    },
}

impl Shape {
    /// Sphere shorthand.
    pub const fn sphere(radius: f64) -> Self {
        Self::Sphere { radius }
    }

    /// Box shorthand.
    pub const fn cuboid(x: f64, y: f64, z: f64) -> Self {
        Self::Box { size: [x, y, z] }
    }

    /// Cylinder shorthand.
    pub const fn cylinder(radius: f64, length: f64) -> Self {
        Self::Cylinder { radius, length }
    }

    /// Radius of the smallest origin-centred sphere enclosing the shape.
    pub fn bounding_radius(&self) -> f64 {
        match *self {
            Self::Sphere { radius } => radius,
            Self::Box { size: [x, y, z] } => 0.5 * (x * x + y * y + z * z).sqrt(),
            Self::Cylinder { radius, length } => (radius * radius + 0.25 * length * length).sqrt(),
        }
    }

    /// Rejects non-finite or non-positive dimensions.
    pub fn validate(&self) -> Result<(), SceneError> {
        let ok = |d: f64| d.is_finite() && d > 0.0;
        let valid = match *self {
            Self::Sphere { radius } => ok(radius),
            Self::Box { size } => size.iter().all(|d| ok(*d)),
            Self::Cylinder { radius, length } => ok(radius) && ok(length),
        };
        if valid {
            Ok(())
        } else {
            Err(SceneError::InvalidArgument(format!(
                "shape dimensions must be finite and positive: {self:?}"
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_degenerate_dimensions() {
        assert!(Shape::sphere(0.4).validate().is_ok());
        assert!(Shape::sphere(0.0).validate().is_err());
        assert!(Shape::cuboid(1.0, f64::INFINITY, 1.0).validate().is_err());
        assert!(Shape::cylinder(-0.1, 1.0).validate().is_err());
    }

    #[test]
    fn bounding_radius_of_unit_cube() {
        let r = Shape::cuboid(2.0, 2.0, 2.0).bounding_radius();
        assert!((r - 3f64.sqrt()).abs() < 1e-12);
    }
}
