// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Rigid-body pose math used to express object placement.
//!
//! Poses are `f64` so attach/detach frame round trips stay well inside the
//! tolerance planners expect.

/// Length/angle threshold under which vectors and quaternions are treated as zero.
pub const EPSILON: f64 = 1e-12;

/// 3D vector in metres.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vec3 {
    data: [f64; 3],
}

impl Vec3 {
    /// Zero vector.
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    /// Creates a vector from components.
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { data: [x, y, z] }
    }

    /// Returns the components as an array.
    pub fn to_array(self) -> [f64; 3] {
        self.data
    }

    /// Adds two vectors.
    pub fn add(&self, other: &Self) -> Self {
        Self::new(
            self.data[0] + other.data[0],
            self.data[1] + other.data[1],
            self.data[2] + other.data[2],
        )
    }

    /// Subtracts another vector.
    pub fn sub(&self, other: &Self) -> Self {
        Self::new(
            self.data[0] - other.data[0],
            self.data[1] - other.data[1],
            self.data[2] - other.data[2],
        )
    }

    /// Scales the vector by a scalar.
    pub fn scale(&self, scalar: f64) -> Self {
        Self::new(
            self.data[0] * scalar,
            self.data[1] * scalar,
            self.data[2] * scalar,
        )
    }

    /// Dot product with another vector.
    pub fn dot(&self, other: &Self) -> f64 {
        self.data[0] * other.data[0] + self.data[1] * other.data[1] + self.data[2] * other.data[2]
    }

    /// Cross product with another vector.
    pub fn cross(&self, other: &Self) -> Self {
        let [ax, ay, az] = self.data;
        let [bx, by, bz] = other.data;
        Self::new(ay * bz - az * by, az * bx - ax * bz, ax * by - ay * bx)
    }

    /// Euclidean length.
    pub fn length(&self) -> f64 {
        self.dot(self).sqrt()
    }

    /// Returns `true` when every component is finite.
    pub fn is_finite(&self) -> bool {
        self.data.iter().all(|c| c.is_finite())
    }
}

impl From<[f64; 3]> for Vec3 {
    fn from(value: [f64; 3]) -> Self {
        Self { data: value }
    }
}

/// Quaternion stored as `(x, y, z, w)`.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Quat {
    data: [f64; 4],
}

impl Default for Quat {
    fn default() -> Self {
        Self::identity()
    }
}

impl Quat {
    /// Creates a quaternion from components.
    pub const fn new(x: f64, y: f64, z: f64, w: f64) -> Self {
        Self { data: [x, y, z, w] }
    }

    /// Returns the identity quaternion.
    pub const fn identity() -> Self {
        Self::new(0.0, 0.0, 0.0, 1.0)
    }

    /// Returns the quaternion as an array.
    pub fn to_array(self) -> [f64; 4] {
        self.data
    }

    /// Constructs a rotation of `angle` radians about `axis`.
    ///
    /// Returns identity when the axis is degenerate.
    pub fn from_axis_angle(axis: Vec3, angle: f64) -> Self {
        let len = axis.length();
        if len <= EPSILON {
            return Self::identity();
        }
        let (sin_half, cos_half) = (angle * 0.5).sin_cos();
        let [x, y, z] = axis.scale(sin_half / len).to_array();
        Self::new(x, y, z, cos_half)
    }

    /// Hamilton product (`self * other`): applies `other` first, then `self`.
    pub fn multiply(&self, other: &Self) -> Self {
        let [ax, ay, az, aw] = self.data;
        let [bx, by, bz, bw] = other.data;
        Self::new(
            aw * bx + ax * bw + ay * bz - az * by,
            aw * by - ax * bz + ay * bw + az * bx,
            aw * bz + ax * by - ay * bx + az * bw,
            aw * bw - ax * bx - ay * by - az * bz,
        )
    }

    /// Conjugate; the inverse rotation for unit quaternions.
    pub fn conjugate(&self) -> Self {
        let [x, y, z, w] = self.data;
        Self::new(-x, -y, -z, w)
    }

    /// Normalises the quaternion; returns identity when norm is ~0.
    pub fn normalize(&self) -> Self {
        let [x, y, z, w] = self.data;
        let len = (x * x + y * y + z * z + w * w).sqrt();
        if len <= EPSILON {
            return Self::identity();
        }
        let inv = 1.0 / len;
        Self::new(x * inv, y * inv, z * inv, w * inv)
    }

    /// Rotates a vector by this quaternion.
    pub fn rotate(&self, v: &Vec3) -> Vec3 {
        // v' = v + 2w(q × v) + 2 q × (q × v)
        let [x, y, z, w] = self.data;
        let q = Vec3::new(x, y, z);
        let t = q.cross(v).scale(2.0);
        v.add(&t.scale(w)).add(&q.cross(&t))
    }

    /// Returns `true` when every component is finite.
    pub fn is_finite(&self) -> bool {
        self.data.iter().all(|c| c.is_finite())
    }
}

impl From<[f64; 4]> for Quat {
    fn from(value: [f64; 4]) -> Self {
        Self { data: value }
    }
}

/// Rigid transform: rotation followed by translation.
///
/// A pose `P` maps points from its local frame into its parent frame:
/// `P(p) = rotation * p + translation`.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Pose {
    /// Translation in the parent frame.
    pub translation: Vec3,
    /// Unit rotation.
    pub rotation: Quat,
}

impl Pose {
    /// Identity pose.
    pub const fn identity() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Quat::identity(),
        }
    }

    /// Creates a pose from components.
    pub const fn new(translation: Vec3, rotation: Quat) -> Self {
        Self {
            translation,
            rotation,
        }
    }

    /// Pure translation.
    pub const fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            rotation: Quat::identity(),
        }
    }

    /// Composition `self ∘ other`: express `other` (given in `self`'s frame)
    /// in `self`'s parent frame.
    pub fn compose(&self, other: &Self) -> Self {
        Self {
            translation: self.transform_point(&other.translation),
            rotation: self.rotation.multiply(&other.rotation).normalize(),
        }
    }

    /// Inverse transform.
    pub fn inverse(&self) -> Self {
        let inv_rot = self.rotation.normalize().conjugate();
        Self {
            translation: inv_rot.rotate(&self.translation).scale(-1.0),
            rotation: inv_rot,
        }
    }

    /// Maps a point from the local frame into the parent frame.
    pub fn transform_point(&self, p: &Vec3) -> Vec3 {
        self.rotation.normalize().rotate(p).add(&self.translation)
    }

    /// Returns `true` when all components are finite and the rotation is not degenerate.
    pub fn is_valid(&self) -> bool {
        let [x, y, z, w] = self.rotation.to_array();
        self.translation.is_finite()
            && self.rotation.is_finite()
            && (x * x + y * y + z * z + w * w) > EPSILON
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::f64::consts::FRAC_PI_2;

    fn assert_vec_near(a: Vec3, b: Vec3) {
        let d = a.sub(&b).length();
        assert!(d < 1e-9, "{a:?} != {b:?} (|d| = {d})");
    }

    #[test]
    fn rotate_quarter_turn_about_z() {
        let q = Quat::from_axis_angle(Vec3::new(0.0, 0.0, 1.0), FRAC_PI_2);
        assert_vec_near(q.rotate(&Vec3::new(1.0, 0.0, 0.0)), Vec3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn compose_with_inverse_is_identity() {
        let pose = Pose::new(
            Vec3::new(1.0, -2.0, 0.5),
            Quat::from_axis_angle(Vec3::new(1.0, 1.0, 0.0), 0.7),
        );
        let round = pose.compose(&pose.inverse());
        assert_vec_near(round.translation, Vec3::ZERO);
        let p = Vec3::new(0.3, 0.2, 0.1);
        assert_vec_near(round.transform_point(&p), p);
    }

    #[test]
    fn degenerate_rotation_is_invalid() {
        let pose = Pose::new(Vec3::ZERO, Quat::new(0.0, 0.0, 0.0, 0.0));
        assert!(!pose.is_valid());
        let nan = Pose::from_translation(Vec3::new(f64::NAN, 0.0, 0.0));
        assert!(!nan.is_valid());
        assert!(Pose::identity().is_valid());
    }
}
