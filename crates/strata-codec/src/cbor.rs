// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! CBOR encoding and decoding for scene messages.
//!
//! Wire layout (version 1), all arrays definite-length:
//!
//! ```text
//! SceneMsg           = [1, robot_name, is_diff, [CollisionObject*], [AttachedObject*]]
//! CollisionObject    = [id, op, Shape / null, Pose]
//! AttachedObject     = [link_name, CollisionObject, [touch_link*]]
//! Shape              = [0, radius] / [1, x, y, z] / [2, radius, length]
//! Pose               = [tx, ty, tz, qx, qy, qz, qw]
//! ```

use std::convert::Infallible;

use minicbor::{Decoder, Encoder};
use strata_port::{
    AttachedObjectMsg, CollisionObjectMsg, ObjectOperation, Pose, Quat, SceneMsg, Shape, Vec3,
    MAX_OBJECTS,
};

/// Wire version written by [`encode_scene_msg`].
pub const WIRE_VERSION: u8 = 1;

/// Encoding error; only custom encoder logic can produce one when writing to a `Vec`.
pub type EncodeError = minicbor::encode::Error<Infallible>;

type DecodeResult<T> = Result<T, minicbor::decode::Error>;

// ============================================================================
// Helpers
// ============================================================================

fn definite_array(d: &mut Decoder<'_>, what: &str) -> DecodeResult<u64> {
    d.array()?.ok_or_else(|| {
        minicbor::decode::Error::message(format!("expected definite array for {what}"))
    })
}

fn expect_fields(d: &mut Decoder<'_>, what: &str, fields: u64) -> DecodeResult<()> {
    let len = definite_array(d, what)?;
    if len == fields {
        Ok(())
    } else {
        Err(minicbor::decode::Error::message(format!(
            "{what} expected {fields} fields, got {len}"
        )))
    }
}

fn bounded_len(len: u64, limit: usize, what: &str) -> DecodeResult<usize> {
    match usize::try_from(len) {
        Ok(n) if n <= limit => Ok(n),
        _ => Err(minicbor::decode::Error::message(format!(
            "{what} count {len} exceeds limit {limit}"
        ))),
    }
}

fn decode_robust_f64(d: &mut Decoder<'_>) -> DecodeResult<f64> {
    match d.datatype()? {
        minicbor::data::Type::F64 => d.f64(),
        minicbor::data::Type::F32 => Ok(f64::from(d.f32()?)),
        t => Err(minicbor::decode::Error::message(format!(
            "expected float, got {t:?}"
        ))),
    }
}

// ============================================================================
// Pose
// ============================================================================

fn encode_pose<W: minicbor::encode::Write>(
    e: &mut Encoder<W>,
    pose: &Pose,
) -> Result<(), minicbor::encode::Error<W::Error>> {
    e.array(7)?;
    for v in pose.translation.to_array() {
        e.f64(v)?;
    }
    for v in pose.rotation.to_array() {
        e.f64(v)?;
    }
    Ok(())
}

fn decode_pose(d: &mut Decoder<'_>) -> DecodeResult<Pose> {
    expect_fields(d, "Pose", 7)?;
    let mut v = [0.0f64; 7];
    for slot in &mut v {
        *slot = decode_robust_f64(d)?;
    }
    let [tx, ty, tz, qx, qy, qz, qw] = v;
    Ok(Pose::new(Vec3::new(tx, ty, tz), Quat::new(qx, qy, qz, qw)))
}

// ============================================================================
// Shape
// ============================================================================

fn encode_shape<W: minicbor::encode::Write>(
    e: &mut Encoder<W>,
    shape: &Shape,
) -> Result<(), minicbor::encode::Error<W::Error>> {
    match *shape {
        Shape::Sphere { radius } => {
            e.array(2)?;
            e.u8(0)?;
            e.f64(radius)?;
        }
        Shape::Box { size: [x, y, z] } => {
            e.array(4)?;
            e.u8(1)?;
            e.f64(x)?;
            e.f64(y)?;
            e.f64(z)?;
        }
        Shape::Cylinder { radius, length } => {
            e.array(3)?;
            e.u8(2)?;
            e.f64(radius)?;
            e.f64(length)?;
        }
    }
    Ok(())
}

fn decode_shape(d: &mut Decoder<'_>) -> DecodeResult<Shape> {
    let len = definite_array(d, "Shape")?;
    let tag = d.u8()?;
    let arity = match tag {
        0 => 2,
        1 => 4,
        2 => 3,
        n => {
            return Err(minicbor::decode::Error::message(format!(
                "invalid Shape tag: {n}"
            )))
        }
    };
    if len != arity {
        return Err(minicbor::decode::Error::message(format!(
            "Shape tag {tag} expected {arity} fields, got {len}"
        )));
    }
    Ok(match tag {
        0 => Shape::sphere(decode_robust_f64(d)?),
        1 => {
            let x = decode_robust_f64(d)?;
            let y = decode_robust_f64(d)?;
            let z = decode_robust_f64(d)?;
            Shape::cuboid(x, y, z)
        }
        _ => {
            let radius = decode_robust_f64(d)?;
            let length = decode_robust_f64(d)?;
            Shape::cylinder(radius, length)
        }
    })
}

// ============================================================================
// ObjectOperation
// ============================================================================

fn decode_operation(d: &mut Decoder<'_>) -> DecodeResult<ObjectOperation> {
    match d.u8()? {
        0 => Ok(ObjectOperation::Add),
        1 => Ok(ObjectOperation::Remove),
        n => Err(minicbor::decode::Error::message(format!(
            "invalid ObjectOperation: {n}"
        ))),
    }
}

// ============================================================================
// CollisionObjectMsg / AttachedObjectMsg
// ============================================================================

fn encode_object<W: minicbor::encode::Write>(
    e: &mut Encoder<W>,
    object: &CollisionObjectMsg,
) -> Result<(), minicbor::encode::Error<W::Error>> {
    e.array(4)?;
    e.str(&object.id)?;
    e.u8(object.operation as u8)?;
    match &object.shape {
        Some(shape) => encode_shape(e, shape)?,
        None => {
            e.null()?;
        }
    }
    encode_pose(e, &object.pose)
}

fn decode_object(d: &mut Decoder<'_>) -> DecodeResult<CollisionObjectMsg> {
    expect_fields(d, "CollisionObject", 4)?;
    let id = d.str()?.to_owned();
    let operation = decode_operation(d)?;
    let shape = if d.datatype()? == minicbor::data::Type::Null {
        d.null()?;
        None
    } else {
        Some(decode_shape(d)?)
    };
    let pose = decode_pose(d)?;
    Ok(CollisionObjectMsg {
        id,
        operation,
        shape,
        pose,
    })
}

fn encode_attached<W: minicbor::encode::Write>(
    e: &mut Encoder<W>,
    attached: &AttachedObjectMsg,
) -> Result<(), minicbor::encode::Error<W::Error>> {
    e.array(3)?;
    e.str(&attached.link_name)?;
    encode_object(e, &attached.object)?;
    e.array(attached.touch_links.len() as u64)?;
    for link in &attached.touch_links {
        e.str(link)?;
    }
    Ok(())
}

fn decode_attached(d: &mut Decoder<'_>, limit: usize) -> DecodeResult<AttachedObjectMsg> {
    expect_fields(d, "AttachedObject", 3)?;
    let link_name = d.str()?.to_owned();
    let object = decode_object(d)?;
    let len = definite_array(d, "touch_links")?;
    let len = bounded_len(len, limit, "touch_links")?;
    let mut touch_links = Vec::with_capacity(len);
    for _ in 0..len {
        touch_links.push(d.str()?.to_owned());
    }
    Ok(AttachedObjectMsg {
        link_name,
        object,
        touch_links,
    })
}

// ============================================================================
// SceneMsg
// ============================================================================

fn encode_scene_msg_inner<W: minicbor::encode::Write>(
    e: &mut Encoder<W>,
    msg: &SceneMsg,
) -> Result<(), minicbor::encode::Error<W::Error>> {
    e.array(5)?;
    e.u8(WIRE_VERSION)?;
    e.str(&msg.robot_name)?;
    e.bool(msg.is_diff)?;
    e.array(msg.world.len() as u64)?;
    for object in &msg.world {
        encode_object(e, object)?;
    }
    e.array(msg.attached_objects.len() as u64)?;
    for attached in &msg.attached_objects {
        encode_attached(e, attached)?;
    }
    Ok(())
}

fn decode_scene_msg_inner(d: &mut Decoder<'_>, limit: usize) -> DecodeResult<SceneMsg> {
    expect_fields(d, "SceneMsg", 5)?;
    let version = d.u8()?;
    if version != WIRE_VERSION {
        return Err(minicbor::decode::Error::message(format!(
            "unsupported SceneMsg version: {version}"
        )));
    }
    let robot_name = d.str()?.to_owned();
    let is_diff = d.bool()?;

    let world_len = definite_array(d, "world")?;
    let world_len = bounded_len(world_len, limit, "SceneMsg object")?;
    let mut world = Vec::with_capacity(world_len);
    for _ in 0..world_len {
        world.push(decode_object(d)?);
    }

    let attached_len = definite_array(d, "attached_objects")?;
    let attached_len = bounded_len(attached_len, limit - world_len, "SceneMsg object")?;
    let mut attached_objects = Vec::with_capacity(attached_len);
    for _ in 0..attached_len {
        attached_objects.push(decode_attached(d, limit)?);
    }

    Ok(SceneMsg {
        robot_name,
        is_diff,
        world,
        attached_objects,
    })
}

// ============================================================================
// Public encode/decode functions
// ============================================================================

/// Encode a SceneMsg to CBOR bytes.
pub fn encode_scene_msg(msg: &SceneMsg) -> Result<Vec<u8>, EncodeError> {
    let mut buf = Vec::new();
    let mut encoder = Encoder::new(&mut buf);
    encode_scene_msg_inner(&mut encoder, msg)?;
    Ok(buf)
}

/// Decode a SceneMsg from CBOR bytes, allowing up to [`MAX_OBJECTS`] entries.
pub fn decode_scene_msg(bytes: &[u8]) -> Result<SceneMsg, minicbor::decode::Error> {
    decode_scene_msg_with_limit(bytes, MAX_OBJECTS)
}

/// Decode a SceneMsg from CBOR bytes, allowing up to `limit` world + attached entries.
pub fn decode_scene_msg_with_limit(
    bytes: &[u8],
    limit: usize,
) -> Result<SceneMsg, minicbor::decode::Error> {
    let mut decoder = Decoder::new(bytes);
    let msg = decode_scene_msg_inner(&mut decoder, limit)?;
    if decoder.position() < bytes.len() {
        return Err(minicbor::decode::Error::message("trailing bytes in SceneMsg"));
    }
    Ok(msg)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    fn sample() -> SceneMsg {
        SceneMsg {
            robot_name: "pr2".into(),
            is_diff: true,
            world: vec![
                CollisionObjectMsg::add(
                    "s1",
                    Shape::sphere(0.4),
                    Pose::from_translation(Vec3::new(1.0, 2.0, 3.0)),
                ),
                CollisionObjectMsg::add("crate", Shape::cuboid(0.5, 0.6, 0.7), Pose::identity()),
                CollisionObjectMsg::remove("gone"),
            ],
            attached_objects: vec![AttachedObjectMsg {
                link_name: "r_wrist_roll_link".into(),
                object: CollisionObjectMsg::add(
                    "tool",
                    Shape::cylinder(0.02, 0.2),
                    Pose::new(
                        Vec3::new(0.1, 0.0, 0.0),
                        Quat::from_axis_angle(Vec3::new(0.0, 1.0, 0.0), 0.3),
                    ),
                ),
                touch_links: vec!["r_gripper_palm_link".into()],
            }],
        }
    }

    #[test]
    fn roundtrip() {
        let msg = sample();
        let bytes = encode_scene_msg(&msg).unwrap();
        assert_eq!(decode_scene_msg(&bytes).unwrap(), msg);
    }

    #[test]
    fn empty_full_message_golden_bytes() {
        let bytes = encode_scene_msg(&SceneMsg::default()).unwrap();
        assert_eq!(hex::encode(&bytes), "850160f48080");
    }

    #[test]
    fn reject_trailing_garbage() {
        let mut bytes = encode_scene_msg(&sample()).unwrap();
        bytes.push(0xFF);
        let err = decode_scene_msg(&bytes).unwrap_err().to_string();
        assert!(err.contains("trailing"));
    }

    #[test]
    fn reject_exceeding_object_limit() {
        let mut buf = Vec::new();
        let mut encoder = Encoder::new(&mut buf);
        encoder.array(5).unwrap();
        encoder.u8(WIRE_VERSION).unwrap();
        encoder.str("").unwrap();
        encoder.bool(false).unwrap();
        encoder.array((MAX_OBJECTS + 1) as u64).unwrap();

        let err = decode_scene_msg(&buf).unwrap_err().to_string();
        assert!(err.contains("exceeds limit"));
    }

    #[test]
    fn limit_counts_world_and_attached_together() {
        let bytes = encode_scene_msg(&sample()).unwrap();
        assert!(decode_scene_msg_with_limit(&bytes, 4).is_ok());
        assert!(decode_scene_msg_with_limit(&bytes, 3).is_err());
    }

    #[test]
    fn touch_links_respect_the_caller_limit() {
        let mut msg = sample();
        msg.world.clear();
        msg.attached_objects[0].touch_links = vec!["a".into(), "b".into(), "c".into()];
        let bytes = encode_scene_msg(&msg).unwrap();
        assert_eq!(decode_scene_msg_with_limit(&bytes, 3).unwrap(), msg);
        let err = decode_scene_msg_with_limit(&bytes, 2).unwrap_err().to_string();
        assert!(err.contains("touch_links"));
    }

    #[test]
    fn reject_invalid_version() {
        let mut buf = Vec::new();
        let mut encoder = Encoder::new(&mut buf);
        encoder.array(5).unwrap();
        encoder.u8(99).unwrap();
        encoder.str("").unwrap();
        encoder.bool(false).unwrap();
        encoder.array(0).unwrap();
        encoder.array(0).unwrap();

        let err = decode_scene_msg(&buf).unwrap_err().to_string();
        assert!(err.contains("version"));
    }

    #[test]
    fn reject_invalid_tags() {
        let mut buf = Vec::new();
        let mut encoder = Encoder::new(&mut buf);
        encoder.array(2).unwrap();
        encoder.u8(7).unwrap();
        assert!(decode_shape(&mut Decoder::new(&buf)).is_err());

        buf.clear();
        let mut encoder = Encoder::new(&mut buf);
        encoder.u8(2).unwrap();
        assert!(decode_operation(&mut Decoder::new(&buf)).is_err());

        // Box tag with sphere arity.
        buf.clear();
        let mut encoder = Encoder::new(&mut buf);
        encoder.array(2).unwrap();
        encoder.u8(1).unwrap();
        encoder.f64(1.0).unwrap();
        assert!(decode_shape(&mut Decoder::new(&buf)).is_err());
    }

    #[test]
    fn accepts_f32_on_the_wire() {
        let mut buf = Vec::new();
        let mut encoder = Encoder::new(&mut buf);
        encoder.array(2).unwrap();
        encoder.u8(0).unwrap();
        encoder.f32(0.5).unwrap();
        assert_eq!(
            decode_shape(&mut Decoder::new(&buf)).unwrap(),
            Shape::sphere(0.5)
        );
    }

    #[test]
    fn reject_indefinite_arrays() {
        let mut buf = Vec::new();
        let mut encoder = Encoder::new(&mut buf);
        encoder.begin_array().unwrap();
        encoder.u8(WIRE_VERSION).unwrap();
        encoder.end().unwrap();
        assert!(decode_scene_msg(&buf).is_err());
    }

    #[test]
    fn drill_truncated_cbor() {
        let full_bytes = encode_scene_msg(&sample()).unwrap();
        for len in 0..full_bytes.len() {
            assert!(
                decode_scene_msg(&full_bytes[..len]).is_err(),
                "Decoding should fail for truncated input of length {len}"
            );
        }
    }

    #[test]
    fn random_bytes_never_panic() {
        use rand::{rngs::StdRng, Rng, SeedableRng};
        let mut rng = StdRng::seed_from_u64(0x5eed);
        let valid = encode_scene_msg(&sample()).unwrap();
        for _ in 0..256 {
            let mut bytes = valid.clone();
            let flips = rng.gen_range(1..4);
            for _ in 0..flips {
                let at = rng.gen_range(0..bytes.len());
                bytes[at] = rng.gen();
            }
            let _ = decode_scene_msg(&bytes);
        }
    }
}
