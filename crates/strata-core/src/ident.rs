// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Layer handles.
use core::fmt;

/// Stable handle to a scene layer inside a [`crate::SceneStore`].
///
/// Handles are generational: once a layer is freed, every old handle to its
/// slot is rejected with `SceneError::UnknownLayer`, even after the slot is
/// reused.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct LayerId {
    pub(crate) index: usize,
    pub(crate) generation: u32,
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "layer#{}v{}", self.index, self.generation)
    }
}
