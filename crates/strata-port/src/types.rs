// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Identifier types.

use core::borrow::Borrow;
use core::fmt;

use crate::SceneError;

/// Name of a collision or attached object.
///
/// Guaranteed non-empty and free of leading/trailing whitespace. Maps keyed by
/// `ObjectId` can be queried with a plain `&str`.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct ObjectId(String);

impl ObjectId {
    /// Validates and wraps an identifier.
    pub fn new(id: impl Into<String>) -> Result<Self, SceneError> {
        let id = id.into();
        if id.is_empty() {
            return Err(SceneError::InvalidArgument("object id is empty".into()));
        }
        if id.trim() != id {
            return Err(SceneError::InvalidArgument(format!(
                "object id {id:?} has surrounding whitespace"
            )));
        }
        Ok(Self(id))
    }

    /// Borrow the identifier text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for ObjectId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ObjectId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<&str> for ObjectId {
    type Error = SceneError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<String> for ObjectId {
    type Error = SceneError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_and_padded_ids() {
        assert!(ObjectId::new("").is_err());
        assert!(ObjectId::new(" s1").is_err());
        assert_eq!(ObjectId::new("s1").map(|id| id.to_string()), Ok("s1".into()));
    }
}
