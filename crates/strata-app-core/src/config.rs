// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Config port: raw blob storage plus a JSON layer on top.
//!
//! Adapters (filesystem, in-memory) implement [`ConfigStore`]; tools talk to
//! [`ConfigService`], which owns the encoding.

use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

/// Keyed blob storage.
pub trait ConfigStore {
    /// Blob stored under `key`, or [`ConfigError::NotFound`].
    fn load_raw(&self, key: &str) -> Result<Vec<u8>, ConfigError>;
    /// Replace the blob stored under `key`.
    fn save_raw(&self, key: &str, data: &[u8]) -> Result<(), ConfigError>;
}

/// Config failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Nothing stored under the key.
    #[error("config entry not found")]
    NotFound,
    /// Underlying storage failed.
    #[error("config storage: {0}")]
    Io(#[from] std::io::Error),
    /// Stored document is not valid JSON for the requested type.
    #[error("config document: {0}")]
    Json(#[from] serde_json::Error),
    /// Adapter-specific failure.
    #[error("config: {0}")]
    Other(String),
}

/// JSON documents over a [`ConfigStore`].
pub struct ConfigService<S> {
    store: S,
}

impl<S> ConfigService<S> {
    /// Wrap `store`.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// The wrapped store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Unwrap the store.
    pub fn into_inner(self) -> S {
        self.store
    }
}

impl<S: ConfigStore> ConfigService<S> {
    /// Decode the document under `key`. Missing and zero-length blobs are `None`.
    pub fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, ConfigError> {
        let blob = match self.store.load_raw(key) {
            Err(ConfigError::NotFound) => return Ok(None),
            other => other?,
        };
        if blob.is_empty() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_slice(&blob)?))
    }

    /// [`Self::load`], with `T::default()` standing in for a missing document.
    pub fn load_or_default<T: DeserializeOwned + Default>(
        &self,
        key: &str,
    ) -> Result<T, ConfigError> {
        self.load(key).map(Option::unwrap_or_default)
    }

    /// Encode `value` as pretty JSON under `key`.
    pub fn save<T: Serialize>(&self, key: &str, value: &T) -> Result<(), ConfigError> {
        self.store.save_raw(key, &serde_json::to_vec_pretty(value)?)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use std::cell::RefCell;
    use std::collections::BTreeMap;

    #[derive(Default)]
    struct Blobs(RefCell<BTreeMap<String, Vec<u8>>>);

    impl ConfigStore for Blobs {
        fn load_raw(&self, key: &str) -> Result<Vec<u8>, ConfigError> {
            self.0.borrow().get(key).cloned().ok_or(ConfigError::NotFound)
        }

        fn save_raw(&self, key: &str, data: &[u8]) -> Result<(), ConfigError> {
            self.0.borrow_mut().insert(key.to_owned(), data.to_vec());
            Ok(())
        }
    }

    #[test]
    fn absent_and_blank_documents_are_none() {
        let service = ConfigService::new(Blobs::default());
        assert!(matches!(service.load::<u32>("absent"), Ok(None)));
        service.store().save_raw("blank", b"").unwrap();
        assert!(matches!(service.load::<u32>("blank"), Ok(None)));
        assert_eq!(service.load_or_default::<u32>("absent").unwrap(), 0);
    }

    #[test]
    fn saved_documents_load_back() {
        let service = ConfigService::new(Blobs::default());
        service.save("depth", &[3_u32, 5]).unwrap();
        assert_eq!(service.load::<Vec<u32>>("depth").unwrap(), Some(vec![3, 5]));
    }

    #[test]
    fn malformed_json_is_reported() {
        let service = ConfigService::new(Blobs::default());
        service.store().save_raw("bad", b"{not json").unwrap();
        assert!(matches!(service.load::<u32>("bad"), Err(ConfigError::Json(_))));
    }
}
