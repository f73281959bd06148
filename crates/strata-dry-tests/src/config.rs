// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! In-memory config store for tests that should not touch the filesystem.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use strata_app_core::config::{ConfigError, ConfigService, ConfigStore};
use strata_app_core::settings::{SceneSettings, SETTINGS_KEY};

/// Which store operation should fail.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Fault {
    /// Every call succeeds.
    #[default]
    None,
    /// `load_raw` returns `ConfigError::Other`.
    Load,
    /// `save_raw` returns `ConfigError::Other`.
    Save,
}

#[derive(Default)]
struct State {
    blobs: BTreeMap<String, Vec<u8>>,
    loads: usize,
    saves: usize,
    fault: Fault,
}

/// [`ConfigStore`] holding blobs in memory. Clones share one state.
///
/// ```
/// use strata_dry_tests::InMemoryConfigStore;
/// use strata_app_core::settings::SceneSettings;
///
/// let store = InMemoryConfigStore::new();
/// SceneSettings::default().save(&store.service()).unwrap();
/// assert_eq!(store.saves(), 1);
/// assert!(store.raw("scene").is_some());
/// ```
#[derive(Clone, Default)]
pub struct InMemoryConfigStore {
    state: Arc<Mutex<State>>,
}

impl InMemoryConfigStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store whose `scene` document is `settings`.
    pub fn with_settings(settings: &SceneSettings) -> Self {
        let store = Self::new();
        let blob = serde_json::to_vec(settings).unwrap_or_default();
        store.state().blobs.insert(SETTINGS_KEY.to_owned(), blob);
        store
    }

    /// A [`ConfigService`] sharing this store's state.
    pub fn service(&self) -> ConfigService<Self> {
        ConfigService::new(self.clone())
    }

    /// Makes subsequent calls of one kind fail.
    pub fn inject(&self, fault: Fault) {
        self.state().fault = fault;
    }

    /// `load_raw` calls so far, failed ones included.
    pub fn loads(&self) -> usize {
        self.state().loads
    }

    /// `save_raw` calls so far, failed ones included.
    pub fn saves(&self) -> usize {
        self.state().saves
    }

    /// Stored blob for `key`, if any.
    pub fn raw(&self, key: &str) -> Option<Vec<u8>> {
        self.state().blobs.get(key).cloned()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl ConfigStore for InMemoryConfigStore {
    fn load_raw(&self, key: &str) -> Result<Vec<u8>, ConfigError> {
        let mut state = self.state();
        state.loads += 1;
        if state.fault == Fault::Load {
            return Err(ConfigError::Other(format!("injected load fault for {key}")));
        }
        state.blobs.get(key).cloned().ok_or(ConfigError::NotFound)
    }

    fn save_raw(&self, key: &str, data: &[u8]) -> Result<(), ConfigError> {
        let mut state = self.state();
        state.saves += 1;
        if state.fault == Fault::Save {
            return Err(ConfigError::Other(format!("injected save fault for {key}")));
        }
        state.blobs.insert(key.to_owned(), data.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn missing_settings_fall_back_to_defaults() {
        let store = InMemoryConfigStore::new();
        assert_eq!(
            SceneSettings::load(&store.service()).unwrap(),
            SceneSettings::default()
        );
        assert_eq!(store.loads(), 1);
    }

    #[test]
    fn seeded_settings_are_loaded() {
        let seeded = SceneSettings {
            max_contacts: 4,
            ..SceneSettings::default()
        };
        let store = InMemoryConfigStore::with_settings(&seeded);
        assert_eq!(SceneSettings::load(&store.service()).unwrap(), seeded);
    }

    #[test]
    fn load_fault_is_not_masked_as_default() {
        let store = InMemoryConfigStore::new();
        store.inject(Fault::Load);
        assert!(matches!(
            SceneSettings::load(&store.service()),
            Err(ConfigError::Other(_))
        ));
    }

    #[test]
    fn failed_save_is_counted_but_not_stored() {
        let store = InMemoryConfigStore::new();
        store.inject(Fault::Save);
        assert!(SceneSettings::default().save(&store.service()).is_err());
        assert_eq!(store.saves(), 1);
        assert!(store.raw(SETTINGS_KEY).is_none());

        store.inject(Fault::None);
        SceneSettings::default().save(&store.service()).unwrap();
        assert!(store.raw(SETTINGS_KEY).is_some());
    }
}
