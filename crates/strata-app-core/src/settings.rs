// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Scene settings shared by Strata tools.

use serde::{Deserialize, Serialize};
use strata_core::StoreOptions;
use strata_port::{CollisionRequest, MAX_OBJECTS};

use crate::config::{ConfigError, ConfigService, ConfigStore};

/// Config key under which [`SceneSettings`] are stored.
pub const SETTINGS_KEY: &str = "scene";

/// Tunables for scene stores, codecs, and collision queries.
///
/// Every field is defaulted, so a partial JSON document is valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneSettings {
    /// Largest number of world + attached entries a decoded message may carry.
    pub max_message_objects: usize,
    /// Warn when a layer chain grows deeper than this.
    pub chain_depth_warning: usize,
    /// Collect contact pairs in collision queries.
    pub contacts: bool,
    /// Upper bound on reported contacts.
    pub max_contacts: usize,
}

impl Default for SceneSettings {
    fn default() -> Self {
        Self {
            max_message_objects: MAX_OBJECTS,
            chain_depth_warning: StoreOptions::default().chain_depth_warning,
            contacts: false,
            max_contacts: 1,
        }
    }
}

impl SceneSettings {
    /// Options for a new [`strata_core::SceneStore`].
    pub fn store_options(&self) -> StoreOptions {
        StoreOptions {
            chain_depth_warning: self.chain_depth_warning,
        }
    }

    /// Collision request shaped by these settings.
    pub fn collision_request(&self) -> CollisionRequest {
        CollisionRequest {
            contacts: self.contacts,
            max_contacts: self.max_contacts.max(1),
        }
    }

    /// Load settings from `service`, falling back to defaults when absent.
    pub fn load<S: ConfigStore>(service: &ConfigService<S>) -> Result<Self, ConfigError> {
        service.load_or_default(SETTINGS_KEY)
    }

    /// Persist settings through `service`.
    pub fn save<S: ConfigStore>(&self, service: &ConfigService<S>) -> Result<(), ConfigError> {
        service.save(SETTINGS_KEY, self)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn partial_documents_fill_defaults() {
        let parsed: SceneSettings =
            serde_json::from_str(r#"{"chain_depth_warning": 8}"#).unwrap();
        assert_eq!(parsed.chain_depth_warning, 8);
        assert_eq!(parsed.max_message_objects, MAX_OBJECTS);
        assert_eq!(parsed.store_options().chain_depth_warning, 8);
    }

    #[test]
    fn collision_request_never_asks_for_zero_contacts() {
        let settings = SceneSettings {
            contacts: true,
            max_contacts: 0,
            ..SceneSettings::default()
        };
        let request = settings.collision_request();
        assert!(request.contacts);
        assert_eq!(request.max_contacts, 1);
    }
}
