// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! `strata settings`.

use std::io::Write;

use anyhow::{bail, Result};
use strata_app_core::config::{ConfigService, ConfigStore};
use strata_app_core::settings::{SceneSettings, SETTINGS_KEY};
use strata_config_fs::FsConfigStore;

pub(crate) fn show(settings: &SceneSettings) -> Result<()> {
    let mut out = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut out, settings)?;
    writeln!(out)?;
    Ok(())
}

pub(crate) fn init(service: &ConfigService<FsConfigStore>, force: bool) -> Result<()> {
    let path = service.store().path_for(SETTINGS_KEY);
    if !force && service.store().load_raw(SETTINGS_KEY).is_ok() {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }
    SceneSettings::default().save(service)?;
    writeln!(std::io::stdout().lock(), "wrote {}", path.display())?;
    Ok(())
}
