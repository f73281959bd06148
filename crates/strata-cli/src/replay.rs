// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! `strata replay`.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use strata_app_core::settings::SceneSettings;
use strata_core::{LayerId, SceneStore};
use strata_port::{KinematicModel, Pose, SemanticModel};
use tracing::{debug, info};

use crate::inspect::read_msg;

pub(crate) fn run(
    files: &[PathBuf],
    branch: bool,
    out: Option<&Path>,
    settings: &SceneSettings,
) -> Result<()> {
    let mut store = SceneStore::with_options(settings.store_options());
    let root = store.create_root();
    let mut layer = root;
    for (i, file) in files.iter().enumerate() {
        let msg = read_msg(file, settings)?;
        if !msg.robot_name.is_empty() && !store.is_configured(root)? {
            bind_named_robot(&mut store, root, &msg.robot_name)?;
        }
        if branch && i > 0 {
            layer = store.diff(layer)?;
        }
        store
            .apply_msg(layer, &msg)
            .with_context(|| format!("applying {}", file.display()))?;
        info!(file = %file.display(), entries = msg.len(), is_diff = msg.is_diff, "applied");
    }

    let mut world: Vec<String> = store
        .world(layer)?
        .ids()
        .iter()
        .map(ToString::to_string)
        .collect();
    world.sort();
    let mut attached: Vec<String> = store
        .attached(layer)?
        .ids()
        .iter()
        .map(ToString::to_string)
        .collect();
    attached.sort();

    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "layers:   {}", store.depth(layer)? + 1)?;
    writeln!(stdout, "world:    {}", world.join(", "))?;
    writeln!(stdout, "attached: {}", attached.join(", "))?;

    if let Some(path) = out {
        if !store.is_configured(layer)? {
            bail!("no message names a robot; cannot write {}", path.display());
        }
        let full = store.full_msg(layer)?;
        let bytes = strata_codec::encode_scene_msg(&full).map_err(|err| anyhow!("{err}"))?;
        std::fs::write(path, bytes).with_context(|| format!("writing {}", path.display()))?;
        writeln!(stdout, "wrote:    {}", path.display())?;
    }
    Ok(())
}

/// Stand-in robot for replays: only the name and a fixed world root link.
struct NamedRobot {
    name: String,
}

const ROOT_LINK: &str = "world";

impl KinematicModel for NamedRobot {
    fn name(&self) -> &str {
        &self.name
    }

    fn root_link(&self) -> &str {
        ROOT_LINK
    }

    fn has_link(&self, link: &str) -> bool {
        link == ROOT_LINK
    }

    fn link_pose(&self, link: &str) -> Option<Pose> {
        (link == ROOT_LINK).then(Pose::identity)
    }
}

fn bind_named_robot(store: &mut SceneStore, root: LayerId, name: &str) -> Result<()> {
    debug!(robot = name, "binding replay root");
    let kinematics = Arc::new(NamedRobot {
        name: name.to_owned(),
    });
    let semantic = Arc::new(SemanticModel {
        name: name.to_owned(),
        ..SemanticModel::default()
    });
    store.configure(root, kinematics, semantic)?;
    Ok(())
}
