// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! `strata inspect`.

use std::io::Write;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use comfy_table::Table;
use strata_app_core::settings::SceneSettings;
use strata_port::{is_empty, CollisionObjectMsg, ObjectOperation, SceneMsg, Shape};

/// Reads and decodes one message file under the configured object limit.
pub(crate) fn read_msg(path: &Path, settings: &SceneSettings) -> Result<SceneMsg> {
    let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    strata_codec::decode_scene_msg_with_limit(&bytes, settings.max_message_objects)
        .map_err(|err| anyhow!("decoding {}: {err}", path.display()))
}

fn shape_label(shape: Option<&Shape>) -> String {
    match shape {
        None => "-".into(),
        Some(Shape::Sphere { radius }) => format!("sphere r={radius}"),
        Some(Shape::Box { size: [x, y, z] }) => format!("box {x}x{y}x{z}"),
        Some(Shape::Cylinder { radius, length }) => format!("cylinder r={radius} l={length}"),
    }
}

fn op_label(object: &CollisionObjectMsg) -> &'static str {
    match object.operation {
        ObjectOperation::Add => "add",
        ObjectOperation::Remove => "remove",
    }
}

pub(crate) fn run(file: &Path, json: bool, settings: &SceneSettings) -> Result<()> {
    let msg = read_msg(file, settings)?;
    let mut out = std::io::stdout().lock();
    if json {
        serde_json::to_writer_pretty(&mut out, &msg)?;
        writeln!(out)?;
        return Ok(());
    }

    let robot = if msg.robot_name.is_empty() {
        "-"
    } else {
        msg.robot_name.as_str()
    };
    writeln!(out, "robot:   {robot}")?;
    writeln!(out, "kind:    {}", if msg.is_diff { "diff" } else { "full" })?;
    writeln!(out, "entries: {}", msg.len())?;
    writeln!(out, "empty:   {}", if is_empty(&msg) { "yes" } else { "no" })?;
    if msg.is_empty() {
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["section", "id", "op", "shape", "link"]);
    for object in &msg.world {
        table.add_row(vec![
            "world".to_owned(),
            object.id.clone(),
            op_label(object).to_owned(),
            shape_label(object.shape.as_ref()),
            String::new(),
        ]);
    }
    for attached in &msg.attached_objects {
        table.add_row(vec![
            "attached".to_owned(),
            attached.object.id.clone(),
            op_label(&attached.object).to_owned(),
            shape_label(attached.object.shape.as_ref()),
            attached.link_name.clone(),
        ]);
    }
    writeln!(out, "{table}")?;
    Ok(())
}
