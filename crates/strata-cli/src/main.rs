// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! `strata`: inspect and replay encoded scene messages.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use strata_app_core::config::ConfigService;
use strata_app_core::settings::SceneSettings;
use strata_config_fs::FsConfigStore;
use tracing_subscriber::EnvFilter;

mod inspect;
mod replay;
mod settings;

#[derive(Parser, Debug)]
#[command(author, version, about = "Strata scene message tool")]
struct Args {
    /// Config directory (defaults to the platform config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Summarize one encoded scene message
    Inspect {
        /// CBOR-encoded scene message
        file: PathBuf,
        /// Print the decoded message as JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Apply messages in order to a fresh scene and print the result
    Replay {
        /// CBOR-encoded scene messages, applied first to last
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Derive a new layer for every message after the first
        #[arg(long)]
        branch: bool,
        /// Write the resulting full message here
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Show or initialize scene settings
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
}

#[derive(Subcommand, Debug)]
enum SettingsAction {
    /// Print effective settings as JSON
    Show,
    /// Write default settings
    Init {
        /// Overwrite existing settings
        #[arg(long)]
        force: bool,
    },
}

fn config_service(dir: Option<PathBuf>) -> Result<ConfigService<FsConfigStore>> {
    let store = match dir {
        Some(dir) => FsConfigStore::with_base(&dir)
            .with_context(|| format!("opening config dir {}", dir.display()))?,
        None => FsConfigStore::new().context("opening platform config dir")?,
    };
    Ok(ConfigService::new(store))
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let service = config_service(args.config)?;
    let load = || SceneSettings::load(&service).context("loading scene settings");

    match args.cmd {
        Command::Inspect { file, json } => inspect::run(&file, json, &load()?),
        Command::Replay { files, branch, out } => {
            replay::run(&files, branch, out.as_deref(), &load()?)
        }
        Command::Settings { action } => match action {
            SettingsAction::Show => settings::show(&load()?),
            // Runs without loading so a broken file can be replaced.
            SettingsAction::Init { force } => settings::init(&service, force),
        },
    }
}
