// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Shared application services for Strata tools (config, scene settings).
//! Keeps CLI and service adapters thin and storage-agnostic.

pub mod config;
pub mod settings;
