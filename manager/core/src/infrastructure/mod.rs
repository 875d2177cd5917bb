// Copyright (c) 2026 radvd-fleet contributors
// SPDX-License-Identifier: AGPL-3.0

pub mod conf;
pub mod radvd;
pub mod render;

pub use conf::discover_instances;
pub use radvd::{RadvdPaths, RadvdProcessManager};
pub use render::ConfigRenderer;
