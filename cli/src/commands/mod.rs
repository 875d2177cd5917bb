// Copyright (c) 2026 radvd-fleet contributors
// SPDX-License-Identifier: AGPL-3.0

pub mod fleet;
pub mod policy;
pub mod serve;

use std::path::Path;

use anyhow::{Context, Result};
use radvd_fleet_core::application::compile;
use radvd_fleet_core::domain::{DefaultParams, Instance, Policy};

/// Load, validate and compile a policy against a parameter file. Shared by
/// the offline `policy compile` path and every `fleet` subcommand.
pub(crate) async fn compile_policy(policy_path: &Path, params_path: &Path) -> Result<Vec<Instance>> {
    let policy_text = tokio::fs::read_to_string(policy_path)
        .await
        .with_context(|| format!("Failed to read policy file {}", policy_path.display()))?;
    let policy = Policy::from_yaml(&policy_text)
        .with_context(|| format!("Invalid policy file {}", policy_path.display()))?;

    let params_text = tokio::fs::read_to_string(params_path)
        .await
        .with_context(|| format!("Failed to read parameter file {}", params_path.display()))?;
    let params = DefaultParams::from_yaml(&params_text)
        .with_context(|| format!("Invalid parameter file {}", params_path.display()))?;

    let instances = compile(&policy, &params).context("Policy compilation failed")?;
    Ok(instances)
}
