// Copyright (c) 2026 radvd-fleet contributors
// SPDX-License-Identifier: AGPL-3.0

//! Offline policy operations, no agent required.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;

use radvd_fleet_core::domain::Policy;
use radvd_fleet_core::infrastructure::ConfigRenderer;

#[derive(Subcommand)]
pub enum PolicyCommand {
    /// Check a policy file for structural and referential errors
    Validate {
        /// Policy file to validate
        #[arg(short, long, value_name = "FILE")]
        file: PathBuf,
    },

    /// Compile a policy to per-instance radvd configs on disk
    Compile {
        /// Policy file to compile
        #[arg(short, long, value_name = "FILE")]
        file: PathBuf,

        /// Per-router default parameter file
        #[arg(long, value_name = "FILE")]
        params: PathBuf,

        /// Directory to write the rendered configs into
        #[arg(short, long, default_value = "./output")]
        output: PathBuf,
    },
}

pub async fn handle_command(command: PolicyCommand) -> Result<()> {
    match command {
        PolicyCommand::Validate { file } => validate(file).await,
        PolicyCommand::Compile {
            file,
            params,
            output,
        } => compile_to_dir(file, params, output).await,
    }
}

async fn validate(file: PathBuf) -> Result<()> {
    let text = tokio::fs::read_to_string(&file)
        .await
        .with_context(|| format!("Failed to read policy file {}", file.display()))?;

    match Policy::from_yaml(&text) {
        Ok(policy) => {
            println!(
                "{} {} rules, {} groups",
                "Policy is valid:".green().bold(),
                policy.rules.len(),
                policy.groups.len()
            );
            Ok(())
        }
        Err(err) => {
            eprintln!("{}", "Policy is invalid:".red().bold());
            eprintln!("{err}");
            anyhow::bail!("validation failed");
        }
    }
}

async fn compile_to_dir(file: PathBuf, params: PathBuf, output: PathBuf) -> Result<()> {
    let instances = super::compile_policy(&file, &params).await?;

    tokio::fs::create_dir_all(&output)
        .await
        .with_context(|| format!("Failed to create output directory {}", output.display()))?;

    let renderer = ConfigRenderer::new();
    for instance in &instances {
        let rendered = renderer
            .render(instance)
            .with_context(|| format!("Failed to render instance {}", instance.id))?;
        let path = output.join(format!("{}.conf", instance.id));
        tokio::fs::write(&path, rendered)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!(
            "  {} instance {} ({}) -> {}",
            "compiled".green(),
            instance.id,
            instance.router_id,
            path.display()
        );
    }

    println!(
        "{} {} instances written to {}",
        "Done:".green().bold(),
        instances.len(),
        output.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const POLICY: &str = r#"
rules:
  - id: 1
    description: lab prefixes
    type: Prefixes
    prefixes:
      - "2001:db8:1::/64"
    nexthop: "2001:db8::1"
groups:
  - id: 1
    description: lab
    rules: [1]
    members:
      - "2001:db8::100"
"#;

    const PARAMS: &str = r#"
routers:
  - router_id: "2001:db8::1"
    name: eth0
"#;

    #[tokio::test]
    async fn compile_writes_one_config_per_instance() {
        let dir = tempfile::tempdir().unwrap();
        let policy_path = dir.path().join("policy.yaml");
        let params_path = dir.path().join("params.yaml");
        let out = dir.path().join("out");
        std::fs::write(&policy_path, POLICY).unwrap();
        std::fs::write(&params_path, PARAMS).unwrap();

        compile_to_dir(policy_path, params_path, out.clone())
            .await
            .unwrap();

        let rendered = std::fs::read_to_string(out.join("1.conf")).unwrap();
        assert!(rendered.contains("interface eth0"));
        assert!(rendered.contains("2001:db8:1::/64"));
    }

    #[tokio::test]
    async fn invalid_policy_fails_validation() {
        let dir = tempfile::tempdir().unwrap();
        let policy_path = dir.path().join("policy.yaml");
        std::fs::write(&policy_path, "rules:\n  - id: 0\n").unwrap();

        assert!(validate(policy_path).await.is_err());
    }
}
