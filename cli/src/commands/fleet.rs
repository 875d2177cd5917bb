// Copyright (c) 2026 radvd-fleet contributors
// SPDX-License-Identifier: AGPL-3.0

//! Fleet-wide operations: compile a policy locally, then drive every
//! referenced router's agent over HTTP.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use colored::Colorize;

use radvd_fleet_sdk::{routers_of, ApplyReport, FleetClient, PushOp, DEFAULT_PORT};

#[derive(Args)]
pub struct FleetArgs {
    /// Policy file to compile and push
    #[arg(short, long, value_name = "FILE")]
    file: PathBuf,

    /// Per-router default parameter file
    #[arg(long, value_name = "FILE")]
    params: PathBuf,

    /// Agent port on every router
    #[arg(long, default_value_t = DEFAULT_PORT)]
    port: u16,
}

#[derive(Subcommand)]
pub enum FleetCommand {
    /// Create the compiled instances on their routers
    Apply(FleetArgs),

    /// Replace existing instances with the compiled ones
    Update(FleetArgs),

    /// List what every referenced router is currently advertising
    Status(FleetArgs),

    /// Remove every managed instance from every referenced router
    Teardown(FleetArgs),
}

pub async fn handle_command(command: FleetCommand) -> Result<()> {
    match command {
        FleetCommand::Apply(args) => push(args, PushOp::Create).await,
        FleetCommand::Update(args) => push(args, PushOp::Update).await,
        FleetCommand::Status(args) => status(args).await,
        FleetCommand::Teardown(args) => teardown(args).await,
    }
}

async fn push(args: FleetArgs, op: PushOp) -> Result<()> {
    let instances = super::compile_policy(&args.file, &args.params).await?;
    let client = FleetClient::new(args.port);

    let report = client.apply(&instances, op).await;
    print_report(&report);

    if !report.is_success() {
        anyhow::bail!("{} instance(s) failed", report.failures());
    }
    println!(
        "{} {} instances on {} router(s)",
        push_summary(op).green().bold(),
        instances.len(),
        report.routers.len()
    );
    Ok(())
}

async fn status(args: FleetArgs) -> Result<()> {
    let instances = super::compile_policy(&args.file, &args.params).await?;
    let routers = routers_of(&instances);
    let client = FleetClient::new(args.port);

    let report = client.status(&routers).await;
    let mut unreachable = 0;
    for (router_id, result) in &report.routers {
        match result {
            Ok(listed) => {
                println!("{} {}", "router".bold(), router_id);
                for instance in listed {
                    let pid = if instance.pid == 0 {
                        "-".to_string()
                    } else {
                        instance.pid.to_string()
                    };
                    println!(
                        "  {:>4}  {:<12} pid {:<8} {} prefix(es)",
                        instance.id,
                        instance.name,
                        pid,
                        instance.prefixes.len()
                    );
                }
            }
            Err(err) => {
                unreachable += 1;
                println!("{} {} {}", "router".bold(), router_id, "unreachable".red());
                println!("  {err}");
            }
        }
    }

    if unreachable > 0 {
        anyhow::bail!("{unreachable} router(s) unreachable");
    }
    Ok(())
}

async fn teardown(args: FleetArgs) -> Result<()> {
    let instances = super::compile_policy(&args.file, &args.params).await?;
    let routers = routers_of(&instances);
    let client = FleetClient::new(args.port);

    client
        .teardown(&routers)
        .await
        .context("Teardown aborted, remaining routers untouched")?;

    println!(
        "{} {} router(s) cleared",
        "Teardown complete:".green().bold(),
        routers.len()
    );
    Ok(())
}

fn push_summary(op: PushOp) -> &'static str {
    match op {
        PushOp::Create => "Applied:",
        PushOp::Update => "Updated:",
    }
}

fn print_report(report: &ApplyReport) {
    for (router_id, outcomes) in &report.routers {
        println!("{} {}", "router".bold(), router_id);
        for outcome in outcomes {
            match &outcome.error {
                None => println!("  {:>4}  {}", outcome.id, "ok".green()),
                Some(err) => println!("  {:>4}  {} {}", outcome.id, "failed:".red(), err),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_names_the_operation() {
        assert_eq!(push_summary(PushOp::Create), "Applied:");
        assert_eq!(push_summary(PushOp::Update), "Updated:");
    }
}
