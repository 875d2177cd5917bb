// Copyright (c) 2026 radvd-fleet contributors
// SPDX-License-Identifier: AGPL-3.0

//! The per-router agent: an HTTP API over the local radvd instances.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::info;

use radvd_fleet_core::application::InstanceStore;
use radvd_fleet_core::infrastructure::{discover_instances, RadvdPaths, RadvdProcessManager};
use radvd_fleet_core::presentation::router;
use radvd_fleet_sdk::DEFAULT_PORT;

#[derive(Args)]
pub struct ServeArgs {
    /// Address to listen on
    #[arg(long, env = "RAFLEET_HOST", default_value = "::")]
    host: String,

    /// Port to listen on
    #[arg(long, env = "RAFLEET_PORT", default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Directory for managed per-instance config files
    #[arg(long, default_value = "/etc/radvd.d")]
    conf_dir: PathBuf,

    /// Directory for radvd PID files
    #[arg(long, default_value = "/var/run/radvd")]
    run_dir: PathBuf,

    /// Path to the radvd executable
    #[arg(long, default_value = "/usr/sbin/radvd")]
    radvd_bin: PathBuf,

    /// Path to the host-wide radvd config, exposed as instance 0
    #[arg(long, default_value = "/etc/radvd.conf")]
    host_conf: PathBuf,
}

pub async fn run(args: ServeArgs) -> Result<()> {
    let paths = RadvdPaths {
        conf_dir: args.conf_dir,
        run_dir: args.run_dir,
        binary: args.radvd_bin,
        host_conf: args.host_conf,
    };

    // Rebuild the in-memory view from whatever configs survived the last
    // run, so a restarted agent keeps managing its instances.
    let seed = discover_instances(&paths).await;
    info!(instances = seed.len(), "recovered instances from disk");

    let manager = Arc::new(RadvdProcessManager::new(paths));
    let store = Arc::new(InstanceStore::with_instances(manager, seed));
    let app = router(store);

    let addr = listen_addr(&args.host, args.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("Agent listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    info!("Agent shutting down");

    Ok(())
}

/// Bracket bare IPv6 literals so the address parses as host:port.
fn listen_addr(host: &str, port: u16) -> String {
    if host.contains(':') && !host.starts_with('[') {
        format!("[{}]:{}", host, port)
    } else {
        format!("{}:{}", host, port)
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        }
        _ = terminate => {
            info!("Received SIGTERM signal");
        }
    }
}
