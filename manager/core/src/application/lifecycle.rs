// Copyright (c) 2026 radvd-fleet contributors
// SPDX-License-Identifier: AGPL-3.0

//! The seam between the instance store and the radvd process underneath it.
//!
//! The store drives the daemon exclusively through this trait, so tests can
//! substitute a recording fake and the REST layer never touches processes or
//! files directly.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::instance::Instance;

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("config rendering failed for instance {id}: {reason}")]
    Render { id: u32, reason: String },
    #[error("radvd rejected the config for instance {id}")]
    InvalidConfig { id: u32 },
    #[error("failed to spawn radvd for instance {id}: {source}")]
    Spawn {
        id: u32,
        #[source]
        source: std::io::Error,
    },
    #[error("radvd exited during startup for instance {id} ({status})")]
    StartFailed { id: u32, status: String },
    #[error("no running radvd process for instance {id}")]
    ProcessNotFound { id: u32 },
    #[error("failed to signal radvd for instance {id}: {source}")]
    SignalFailed {
        id: u32,
        #[source]
        source: std::io::Error,
    },
    #[error("i/o error for instance {id}: {source}")]
    Io {
        id: u32,
        #[source]
        source: std::io::Error,
    },
}

/// Per-instance daemon control. State machine per instance:
/// absent → config written → validated → running → (reloading → running)
/// → stopped → absent.
#[async_trait]
pub trait RadvdLifecycle: Send + Sync {
    /// Write the instance's rendered config to its ID-keyed path. Leaves no
    /// process side effect on failure.
    async fn render(&self, instance: &Instance) -> Result<(), LifecycleError>;

    /// Run the daemon's built-in config check against the rendered file.
    /// The caller discards the file when this fails.
    async fn validate(&self, id: u32) -> Result<(), LifecycleError>;

    /// Spawn the daemon against the rendered config and an ID-keyed PID
    /// file. The rendered config is removed on failure so no orphaned
    /// config survives without a process.
    async fn start(&self, id: u32) -> Result<(), LifecycleError>;

    /// Re-read the PID file and ask the running process to reload its
    /// config in place.
    async fn reload(&self, id: u32) -> Result<(), LifecycleError>;

    /// Terminate the process and remove both artifacts. A missing PID file
    /// is an error here: the caller claims the instance is running.
    async fn stop(&self, id: u32) -> Result<(), LifecycleError>;

    /// Bulk-cleanup variant of [`stop`](Self::stop): a missing PID file
    /// means already-stopped, not failure.
    async fn stop_if_running(&self, id: u32) -> Result<(), LifecycleError>;

    /// Remove the rendered config file if present.
    async fn discard_config(&self, id: u32) -> Result<(), LifecycleError>;

    /// Best-effort read of the instance's live PID from its PID file.
    async fn read_pid(&self, id: u32) -> Option<u32>;
}
