// Copyright (c) 2026 radvd-fleet contributors
// SPDX-License-Identifier: AGPL-3.0

//! The authoritative set of instances on one router.
//!
//! A single mutex guards the collection; every check-then-act sequence
//! (existence check plus mutation plus the daemon side effects it implies)
//! runs inside one critical section, so two concurrent creates for the same
//! ID cannot both pass the conflict check.

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::warn;

use thiserror::Error;

use crate::application::lifecycle::{LifecycleError, RadvdLifecycle};
use crate::domain::instance::{Instance, HOST_INSTANCE_ID};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("instance {0} already exists")]
    Conflict(u32),
    #[error("instance {0} not found")]
    NotFound(u32),
    #[error("instance id in body ({body}) does not match path ({path})")]
    IdMismatch { path: u32, body: u32 },
    #[error("instance 0 is the host configuration and is not managed")]
    HostInstance,
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),
}

pub struct InstanceStore {
    instances: Mutex<BTreeMap<u32, Instance>>,
    lifecycle: Arc<dyn RadvdLifecycle>,
}

impl InstanceStore {
    pub fn new(lifecycle: Arc<dyn RadvdLifecycle>) -> Self {
        Self::with_instances(lifecycle, Vec::new())
    }

    /// Build a store seeded with instances discovered on disk at startup.
    pub fn with_instances(lifecycle: Arc<dyn RadvdLifecycle>, seed: Vec<Instance>) -> Self {
        let instances = seed.into_iter().map(|i| (i.id, i)).collect();
        Self {
            instances: Mutex::new(instances),
            lifecycle,
        }
    }

    /// Snapshot of all current instances, with each PID refreshed from its
    /// PID file. A PID that cannot be read is not an error for listing.
    pub async fn list(&self) -> Vec<Instance> {
        let mut instances = self.instances.lock().await;
        for (id, instance) in instances.iter_mut() {
            if let Some(pid) = self.lifecycle.read_pid(*id).await {
                instance.pid = pid;
            }
        }
        instances.values().cloned().collect()
    }

    pub async fn get(&self, id: u32) -> Result<Instance, StoreError> {
        let mut instances = self.instances.lock().await;
        let instance = instances.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        if let Some(pid) = self.lifecycle.read_pid(id).await {
            instance.pid = pid;
        }
        Ok(instance.clone())
    }

    /// Render, validate and start a new instance. On validation or start
    /// failure nothing is added and the rendered config does not survive:
    /// the on-disk state and the in-memory record never diverge.
    pub async fn create(&self, id: u32, spec: Instance) -> Result<(), StoreError> {
        if spec.id != id {
            return Err(StoreError::IdMismatch { path: id, body: spec.id });
        }
        if id == HOST_INSTANCE_ID {
            return Err(StoreError::HostInstance);
        }

        let mut instances = self.instances.lock().await;
        if instances.contains_key(&id) {
            return Err(StoreError::Conflict(id));
        }

        self.lifecycle.render(&spec).await?;
        if let Err(err) = self.lifecycle.validate(id).await {
            if let Err(discard) = self.lifecycle.discard_config(id).await {
                warn!(id, error = %discard, "failed to discard rejected config");
            }
            return Err(err.into());
        }
        // start() removes the rendered config itself when the spawn fails.
        self.lifecycle.start(id).await?;

        instances.insert(id, spec);
        Ok(())
    }

    /// Re-render the config in place and reload (not restart) the process.
    /// The in-memory record is replaced only after the reload succeeds.
    pub async fn update(&self, id: u32, spec: Instance) -> Result<(), StoreError> {
        if spec.id != id {
            return Err(StoreError::IdMismatch { path: id, body: spec.id });
        }
        if id == HOST_INSTANCE_ID {
            return Err(StoreError::HostInstance);
        }

        let mut instances = self.instances.lock().await;
        if !instances.contains_key(&id) {
            return Err(StoreError::NotFound(id));
        }

        self.lifecycle.render(&spec).await?;
        self.lifecycle.validate(id).await?;
        self.lifecycle.reload(id).await?;

        instances.insert(id, spec);
        Ok(())
    }

    /// Stop the process, remove both artifacts, drop the record.
    pub async fn delete(&self, id: u32) -> Result<(), StoreError> {
        if id == HOST_INSTANCE_ID {
            return Err(StoreError::HostInstance);
        }

        let mut instances = self.instances.lock().await;
        if !instances.contains_key(&id) {
            return Err(StoreError::NotFound(id));
        }
        self.lifecycle.stop(id).await?;
        instances.remove(&id);
        Ok(())
    }

    /// Tear down every managed instance. The host instance (ID 0) is listed
    /// but never stopped; it survives a fleet-wide teardown.
    pub async fn delete_all(&self) -> Result<(), StoreError> {
        let mut instances = self.instances.lock().await;
        for id in instances.keys().copied().collect::<Vec<_>>() {
            if id == HOST_INSTANCE_ID {
                continue;
            }
            self.lifecycle.stop_if_running(id).await?;
            instances.remove(&id);
        }
        Ok(())
    }
}
