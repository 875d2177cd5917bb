// Copyright (c) 2026 radvd-fleet contributors
// SPDX-License-Identifier: AGPL-3.0

//! Fans an operation out across every router a compiled instance set
//! touches.
//!
//! Apply and update run two nested levels of tasks: one per router, each
//! spawning one per owned instance. The failure domains are independent: a
//! failed instance push is logged and reported, but never cancels its
//! siblings or another router's sub-tree. Teardown is the opposite,
//! sequential and fail-fast, so a skipped router is visible immediately
//! during the rare operator-triggered cleanup.

use std::collections::{BTreeMap, HashMap};

use radvd_fleet_core::domain::instance::Instance;
use tracing::{error, info};

use crate::client::{ClientError, RouterClient};

/// Which single-instance operation an apply pass performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOp {
    Create,
    Update,
}

/// Outcome of one instance push.
#[derive(Debug, Clone)]
pub struct InstanceOutcome {
    pub id: u32,
    pub error: Option<String>,
}

/// Per-router outcomes of an apply or update pass.
#[derive(Debug, Default)]
pub struct ApplyReport {
    pub routers: BTreeMap<String, Vec<InstanceOutcome>>,
}

impl ApplyReport {
    pub fn failures(&self) -> usize {
        self.routers
            .values()
            .flatten()
            .filter(|o| o.error.is_some())
            .count()
    }

    pub fn is_success(&self) -> bool {
        self.failures() == 0
    }
}

/// Per-router listing, or the error that prevented it.
#[derive(Debug, Default)]
pub struct StatusReport {
    pub routers: BTreeMap<String, Result<Vec<Instance>, String>>,
}

/// Drives an operation against every router referenced by a compiled
/// instance set.
pub struct FleetClient {
    port: u16,
    endpoints: HashMap<String, String>,
}

impl FleetClient {
    pub fn new(port: u16) -> Self {
        Self {
            port,
            endpoints: HashMap::new(),
        }
    }

    /// Pin a router ID to an explicit base URL instead of the derived
    /// `http://[router]:port` form. Used by tests and split-horizon setups.
    pub fn with_endpoint(mut self, router_id: impl Into<String>, base_url: impl Into<String>) -> Self {
        self.endpoints.insert(router_id.into(), base_url.into());
        self
    }

    fn client_for(&self, router_id: &str) -> RouterClient {
        match self.endpoints.get(router_id) {
            Some(base_url) => RouterClient::new(base_url.clone()),
            None => RouterClient::for_router(router_id, self.port),
        }
    }

    /// Push every instance to its owning router, creates or updates
    /// depending on `op`. Fail-soft: every failure is logged and recorded,
    /// nothing is cancelled, already-pushed instances are not rolled back.
    pub async fn apply(&self, instances: &[Instance], op: PushOp) -> ApplyReport {
        let mut router_tasks = Vec::new();

        for (router_id, owned) in group_by_router(instances) {
            let client = self.client_for(&router_id);
            router_tasks.push(tokio::spawn(async move {
                let mut instance_tasks = Vec::new();
                for instance in owned {
                    let client = client.clone();
                    let router_id = router_id.clone();
                    instance_tasks.push(tokio::spawn(async move {
                        let id = instance.id;
                        let result = match op {
                            PushOp::Create => client.create(&instance).await,
                            PushOp::Update => client.update(&instance).await,
                        };
                        match &result {
                            Ok(()) => info!(router = %router_id, id, "instance pushed"),
                            Err(err) => {
                                error!(router = %router_id, id, %err, "instance push failed")
                            }
                        }
                        InstanceOutcome {
                            id,
                            error: result.err().map(|e| e.to_string()),
                        }
                    }));
                }

                let mut outcomes = Vec::new();
                for task in instance_tasks {
                    match task.await {
                        Ok(outcome) => outcomes.push(outcome),
                        Err(err) => error!(%err, "instance task panicked"),
                    }
                }
                outcomes.sort_by_key(|o| o.id);
                (router_id, outcomes)
            }));
        }

        let mut report = ApplyReport::default();
        for task in router_tasks {
            match task.await {
                Ok((router_id, outcomes)) => {
                    report.routers.insert(router_id, outcomes);
                }
                Err(err) => error!(%err, "router task panicked"),
            }
        }
        report
    }

    /// Read-only listing of every router, sequential, failures recorded
    /// per router.
    pub async fn status(&self, routers: &[String]) -> StatusReport {
        let mut report = StatusReport::default();
        for router_id in routers {
            let result = self
                .client_for(router_id)
                .list()
                .await
                .map_err(|e| e.to_string());
            if let Err(err) = &result {
                error!(router = %router_id, %err, "status query failed");
            }
            report.routers.insert(router_id.clone(), result);
        }
        report
    }

    /// Tear down every managed instance on every router. Sequential and
    /// fail-fast: the first failing router aborts the remainder.
    pub async fn teardown(&self, routers: &[String]) -> Result<(), ClientError> {
        for router_id in routers {
            self.client_for(router_id).delete_all().await?;
            info!(router = %router_id, "router torn down");
        }
        Ok(())
    }
}

/// Group compiled instances by owning router, deterministically ordered.
pub fn group_by_router(instances: &[Instance]) -> BTreeMap<String, Vec<Instance>> {
    let mut groups: BTreeMap<String, Vec<Instance>> = BTreeMap::new();
    for instance in instances {
        groups
            .entry(instance.router_id.clone())
            .or_default()
            .push(instance.clone());
    }
    groups
}

/// The distinct routers a compiled instance set touches, in deterministic
/// order.
pub fn routers_of(instances: &[Instance]) -> Vec<String> {
    group_by_router(instances).into_keys().collect()
}
