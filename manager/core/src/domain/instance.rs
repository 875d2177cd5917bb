// Copyright (c) 2026 radvd-fleet contributors
// SPDX-License-Identifier: AGPL-3.0

//! The compiled unit pushed to a router: one radvd configuration plus the
//! process that advertises it.

use serde::{Deserialize, Serialize};

/// Instance 0 stands for the host-wide `/etc/radvd.conf` that exists before
/// the manager ever runs. It is listed but never started, reloaded or
/// stopped by the fleet.
pub const HOST_INSTANCE_ID: u32 = 0;

/// One radvd daemon configuration and process, identified by an ID unique
/// per router.
///
/// Every field carries a serde default so partial parameter files and POST
/// bodies deserialize cleanly. `pid` is runtime-only: it is refreshed from
/// the on-disk PID file whenever the instance is listed and is never
/// authoritative in memory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Instance {
    pub id: u32,
    pub pid: u32,
    pub router_id: String,
    pub name: String,
    pub adv_send_advert: bool,
    pub min_rtr_adv_interval: u32,
    pub max_rtr_adv_interval: u32,
    pub adv_managed_flag: bool,
    pub adv_other_config_flag: bool,
    pub adv_default_lifetime: u32,
    pub adv_default_preference: String,
    pub prefixes: Vec<Prefix>,
    pub rdnss: Vec<Rdnss>,
    pub routes: Vec<Route>,
    pub clients: Vec<String>,
}

/// An advertised on-link prefix.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Prefix {
    pub prefix: String,
    pub adv_on_link: bool,
    pub adv_autonomous: bool,
    pub adv_router_addr: bool,
    pub adv_valid_lifetime: u32,
}

/// A recursive DNS server record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rdnss {
    pub address: String,
    pub adv_rdnss_lifetime: u32,
}

/// A more-specific route advertised alongside the RA.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Route {
    pub route: String,
    pub adv_route_lifetime: u32,
    pub adv_route_preference: String,
}
