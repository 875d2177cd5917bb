// Copyright (c) 2026 radvd-fleet contributors
// SPDX-License-Identifier: AGPL-3.0

//! Translates a validated policy into per-router instance specifications.
//!
//! Compilation is pure and deterministic: the same policy and parameter
//! table always produce the same instance list, in rule order. Any malformed
//! rule aborts the whole compile; no partial instance set is ever returned.

use thiserror::Error;

use crate::domain::instance::{Instance, Route};
use crate::domain::params::DefaultParams;
use crate::domain::policy::{Policy, RuleType, DEFAULT_ROUTE};

/// Lifetime advertised for every non-default route, in seconds.
pub const ADV_ROUTE_LIFETIME: u32 = 1800;
/// Preference advertised for every non-default route.
pub const ADV_ROUTE_PREFERENCE: &str = "medium";
/// Default-router preference advertised by a default-route instance.
pub const DEFAULT_ROUTE_PREFERENCE: &str = "high";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CompileError {
    #[error("rule {rule}: invalid rule type or prefix list")]
    InvalidRuleType { rule: u32 },
    #[error("rule {rule}: no default parameters for router {nexthop}")]
    UnknownRouter { rule: u32, nexthop: String },
}

/// Compile `policy` into one instance per rule, seeded from the per-router
/// parameter table.
///
/// A rule whose sole prefix is `::/0` marks its router as preferred default
/// gateway and contributes no routes; every other prefix rule contributes
/// one route per prefix. Group members are then fanned in to the client
/// lists of every instance their group references, in group-then-member
/// order, duplicates tolerated.
pub fn compile(policy: &Policy, params: &DefaultParams) -> Result<Vec<Instance>, CompileError> {
    let mut instances = Vec::with_capacity(policy.rules.len());

    for rule in &policy.rules {
        let seed = params
            .for_router(&rule.nexthop)
            .ok_or_else(|| CompileError::UnknownRouter {
                rule: rule.id,
                nexthop: rule.nexthop.clone(),
            })?;
        let mut instance = seed.clone();
        instance.id = rule.id;
        instance.router_id = rule.nexthop.clone();

        let has_default_route = rule.prefixes.iter().any(|p| p == DEFAULT_ROUTE);
        if rule.rule_type == RuleType::Prefixes && !has_default_route && !rule.prefixes.is_empty()
        {
            for prefix in &rule.prefixes {
                instance.routes.push(Route {
                    route: prefix.clone(),
                    adv_route_lifetime: ADV_ROUTE_LIFETIME,
                    adv_route_preference: ADV_ROUTE_PREFERENCE.to_string(),
                });
            }
        } else if rule.rule_type == RuleType::Prefixes && rule.is_default_route() {
            instance.adv_default_preference = DEFAULT_ROUTE_PREFERENCE.to_string();
        } else {
            return Err(CompileError::InvalidRuleType { rule: rule.id });
        }

        instances.push(instance);
    }

    for group in &policy.groups {
        for rule_id in &group.rules {
            if let Some(instance) = instances.iter_mut().find(|i| i.id == *rule_id) {
                instance.clients.extend(group.members.iter().cloned());
            }
        }
    }

    Ok(instances)
}
