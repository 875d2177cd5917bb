// Copyright (c) 2026 radvd-fleet contributors
// SPDX-License-Identifier: AGPL-3.0

//! Reads already-rendered radvd configs back into instances.
//!
//! On startup the router agent rebuilds its instance set from disk: the
//! host-wide config becomes the synthetic instance 0 and every numeric
//! `<id>.conf` under the managed directory becomes a managed instance.
//! Together with the PID files this is what lets the manager restart
//! without losing control of running daemons.

use tracing::warn;

use crate::domain::instance::{Instance, Prefix, Rdnss, Route, HOST_INSTANCE_ID};
use crate::infrastructure::radvd::RadvdPaths;

/// Parse the subset of radvd.conf syntax the renderer emits.
///
/// Line-oriented and forgiving: unknown statements are skipped, a block
/// close commits whichever sub-record is open.
pub fn parse_config(text: &str, id: u32) -> Instance {
    let mut instance = Instance { id, ..Instance::default() };
    let mut prefix: Option<Prefix> = None;
    let mut rdnss: Option<Rdnss> = None;
    let mut route: Option<Route> = None;

    let mut lines = text.lines();
    while let Some(raw) = lines.next() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((keyword, rest)) = split_statement(line) else {
            if line == "};" {
                if let Some(p) = prefix.take() {
                    instance.prefixes.push(p);
                }
                if let Some(r) = rdnss.take() {
                    instance.rdnss.push(r);
                }
                if let Some(r) = route.take() {
                    instance.routes.push(r);
                }
            }
            continue;
        };

        match keyword {
            "interface" => instance.name = rest.to_string(),
            "AdvSendAdvert" => instance.adv_send_advert = parse_flag(rest),
            "MinRtrAdvInterval" => instance.min_rtr_adv_interval = parse_number(rest),
            "MaxRtrAdvInterval" => instance.max_rtr_adv_interval = parse_number(rest),
            "AdvManagedFlag" => instance.adv_managed_flag = parse_flag(rest),
            "AdvOtherConfigFlag" => instance.adv_other_config_flag = parse_flag(rest),
            "AdvDefaultLifetime" => instance.adv_default_lifetime = parse_number(rest),
            "AdvDefaultPreference" => instance.adv_default_preference = rest.to_string(),
            "prefix" => prefix = Some(Prefix { prefix: rest.to_string(), ..Prefix::default() }),
            "AdvOnLink" => {
                if let Some(p) = prefix.as_mut() {
                    p.adv_on_link = parse_flag(rest);
                }
            }
            "AdvAutonomous" => {
                if let Some(p) = prefix.as_mut() {
                    p.adv_autonomous = parse_flag(rest);
                }
            }
            "AdvRouterAddr" => {
                if let Some(p) = prefix.as_mut() {
                    p.adv_router_addr = parse_flag(rest);
                }
            }
            "AdvValidLifetime" => {
                if let Some(p) = prefix.as_mut() {
                    p.adv_valid_lifetime = parse_number(rest);
                }
            }
            "RDNSS" => rdnss = Some(Rdnss { address: rest.to_string(), ..Rdnss::default() }),
            "AdvRDNSSLifetime" => {
                if let Some(r) = rdnss.as_mut() {
                    r.adv_rdnss_lifetime = parse_number(rest);
                }
            }
            "route" => route = Some(Route { route: rest.to_string(), ..Route::default() }),
            "AdvRouteLifetime" => {
                if let Some(r) = route.as_mut() {
                    r.adv_route_lifetime = parse_number(rest);
                }
            }
            "AdvRoutePreference" => {
                if let Some(r) = route.as_mut() {
                    r.adv_route_preference = rest.to_string();
                }
            }
            "clients" => {
                for client_line in lines.by_ref() {
                    let client = client_line.trim();
                    if client == "};" {
                        break;
                    }
                    instance
                        .clients
                        .push(client.trim_end_matches(';').to_string());
                }
            }
            _ => {}
        }
    }

    instance
}

/// Seed instances from disk: the host config as instance 0, then every
/// `<id>.conf` under the managed conf dir. Missing files and unparsable
/// names are skipped with a warning, never fatal.
pub async fn discover_instances(paths: &RadvdPaths) -> Vec<Instance> {
    let mut instances = Vec::new();

    match tokio::fs::read_to_string(&paths.host_conf).await {
        Ok(text) => instances.push(parse_config(&text, HOST_INSTANCE_ID)),
        Err(err) => warn!(path = %paths.host_conf.display(), %err, "no host radvd.conf"),
    }

    let mut entries = match tokio::fs::read_dir(&paths.conf_dir).await {
        Ok(entries) => entries,
        Err(_) => return instances,
    };
    let mut managed = Vec::new();
    while let Ok(Some(entry)) = entries.next_entry().await {
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("conf") {
            continue;
        }
        let id = match path
            .file_stem()
            .and_then(|s| s.to_str())
            .and_then(|s| s.parse::<u32>().ok())
        {
            Some(id) => id,
            None => {
                warn!(path = %path.display(), "config file name is not an instance id");
                continue;
            }
        };
        match tokio::fs::read_to_string(&path).await {
            Ok(text) => managed.push(parse_config(&text, id)),
            Err(err) => warn!(path = %path.display(), %err, "failed to read config"),
        }
    }
    // Directory order is arbitrary; keep discovery deterministic.
    managed.sort_by_key(|i| i.id);
    instances.extend(managed);

    instances
}

fn split_statement(line: &str) -> Option<(&str, &str)> {
    let (keyword, rest) = line.split_once(char::is_whitespace)?;
    let rest = rest
        .trim()
        .trim_end_matches('{')
        .trim()
        .trim_end_matches(';');
    Some((keyword, rest))
}

fn parse_flag(value: &str) -> bool {
    matches!(value, "on" | "yes" | "true")
}

fn parse_number(value: &str) -> u32 {
    value.parse().unwrap_or_default()
}
