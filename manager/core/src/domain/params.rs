// Copyright (c) 2026 radvd-fleet contributors
// SPDX-License-Identifier: AGPL-3.0

//! Per-router default RA parameters.
//!
//! The parameter file carries one seed instance per managed router, keyed by
//! `router_id`. The compiler clones the seed and overlays the rule-derived
//! fields on top of it.

use serde::{Deserialize, Serialize};

use crate::domain::instance::Instance;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultParams {
    pub routers: Vec<Instance>,
}

impl DefaultParams {
    pub fn from_yaml(text: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(text)
    }

    /// Seed parameters for the router that owns `router_id`, if any.
    pub fn for_router(&self, router_id: &str) -> Option<&Instance> {
        self.routers.iter().find(|r| r.router_id == router_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_parameter_files_deserialize() {
        let doc = r#"
routers:
  - router_id: "fd00::1"
    name: eth0
    adv_send_advert: true
    min_rtr_adv_interval: 3
    max_rtr_adv_interval: 10
    adv_default_lifetime: 30
    adv_default_preference: medium
"#;
        let params = DefaultParams::from_yaml(doc).unwrap();
        let seed = params.for_router("fd00::1").unwrap();
        assert_eq!(seed.name, "eth0");
        assert!(seed.adv_send_advert);
        assert_eq!(seed.adv_default_preference, "medium");
        assert!(seed.routes.is_empty());
        assert!(params.for_router("fd00::2").is_none());
    }
}
