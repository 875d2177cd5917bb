// Copyright (c) 2026 radvd-fleet contributors
// SPDX-License-Identifier: AGPL-3.0

//! Renders an [`Instance`] into radvd.conf text.
//!
//! Handlebars with a single `onoff` helper, since radvd spells booleans as
//! `on`/`off`. The template is embedded; the file layout it produces is the
//! same subset of radvd.conf syntax the startup parser reads back.

use handlebars::{handlebars_helper, Handlebars};

use crate::domain::instance::Instance;

const RADVD_TEMPLATE: &str = r#"interface {{name}} {
    AdvSendAdvert {{onoff adv_send_advert}};
    MinRtrAdvInterval {{min_rtr_adv_interval}};
    MaxRtrAdvInterval {{max_rtr_adv_interval}};
    AdvManagedFlag {{onoff adv_managed_flag}};
    AdvOtherConfigFlag {{onoff adv_other_config_flag}};
    AdvDefaultLifetime {{adv_default_lifetime}};
{{#if adv_default_preference}}
    AdvDefaultPreference {{adv_default_preference}};
{{/if}}
{{#each prefixes}}
    prefix {{prefix}} {
        AdvOnLink {{onoff adv_on_link}};
        AdvAutonomous {{onoff adv_autonomous}};
        AdvRouterAddr {{onoff adv_router_addr}};
        AdvValidLifetime {{adv_valid_lifetime}};
    };
{{/each}}
{{#each rdnss}}
    RDNSS {{address}} {
        AdvRDNSSLifetime {{adv_rdnss_lifetime}};
    };
{{/each}}
{{#each routes}}
    route {{route}} {
        AdvRouteLifetime {{adv_route_lifetime}};
        AdvRoutePreference {{adv_route_preference}};
    };
{{/each}}
{{#if clients}}
    clients {
{{#each clients}}
        {{this}};
{{/each}}
    };
{{/if}}
};
"#;

handlebars_helper!(onoff: |flag: bool| if flag { "on" } else { "off" });

pub struct ConfigRenderer {
    registry: Handlebars<'static>,
}

impl ConfigRenderer {
    pub fn new() -> Self {
        let mut registry = Handlebars::new();
        registry.register_escape_fn(handlebars::no_escape);
        registry.register_helper("onoff", Box::new(onoff));
        Self { registry }
    }

    pub fn render(&self, instance: &Instance) -> Result<String, handlebars::RenderError> {
        self.registry.render_template(RADVD_TEMPLATE, instance)
    }
}

impl Default for ConfigRenderer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::instance::{Prefix, Rdnss, Route};

    fn sample() -> Instance {
        Instance {
            id: 1,
            router_id: "fd00::1".to_string(),
            name: "eth0".to_string(),
            adv_send_advert: true,
            min_rtr_adv_interval: 3,
            max_rtr_adv_interval: 10,
            adv_default_lifetime: 30,
            adv_default_preference: "medium".to_string(),
            prefixes: vec![Prefix {
                prefix: "2001:db8::/64".to_string(),
                adv_on_link: true,
                adv_autonomous: true,
                adv_router_addr: false,
                adv_valid_lifetime: 3600,
            }],
            rdnss: vec![Rdnss {
                address: "2001:db8::53".to_string(),
                adv_rdnss_lifetime: 300,
            }],
            routes: vec![Route {
                route: "2001:db8:1::/64".to_string(),
                adv_route_lifetime: 1800,
                adv_route_preference: "medium".to_string(),
            }],
            clients: vec!["2001:db8::100".to_string()],
            ..Instance::default()
        }
    }

    #[test]
    fn renders_all_sections() {
        let text = ConfigRenderer::new().render(&sample()).unwrap();
        assert!(text.starts_with("interface eth0 {"));
        assert!(text.contains("AdvSendAdvert on;"));
        assert!(text.contains("AdvManagedFlag off;"));
        assert!(text.contains("prefix 2001:db8::/64 {"));
        assert!(text.contains("AdvRouterAddr off;"));
        assert!(text.contains("RDNSS 2001:db8::53 {"));
        assert!(text.contains("route 2001:db8:1::/64 {"));
        assert!(text.contains("AdvRoutePreference medium;"));
        assert!(text.contains("2001:db8::100;"));
        assert!(text.trim_end().ends_with("};"));
    }

    #[test]
    fn omits_clients_block_when_empty() {
        let mut instance = sample();
        instance.clients.clear();
        let text = ConfigRenderer::new().render(&instance).unwrap();
        assert!(!text.contains("clients"));
    }
}
