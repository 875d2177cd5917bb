// Copyright (c) 2026 radvd-fleet contributors
// SPDX-License-Identifier: AGPL-3.0

//! The declarative policy document: which prefixes and client groups get
//! which RA behavior, and from which router.
//!
//! A policy is loaded once from YAML and is immutable after validation.
//! Validation is a plain function run after parse that reports every
//! violation it finds, not a pluggable rule registry.

use std::collections::HashSet;
use std::net::Ipv6Addr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::instance::HOST_INSTANCE_ID;

/// The default-route prefix. When a rule advertises it, it must be the sole
/// entry of the prefix list.
pub const DEFAULT_ROUTE: &str = "::/0";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Policy {
    pub rules: Vec<Rule>,
    pub groups: Vec<Group>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RuleType {
    Prefixes,
    #[serde(rename = "FQDNs")]
    Fqdns,
}

impl Default for RuleType {
    fn default() -> Self {
        RuleType::Prefixes
    }
}

/// One policy entry: advertise `prefixes` from the router at `nexthop`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rule {
    pub id: u32,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type", default)]
    pub rule_type: RuleType,
    #[serde(default)]
    pub prefixes: Vec<String>,
    #[serde(rename = "fqdn", default)]
    pub fqdns: Vec<String>,
    pub nexthop: String,
}

impl Rule {
    /// True when this rule advertises the router as default gateway rather
    /// than a set of specific prefixes.
    pub fn is_default_route(&self) -> bool {
        self.prefixes.len() == 1 && self.prefixes[0] == DEFAULT_ROUTE
    }
}

/// A set of client addresses attached to one or more rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    pub id: u32,
    #[serde(default)]
    pub description: String,
    pub rules: Vec<u32>,
    pub members: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Violation {
    #[error("rule {0}: duplicate rule id")]
    DuplicateRuleId(u32),
    #[error("rule {0}: id 0 is reserved for the host configuration")]
    ReservedRuleId(u32),
    #[error("rule {0}: FQDN rules are not supported")]
    UnsupportedRuleType(u32),
    #[error("rule {0}: a prefix rule requires at least one prefix")]
    MissingPrefixes(u32),
    #[error("rule {0}: a prefix rule must not carry FQDN values")]
    UnexpectedFqdns(u32),
    #[error("rule {0}: ::/0 must be the only prefix in the list")]
    DefaultRouteNotAlone(u32),
    #[error("rule {rule}: {prefix:?} is not a valid IPv6 prefix")]
    InvalidPrefix { rule: u32, prefix: String },
    #[error("rule {rule}: nexthop {nexthop:?} is not a valid IPv6 address")]
    InvalidNexthop { rule: u32, nexthop: String },
    #[error("group {group}: references unknown rule {rule}")]
    UnknownRuleRef { group: u32, rule: u32 },
    #[error("group {group}: member {member:?} is not a valid IPv6 address")]
    InvalidMember { group: u32, member: String },
}

/// All violations found in one validation pass.
#[derive(Debug, Clone, Error)]
#[error("invalid policy: {} violation(s) found", .0.len())]
pub struct ValidationError(pub Vec<Violation>);

#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("failed to parse policy document")]
    Parse(#[from] serde_yaml::Error),
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl Policy {
    /// Parse a YAML policy document and validate it. A document that fails
    /// validation is rejected wholesale; no partial policy is returned.
    pub fn from_yaml(text: &str) -> Result<Self, PolicyError> {
        let policy: Policy = serde_yaml::from_str(text)?;
        policy.validate()?;
        Ok(policy)
    }

    /// Check referential and structural integrity, collecting every
    /// violation rather than stopping at the first.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut violations = Vec::new();
        let mut seen = HashSet::new();

        for rule in &self.rules {
            if rule.id == HOST_INSTANCE_ID {
                violations.push(Violation::ReservedRuleId(rule.id));
            }
            if !seen.insert(rule.id) {
                violations.push(Violation::DuplicateRuleId(rule.id));
            }
            match rule.rule_type {
                RuleType::Fqdns => {
                    violations.push(Violation::UnsupportedRuleType(rule.id));
                    continue;
                }
                RuleType::Prefixes => {
                    if rule.prefixes.is_empty() {
                        violations.push(Violation::MissingPrefixes(rule.id));
                    }
                    if !rule.fqdns.is_empty() {
                        violations.push(Violation::UnexpectedFqdns(rule.id));
                    }
                }
            }
            if rule.prefixes.iter().any(|p| p == DEFAULT_ROUTE) && rule.prefixes.len() != 1 {
                violations.push(Violation::DefaultRouteNotAlone(rule.id));
            }
            for prefix in &rule.prefixes {
                if !is_ipv6_cidr(prefix) {
                    violations.push(Violation::InvalidPrefix {
                        rule: rule.id,
                        prefix: prefix.clone(),
                    });
                }
            }
            if rule.nexthop.parse::<Ipv6Addr>().is_err() {
                violations.push(Violation::InvalidNexthop {
                    rule: rule.id,
                    nexthop: rule.nexthop.clone(),
                });
            }
        }

        let rule_ids: HashSet<u32> = self.rules.iter().map(|r| r.id).collect();
        for group in &self.groups {
            for rule in &group.rules {
                if !rule_ids.contains(rule) {
                    violations.push(Violation::UnknownRuleRef {
                        group: group.id,
                        rule: *rule,
                    });
                }
            }
            for member in &group.members {
                if member.parse::<Ipv6Addr>().is_err() {
                    violations.push(Violation::InvalidMember {
                        group: group.id,
                        member: member.clone(),
                    });
                }
            }
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(ValidationError(violations))
        }
    }
}

fn is_ipv6_cidr(value: &str) -> bool {
    match value.split_once('/') {
        Some((addr, len)) => {
            addr.parse::<Ipv6Addr>().is_ok()
                && len.parse::<u8>().map(|l| l <= 128).unwrap_or(false)
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prefix_rule(id: u32, prefixes: &[&str]) -> Rule {
        Rule {
            id,
            description: String::new(),
            rule_type: RuleType::Prefixes,
            prefixes: prefixes.iter().map(|p| p.to_string()).collect(),
            fqdns: vec![],
            nexthop: "fd00::1".to_string(),
        }
    }

    #[test]
    fn valid_policy_passes() {
        let policy = Policy {
            rules: vec![
                prefix_rule(1, &["2001:db8::/64"]),
                prefix_rule(2, &["::/0"]),
            ],
            groups: vec![Group {
                id: 1,
                description: String::new(),
                rules: vec![1, 2],
                members: vec!["2001:db8::100".to_string()],
            }],
        };
        assert!(policy.validate().is_ok());
    }

    #[test]
    fn fqdn_rules_are_rejected() {
        let mut rule = prefix_rule(1, &[]);
        rule.rule_type = RuleType::Fqdns;
        rule.fqdns = vec!["example.com".to_string()];
        let policy = Policy { rules: vec![rule], groups: vec![] };
        let err = policy.validate().unwrap_err();
        assert_eq!(err.0, vec![Violation::UnsupportedRuleType(1)]);
    }

    #[test]
    fn default_route_must_be_alone() {
        let policy = Policy {
            rules: vec![prefix_rule(1, &["::/0", "2001:db8::/64"])],
            groups: vec![],
        };
        let err = policy.validate().unwrap_err();
        assert!(err.0.contains(&Violation::DefaultRouteNotAlone(1)));
    }

    #[test]
    fn all_violations_are_collected() {
        let mut bad = prefix_rule(1, &["not-a-prefix"]);
        bad.nexthop = "192.0.2.1".to_string();
        let policy = Policy {
            rules: vec![bad, prefix_rule(1, &[])],
            groups: vec![Group {
                id: 7,
                description: String::new(),
                rules: vec![99],
                members: vec!["bogus".to_string()],
            }],
        };
        let err = policy.validate().unwrap_err();
        assert_eq!(err.0.len(), 6);
        assert!(err.0.contains(&Violation::DuplicateRuleId(1)));
        assert!(err.0.contains(&Violation::MissingPrefixes(1)));
        assert!(err.0.contains(&Violation::UnknownRuleRef { group: 7, rule: 99 }));
    }

    #[test]
    fn rule_id_zero_is_reserved() {
        let policy = Policy {
            rules: vec![prefix_rule(0, &["2001:db8::/64"])],
            groups: vec![],
        };
        let err = policy.validate().unwrap_err();
        assert!(err.0.contains(&Violation::ReservedRuleId(0)));
    }

    #[test]
    fn parses_yaml_document() {
        let doc = r#"
rules:
  - id: 1
    description: lab prefix
    type: Prefixes
    prefixes: ["2001:db8:1::/64"]
    nexthop: "fd00::1"
groups:
  - id: 1
    rules: [1]
    members: ["2001:db8::42"]
"#;
        let policy = Policy::from_yaml(doc).unwrap();
        assert_eq!(policy.rules.len(), 1);
        assert_eq!(policy.rules[0].rule_type, RuleType::Prefixes);
        assert_eq!(policy.groups[0].members, vec!["2001:db8::42"]);
    }
}
