// Copyright (c) 2026 radvd-fleet contributors
// SPDX-License-Identifier: AGPL-3.0

pub mod instance;
pub mod params;
pub mod policy;

pub use instance::{Instance, Prefix, Rdnss, Route};
pub use params::DefaultParams;
pub use policy::{Group, Policy, Rule, RuleType};
