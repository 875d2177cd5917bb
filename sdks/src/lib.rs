// Copyright (c) 2026 radvd-fleet contributors
// SPDX-License-Identifier: AGPL-3.0

//! Client SDK for radvd-fleet routers.
//!
//! [`RouterClient`] talks to one router's REST surface; [`FleetClient`]
//! fans an operation out across every router a compiled instance set
//! touches.

pub mod client;
pub mod fleet;

pub use client::{ClientError, RouterClient, DEFAULT_PORT};
pub use fleet::{group_by_router, routers_of, ApplyReport, FleetClient, InstanceOutcome, PushOp, StatusReport};
