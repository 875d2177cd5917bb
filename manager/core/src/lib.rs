// Copyright (c) 2026 radvd-fleet contributors
// SPDX-License-Identifier: AGPL-3.0

//! Core of the radvd-fleet manager.
//!
//! The crate is split into the usual layers:
//!
//! - [`domain`]: the policy document, the compiled instance model and the
//!   per-router parameter defaults.
//! - [`application`]: policy compilation and the per-router instance store
//!   with its daemon-lifecycle seam.
//! - [`infrastructure`]: the radvd process manager (config rendering,
//!   config-test, start/reload/stop, PID files) and startup discovery of
//!   already-rendered configs.
//! - [`presentation`]: the REST surface served on each router.

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod presentation;
