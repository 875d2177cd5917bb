// Copyright (c) 2026 radvd-fleet contributors
// SPDX-License-Identifier: AGPL-3.0

pub mod compiler;
pub mod lifecycle;
pub mod store;

pub use compiler::{compile, CompileError};
pub use lifecycle::{LifecycleError, RadvdLifecycle};
pub use store::{InstanceStore, StoreError};
