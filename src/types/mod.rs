// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Typed views of hub resources.

pub mod managed_cluster;

pub use managed_cluster::{Condition, ManagedCluster};
