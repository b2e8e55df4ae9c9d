// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Kubernetes utilities for hub client creation, kind discovery and dynamic object access.

pub mod client;
pub mod clusters;
pub mod discovery;
pub mod remote;

pub use client::create_hub_client;
pub use clusters::spoke_cluster_available;
pub use discovery::{KindResolver, ResourceCollectionRef};
pub use remote::{ApplyOutcome, RemoteApplier};
