// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Spoke cluster availability checks

use crate::error::{is_api_status, Result};
use crate::types::ManagedCluster;
use kube::{Api, Client};
use tracing::{debug, info, instrument};

/// Check whether a spoke is registered with the hub and its agent is available.
/// An unknown cluster is reported as unavailable rather than as an error.
#[instrument(skip(client))]
pub async fn spoke_cluster_available(client: &Client, name: &str) -> Result<bool> {
    let clusters: Api<ManagedCluster> = Api::all(client.clone());

    debug!("Checking if spoke cluster {} exists...", name);
    match clusters.get(name).await {
        Ok(cluster) => {
            let available = cluster.is_available();
            info!("Spoke cluster {} found, available={}", name, available);
            Ok(available)
        }
        Err(e) if is_api_status(&e, 404) => {
            info!("Spoke cluster {} is not registered with the hub", name);
            Ok(false)
        }
        Err(e) => Err(e.into()),
    }
}
