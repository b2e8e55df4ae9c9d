// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Hub cluster client creation

use crate::config::Config;
use crate::error::{RelayError, Result};
use kube::{
    config::{KubeConfigOptions, Kubeconfig},
    Client,
};
use tracing::{info, instrument};

/// Create a client for the hub, from the configured kubeconfig file when set,
/// otherwise from the in-cluster environment or the default kubeconfig.
#[instrument(skip(config))]
pub async fn create_hub_client(config: &Config) -> Result<Client> {
    match &config.kubeconfig_path {
        Some(path) => {
            info!("Loading hub kubeconfig from {}", path);
            let kubeconfig = tokio::fs::read_to_string(path).await.map_err(|e| {
                RelayError::KubeconfigError(format!("Failed to read {}: {}", path, e))
            })?;
            create_client_from_kubeconfig(&kubeconfig).await
        }
        None => {
            info!("No kubeconfig path set, inferring hub client configuration");
            Ok(Client::try_default().await?)
        }
    }
}

/// Create a Kubernetes client from a kubeconfig string
async fn create_client_from_kubeconfig(kubeconfig: &str) -> Result<Client> {
    let kubeconfig_parsed: Kubeconfig = serde_yaml::from_str(kubeconfig)
        .map_err(|e| RelayError::KubeconfigError(format!("Failed to parse kubeconfig: {}", e)))?;

    let client_config =
        kube::Config::from_custom_kubeconfig(kubeconfig_parsed, &KubeConfigOptions::default())
            .await
            .map_err(|e| RelayError::KubeconfigError(format!("Failed to create config: {}", e)))?;

    Client::try_from(client_config)
        .map_err(|e| RelayError::KubeconfigError(format!("Failed to create client: {}", e)))
}
