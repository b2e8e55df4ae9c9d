// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::Result;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use spoke_relay::backup::{BackupManager, BackupRunner};
use spoke_relay::config::Config;
use spoke_relay::kubernetes::create_hub_client;
use spoke_relay::templates::TemplateRegistry;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    info!("Starting spoke relay");

    // Load configuration
    let config = Config::from_env()?;
    info!(
        "Configuration loaded: spokes={:?}, backup_path={}",
        config.spoke_clusters, config.backup_path
    );

    // Fail on template mistakes before touching any cluster
    let registry = Arc::new(TemplateRegistry::builtin()?);

    let client = create_hub_client(&config).await?;
    info!("Connected to hub cluster");

    let runner = BackupRunner::from_config(client, registry, &config);
    let manager = BackupManager::new(runner, config.spoke_clusters.clone());

    let reports = manager.run().await;
    let failed: Vec<&str> = reports
        .iter()
        .filter(|r| !r.succeeded())
        .map(|r| r.cluster.as_str())
        .collect();

    if !failed.is_empty() {
        error!("Backups did not complete for: {}", failed.join(", "));
        anyhow::bail!("{} of {} cluster backups did not complete", failed.len(), reports.len());
    }

    info!("All cluster backups completed");
    Ok(())
}
