// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Runs backups for every configured spoke cluster concurrently.

use crate::backup::runner::{BackupOutcome, BackupRunner};
use crate::error::Result;
use futures::future::join_all;
use tracing::{error, info, warn};

/// Result of one cluster's backup run
#[derive(Debug)]
pub struct ClusterReport {
    pub cluster: String,
    pub result: Result<BackupOutcome>,
}

impl ClusterReport {
    pub fn succeeded(&self) -> bool {
        matches!(self.result, Ok(BackupOutcome::Completed { .. }))
    }
}

/// Fans a backup out over the spoke clusters. Runs share the runner and its
/// kind resolution cache, nothing else.
pub struct BackupManager {
    runner: BackupRunner,
    clusters: Vec<String>,
}

impl BackupManager {
    pub fn new(runner: BackupRunner, clusters: Vec<String>) -> Self {
        Self { runner, clusters }
    }

    pub async fn run(&self) -> Vec<ClusterReport> {
        info!("Starting backups for {} clusters", self.clusters.len());

        let runs = self.clusters.iter().map(|cluster| async move {
            let result = self.runner.run(cluster).await;
            match &result {
                Ok(BackupOutcome::Completed { attempts }) => {
                    info!("Backup of {} completed after {} checks", cluster, attempts)
                }
                Ok(BackupOutcome::TimedOut { attempts, last_cause }) => warn!(
                    "Backup of {} timed out after {} checks (last error: {})",
                    cluster,
                    attempts,
                    last_cause.as_deref().unwrap_or("none")
                ),
                Err(e) => error!("Backup of {} failed: {}", cluster, e),
            }
            ClusterReport {
                cluster: cluster.clone(),
                result,
            }
        });

        let reports = join_all(runs).await;
        let succeeded = reports.iter().filter(|r| r.succeeded()).count();
        info!("{}/{} cluster backups completed", succeeded, reports.len());
        reports
    }
}
