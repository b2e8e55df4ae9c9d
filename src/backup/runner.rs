// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Per-cluster backup entry points

use crate::config::Config;
use crate::dispatch::Dispatcher;
use crate::error::{RelayError, Result};
use crate::kubernetes::{spoke_cluster_available, KindResolver, RemoteApplier};
use crate::poller::{PollSettings, PollVerdict, StatusPoller};
use crate::templates::TemplateRegistry;
use kube::Client;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// How a backup run for one cluster ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackupOutcome {
    /// The job converged and hub-side objects were cleaned up
    Completed { attempts: u32 },
    /// The job did not converge in time; objects are left in place so polling can resume
    TimedOut {
        attempts: u32,
        last_cause: Option<String>,
    },
}

/// Drives the action, view and cleanup sequences for spoke clusters
pub struct BackupRunner {
    client: Client,
    registry: Arc<TemplateRegistry>,
    dispatcher: Dispatcher,
    poller: StatusPoller,
}

impl BackupRunner {
    pub fn new(
        client: Client,
        registry: Arc<TemplateRegistry>,
        recovery_path: &str,
        poll: PollSettings,
        resolver: Arc<KindResolver>,
    ) -> Self {
        let applier = RemoteApplier::new(client.clone());
        Self {
            client,
            registry,
            dispatcher: Dispatcher::new(applier.clone(), resolver, recovery_path),
            poller: StatusPoller::new(applier, poll),
        }
    }

    pub fn from_config(client: Client, registry: Arc<TemplateRegistry>, config: &Config) -> Self {
        let resolver = Arc::new(KindResolver::new(
            client.clone(),
            config.discovery_cache_capacity,
            config.discovery_retries,
        ));
        let poll = PollSettings {
            max_attempts: config.poll_max_attempts,
            interval: config.poll_interval,
        };
        Self::new(client, registry, &config.backup_path, poll, resolver)
    }

    /// Create the backup actions and the view over the backup job
    #[instrument(skip(self))]
    pub async fn dispatch_create_sequence(&self, cluster: &str) -> Result<()> {
        self.dispatcher.dispatch(cluster, self.registry.create()).await
    }

    /// Create the action removing the backup namespace from the spoke
    #[instrument(skip(self))]
    pub async fn dispatch_delete_sequence(&self, cluster: &str) -> Result<()> {
        self.dispatcher.dispatch(cluster, self.registry.delete()).await
    }

    /// Delete the hub-side action and view objects of the create sequence
    #[instrument(skip(self))]
    pub async fn cleanup_proxies(&self, cluster: &str) -> Result<()> {
        self.dispatcher.teardown(cluster, self.registry.create()).await
    }

    /// Wait for the backup job view to report success
    #[instrument(skip(self))]
    pub async fn await_job_convergence(&self, cluster: &str) -> Result<PollVerdict> {
        let observations = self.registry.observe();
        let Some(first) = observations.first() else {
            return Err(RelayError::EmptySequence("observe".to_string()));
        };

        let (_, collection) = self
            .dispatcher
            .materialize(cluster, first)
            .await
            .map_err(|e| e.in_step(&first.name, cluster))?;

        Ok(self
            .poller
            .await_convergence(cluster, observations, &collection)
            .await)
    }

    /// Full backup of one cluster
    #[instrument(skip(self))]
    pub async fn run(&self, cluster: &str) -> Result<BackupOutcome> {
        if !spoke_cluster_available(&self.client, cluster).await? {
            return Err(RelayError::ClusterNotAvailable(cluster.to_string()));
        }

        info!("Starting backup of cluster {}", cluster);
        // The delete action of an earlier run would otherwise swallow this run's one as a conflict
        self.dispatcher.teardown(cluster, self.registry.delete()).await?;
        self.dispatch_create_sequence(cluster).await?;

        match self.await_job_convergence(cluster).await? {
            PollVerdict::Converged { attempts } => {
                info!("Backup job on {} finished, cleaning up", cluster);
                self.cleanup_proxies(cluster).await?;
                self.dispatch_delete_sequence(cluster).await?;
                Ok(BackupOutcome::Completed { attempts })
            }
            PollVerdict::TimedOut {
                attempts,
                last_cause,
            } => {
                warn!(
                    "Backup job on {} not confirmed after {} attempts, leaving objects for a re-poll",
                    cluster, attempts
                );
                Ok(BackupOutcome::TimedOut {
                    attempts,
                    last_cause,
                })
            }
            PollVerdict::FatalError(cause) => Err(RelayError::SchemaMismatch {
                path: "status.conditions".to_string(),
                message: cause,
            }
            .in_step(&self.observed_name(), cluster)),
        }
    }

    fn observed_name(&self) -> String {
        self.registry
            .observe()
            .iter()
            .map(|t| t.name.as_str())
            .collect::<Vec<_>>()
            .join(",")
    }
}
