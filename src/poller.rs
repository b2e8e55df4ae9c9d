// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Bounded polling of view resources until the remote agent reports success.

use crate::constants::{conditions, poll};
use crate::document::{ObservationResult, RenderedDocument};
use crate::error::RelayError;
use crate::kubernetes::{RemoteApplier, ResourceCollectionRef};
use crate::templates::ResourceTemplate;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, instrument, warn};

/// Attempt budget and the fixed delay between attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    pub max_attempts: u32,
    pub interval: Duration,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            max_attempts: poll::DEFAULT_MAX_ATTEMPTS,
            interval: Duration::from_secs(poll::DEFAULT_INTERVAL_SECS),
        }
    }
}

/// Final outcome of waiting for convergence
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollVerdict {
    Converged { attempts: u32 },
    /// The budget ran out. `last_cause` is the last transient error seen, if any.
    TimedOut {
        attempts: u32,
        last_cause: Option<String>,
    },
    /// A view exists but cannot be interpreted
    FatalError(String),
}

impl PollVerdict {
    pub fn is_converged(&self) -> bool {
        matches!(self, PollVerdict::Converged { .. })
    }
}

/// Classification of a single attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attempt {
    Converged,
    /// Found, but the latest condition is not `True` yet
    Pending(Option<String>),
    /// Missing view or transport failure, the agent may not have reacted yet
    TransientError(String),
    FatalError(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PollState {
    Polling { attempt: u32 },
    Converged { attempts: u32 },
    Exhausted { attempts: u32 },
}

/// Classify a fetched view by the status of its most recently appended condition
pub fn classify(observation: &ObservationResult) -> Attempt {
    match observation.latest_status() {
        Some(conditions::TRUE) => Attempt::Converged,
        other => Attempt::Pending(other.map(String::from)),
    }
}

pub struct StatusPoller {
    applier: RemoteApplier,
    settings: PollSettings,
}

impl StatusPoller {
    pub fn new(applier: RemoteApplier, settings: PollSettings) -> Self {
        Self { applier, settings }
    }

    /// Poll the named views in `cluster` until all of them converge or the budget runs out.
    ///
    /// The only suspension between attempts is the fixed interval; dropping the
    /// returned future cancels the wait.
    #[instrument(skip(self, observations, collection), fields(resource = %collection.plural))]
    pub async fn await_convergence(
        &self,
        cluster: &str,
        observations: &[ResourceTemplate],
        collection: &ResourceCollectionRef,
    ) -> PollVerdict {
        if observations.is_empty() {
            return PollVerdict::FatalError(format!("no views to observe for cluster {}", cluster));
        }
        let max_attempts = self.settings.max_attempts;
        let mut last_cause = None;
        let mut state = PollState::Polling { attempt: 1 };

        loop {
            match state {
                PollState::Polling { attempt } if attempt > max_attempts => {
                    state = PollState::Exhausted {
                        attempts: max_attempts,
                    };
                }
                PollState::Polling { attempt } => {
                    if attempt > 1 {
                        sleep(self.settings.interval).await;
                    }
                    debug!("Checking views for cluster {} ({}/{})", cluster, attempt, max_attempts);

                    match self.attempt(cluster, observations, collection).await {
                        Attempt::Converged => {
                            state = PollState::Converged { attempts: attempt };
                        }
                        Attempt::Pending(status) => {
                            debug!("Views not converged yet, latest status {:?}", status);
                            state = PollState::Polling {
                                attempt: attempt + 1,
                            };
                        }
                        Attempt::TransientError(cause) => {
                            warn!("Attempt {} for cluster {} failed: {}", attempt, cluster, cause);
                            last_cause = Some(cause);
                            state = PollState::Polling {
                                attempt: attempt + 1,
                            };
                        }
                        Attempt::FatalError(cause) => {
                            warn!("Views for cluster {} are unusable: {}", cluster, cause);
                            return PollVerdict::FatalError(cause);
                        }
                    }
                }
                PollState::Converged { attempts } => {
                    info!("Cluster {} converged after {} attempts", cluster, attempts);
                    return PollVerdict::Converged { attempts };
                }
                PollState::Exhausted { attempts } => {
                    warn!("Cluster {} did not converge within {} attempts", cluster, attempts);
                    return PollVerdict::TimedOut {
                        attempts,
                        last_cause,
                    };
                }
            }
        }
    }

    /// One pass over all views, converged only when each one is
    async fn attempt(
        &self,
        cluster: &str,
        observations: &[ResourceTemplate],
        collection: &ResourceCollectionRef,
    ) -> Attempt {
        let mut pending = None;

        for observation in observations {
            let obj = match self.applier.get(cluster, &observation.name, collection).await {
                Ok(obj) => obj,
                Err(e) => return Attempt::TransientError(e.to_string()),
            };

            let result = RenderedDocument::from_dynamic(obj)
                .and_then(|doc| ObservationResult::from_document(&doc));
            match result {
                Ok(observed) => {
                    if let Attempt::Pending(status) = classify(&observed) {
                        pending.get_or_insert(status);
                    }
                }
                Err(e @ RelayError::SchemaMismatch { .. }) => {
                    return Attempt::FatalError(format!("{}: {}", observation.name, e))
                }
                Err(e) => return Attempt::TransientError(e.to_string()),
            }
        }

        match pending {
            Some(status) => Attempt::Pending(status),
            None => Attempt::Converged,
        }
    }
}
