// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Kind to resource collection resolution with a bounded cache

use crate::constants::discovery::RETRY_DELAY_MILLIS;
use crate::document::KindIdentity;
use crate::error::{is_api_status, RelayError, Result};
use kube::{discovery::ApiResource, Client};
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, instrument, warn};

/// Addressable plural collection for a kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceCollectionRef {
    pub group: String,
    pub version: String,
    pub kind: String,
    pub plural: String,
}

impl ResourceCollectionRef {
    pub fn api_resource(&self) -> ApiResource {
        let api_version = if self.group.is_empty() {
            self.version.clone()
        } else {
            format!("{}/{}", self.group, self.version)
        };
        ApiResource {
            group: self.group.clone(),
            version: self.version.clone(),
            api_version,
            kind: self.kind.clone(),
            plural: self.plural.clone(),
        }
    }
}

impl From<ApiResource> for ResourceCollectionRef {
    fn from(ar: ApiResource) -> Self {
        Self {
            group: ar.group,
            version: ar.version,
            kind: ar.kind,
            plural: ar.plural,
        }
    }
}

/// Resolution cache evicting the oldest entry once full
#[derive(Debug)]
pub struct ResolutionCache {
    capacity: usize,
    entries: HashMap<KindIdentity, ResourceCollectionRef>,
    order: VecDeque<KindIdentity>,
}

impl ResolutionCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: HashMap::new(),
            order: VecDeque::new(),
        }
    }

    pub fn get(&self, kind: &KindIdentity) -> Option<&ResourceCollectionRef> {
        self.entries.get(kind)
    }

    pub fn insert(&mut self, kind: KindIdentity, collection: ResourceCollectionRef) {
        if self.capacity == 0 {
            return;
        }
        // Concurrent resolutions of one kind insert identical values
        if self.entries.insert(kind.clone(), collection).is_some() {
            return;
        }
        self.order.push_back(kind);
        while self.order.len() > self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.entries.remove(&oldest);
            }
        }
    }

    pub fn remove(&mut self, kind: &KindIdentity) -> bool {
        self.order.retain(|k| k != kind);
        self.entries.remove(kind).is_some()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Resolves kinds through API discovery, caching the answers
pub struct KindResolver {
    client: Client,
    cache: Mutex<ResolutionCache>,
    retries: u32,
    retry_delay: Duration,
}

impl KindResolver {
    pub fn new(client: Client, capacity: usize, retries: u32) -> Self {
        Self {
            client,
            cache: Mutex::new(ResolutionCache::new(capacity)),
            retries,
            retry_delay: Duration::from_millis(RETRY_DELAY_MILLIS),
        }
    }

    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    #[instrument(skip(self), fields(kind = %kind))]
    pub async fn resolve(&self, kind: &KindIdentity) -> Result<ResourceCollectionRef> {
        let cached = self.lock().get(kind).cloned();
        if let Some(hit) = cached {
            debug!("Resolved {} from cache as {}", kind, hit.plural);
            return Ok(hit);
        }

        let collection = self.discover(kind).await?;
        info!("Resolved {} to collection {}", kind, collection.plural);
        self.lock().insert(kind.clone(), collection.clone());
        Ok(collection)
    }

    /// Drop a cached resolution, returns whether it was present
    pub fn invalidate(&self, kind: &KindIdentity) -> bool {
        self.lock().remove(kind)
    }

    pub fn invalidate_all(&self) {
        self.lock().clear();
    }

    pub fn cached(&self) -> usize {
        self.lock().len()
    }

    async fn discover(&self, kind: &KindIdentity) -> Result<ResourceCollectionRef> {
        let gvk = kind.to_gvk();
        let mut attempt = 0;

        loop {
            match kube::discovery::pinned_kind(&self.client, &gvk).await {
                Ok((ar, _caps)) => return Ok(ar.into()),
                Err(e) if is_unknown_kind(&e) => {
                    return Err(RelayError::KindResolution {
                        kind: kind.to_string(),
                        message: format!("kind is not served by the API: {}", e),
                    });
                }
                Err(e) if attempt < self.retries => {
                    attempt += 1;
                    warn!(
                        "Discovery of {} failed: {}, retrying in {:?} ({}/{})...",
                        kind, e, self.retry_delay, attempt, self.retries
                    );
                    sleep(self.retry_delay).await;
                }
                Err(e) => {
                    return Err(RelayError::KindResolution {
                        kind: kind.to_string(),
                        message: format!("discovery unavailable: {}", e),
                    });
                }
            }
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ResolutionCache> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Unknown group versions come back as 404, unknown kinds as a discovery error
fn is_unknown_kind(err: &kube::Error) -> bool {
    matches!(err, kube::Error::Discovery(_)) || is_api_status(err, 404)
}
