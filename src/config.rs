// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::{Context, Result};
use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::constants::{discovery, poll};

/// Relay configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Names of the spoke clusters to back up, each also the hub namespace of its proxies
    pub spoke_clusters: Vec<String>,
    /// Recovery path handed to the backup job on the spoke
    pub backup_path: String,
    /// Hub kubeconfig, falls back to in-cluster or default inference when unset
    pub kubeconfig_path: Option<String>,
    pub poll_max_attempts: u32,
    pub poll_interval: Duration,
    pub discovery_cache_capacity: usize,
    pub discovery_retries: u32,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let spoke_clusters: Vec<String> = lookup("SPOKE_CLUSTERS")
            .context("SPOKE_CLUSTERS environment variable not set")?
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();
        if spoke_clusters.is_empty() {
            anyhow::bail!("SPOKE_CLUSTERS does not name any cluster");
        }

        let backup_path =
            lookup("BACKUP_PATH").context("BACKUP_PATH environment variable not set")?;
        let kubeconfig_path = lookup("KUBECONFIG_PATH").filter(|p| !p.is_empty());

        let poll_max_attempts = parse_or(&lookup, "POLL_MAX_ATTEMPTS", poll::DEFAULT_MAX_ATTEMPTS)?;
        let poll_interval_secs =
            parse_or(&lookup, "POLL_INTERVAL_SECS", poll::DEFAULT_INTERVAL_SECS)?;
        let discovery_cache_capacity = parse_or(
            &lookup,
            "DISCOVERY_CACHE_CAPACITY",
            discovery::DEFAULT_CACHE_CAPACITY,
        )?;
        let discovery_retries = parse_or(&lookup, "DISCOVERY_RETRIES", discovery::DEFAULT_RETRIES)?;

        Ok(Config {
            spoke_clusters,
            backup_path,
            kubeconfig_path,
            poll_max_attempts,
            poll_interval: Duration::from_secs(poll_interval_secs),
            discovery_cache_capacity,
            discovery_retries,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} has an invalid value: {:?}", key, raw)),
        None => Ok(default),
    }
}
