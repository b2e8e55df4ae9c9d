// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

/// Condition types and values reported by remote agents
pub mod conditions {
    /// Condition on a ManagedCluster telling whether its agent is reachable
    pub const CLUSTER_AVAILABLE: &str = "ManagedClusterConditionAvailable";
    pub const TRUE: &str = "True";
}

/// Status polling defaults
pub mod poll {
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 10;
    pub const DEFAULT_INTERVAL_SECS: u64 = 1;
}

/// Kind resolution defaults
pub mod discovery {
    pub const DEFAULT_CACHE_CAPACITY: usize = 32;
    /// Extra attempts after a discovery outage, unknown kinds are never retried
    pub const DEFAULT_RETRIES: u32 = 2;
    pub const RETRY_DELAY_MILLIS: u64 = 500;
}
