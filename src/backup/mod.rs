// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Backup orchestration across spoke clusters.

pub mod manager;
pub mod runner;

pub use manager::{BackupManager, ClusterReport};
pub use runner::{BackupOutcome, BackupRunner};
