// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
pub mod backup;
pub mod config;
pub mod constants;
pub mod dispatch;
pub mod document;
pub mod error;
pub mod kubernetes;
pub mod poller;
pub mod templates;
pub mod types;

#[cfg(test)]
pub mod test_utils;
