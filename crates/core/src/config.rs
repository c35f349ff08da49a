// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Runtime configuration loaded from the environment, in the style of the
//! teacher daemon's `env.rs`: every option has an explicit default, and
//! loading never fails — unparsable values fall back rather than abort
//! boot.

use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct RunPlaneConfig {
    /// Default claim lease duration for `claimNext`.
    pub lease_ms: u64,
    /// Default backoff before a retried run becomes claimable again.
    pub retry_delay_ms: u64,
    /// Idle duration after which `stopIdleWorkers` stops a running worker.
    pub idle_timeout_ms: u64,
    /// Stopped duration after which `removeLongStoppedWorkers` removes it.
    pub remove_after_ms: u64,
    /// Staleness threshold for the sync reconciler.
    pub sync_stale_after_ms: u64,
    /// Human-loop pending duration after which it expires.
    pub human_loop_timeout_ms: u64,
    /// How long closed-run events stay retrievable for SSE reconnect.
    pub sse_grace_ms: u64,
    /// Max buffered events retained per run before oldest are evicted.
    pub bus_buffer_capacity: usize,
    /// Per-subscriber channel high-water mark before it is disconnected
    /// for lagging.
    pub subscriber_high_water_mark: usize,
    /// Default timeout for outbound executor/sync HTTP calls.
    pub outbound_timeout: Duration,
}

impl Default for RunPlaneConfig {
    fn default() -> Self {
        Self {
            lease_ms: 30_000,
            retry_delay_ms: 5_000,
            idle_timeout_ms: 15 * 60_000,
            remove_after_ms: 24 * 60 * 60_000,
            sync_stale_after_ms: 5 * 60_000,
            human_loop_timeout_ms: 10 * 60_000,
            sse_grace_ms: 2 * 60_000,
            bus_buffer_capacity: 1_000,
            subscriber_high_water_mark: 500,
            outbound_timeout: Duration::from_secs(30),
        }
    }
}

impl RunPlaneConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            lease_ms: env_u64("RUNPLANE_LEASE_MS", defaults.lease_ms),
            retry_delay_ms: env_u64("RUNPLANE_RETRY_DELAY_MS", defaults.retry_delay_ms),
            idle_timeout_ms: env_u64("RUNPLANE_IDLE_TIMEOUT_MS", defaults.idle_timeout_ms),
            remove_after_ms: env_u64("RUNPLANE_REMOVE_AFTER_MS", defaults.remove_after_ms),
            sync_stale_after_ms: env_u64(
                "RUNPLANE_SYNC_STALE_AFTER_MS",
                defaults.sync_stale_after_ms,
            ),
            human_loop_timeout_ms: env_u64(
                "RUNPLANE_HUMAN_LOOP_TIMEOUT_MS",
                defaults.human_loop_timeout_ms,
            ),
            sse_grace_ms: env_u64("RUNPLANE_SSE_GRACE_MS", defaults.sse_grace_ms),
            bus_buffer_capacity: env_u64(
                "RUNPLANE_BUS_BUFFER_CAPACITY",
                defaults.bus_buffer_capacity as u64,
            ) as usize,
            subscriber_high_water_mark: env_u64(
                "RUNPLANE_SUBSCRIBER_HIGH_WATER_MARK",
                defaults.subscriber_high_water_mark as u64,
            ) as usize,
            outbound_timeout: Duration::from_millis(env_u64(
                "RUNPLANE_OUTBOUND_TIMEOUT_MS",
                defaults.outbound_timeout.as_millis() as u64,
            )),
        }
    }
}

fn env_u64(key: &str, default: u64) -> u64 {
    env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
