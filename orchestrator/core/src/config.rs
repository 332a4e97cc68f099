// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Orchestrator Configuration
//
// Every synthetic delay in the simulated protocol is configurable here so
// deployments (and tests) can tighten or relax the pacing without touching
// the session logic. Servers created by a manager inherit its config.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::domain::audit::DEFAULT_AUDIT_CAPACITY;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Synthetic delay standing in for remote computation time by all
    /// parties (the AwaitingComputation stage).
    #[serde(default = "default_computation_delay_ms")]
    pub computation_delay_ms: u64,

    /// Pause between autonomous drain iterations; backpressure toward the
    /// simulated parties.
    #[serde(default = "default_queue_pacing_ms")]
    pub queue_pacing_ms: u64,

    /// Retention cap for the governance audit log.
    #[serde(default = "default_audit_capacity")]
    pub audit_capacity: usize,

    /// Per-call latency of the simulated party network.
    #[serde(default = "default_transport_latency_ms")]
    pub transport_latency_ms: u64,

    /// Probability in [0, 1] that a simulated delivery or retrieval fails.
    #[serde(default)]
    pub delivery_failure_rate: f64,
}

impl OrchestratorConfig {
    pub fn computation_delay(&self) -> Duration {
        Duration::from_millis(self.computation_delay_ms)
    }

    pub fn queue_pacing(&self) -> Duration {
        Duration::from_millis(self.queue_pacing_ms)
    }

    pub fn transport_latency(&self) -> Duration {
        Duration::from_millis(self.transport_latency_ms)
    }

    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.delivery_failure_rate) {
            return Err(format!(
                "delivery_failure_rate must be within [0, 1], got {}",
                self.delivery_failure_rate
            ));
        }
        if self.audit_capacity == 0 {
            return Err("audit_capacity must be at least 1".to_string());
        }
        Ok(())
    }

    /// Near-zero delays for tests and demos.
    pub fn fast() -> Self {
        Self {
            computation_delay_ms: 1,
            queue_pacing_ms: 1,
            transport_latency_ms: 0,
            ..Self::default()
        }
    }
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            computation_delay_ms: default_computation_delay_ms(),
            queue_pacing_ms: default_queue_pacing_ms(),
            audit_capacity: default_audit_capacity(),
            transport_latency_ms: default_transport_latency_ms(),
            delivery_failure_rate: 0.0,
        }
    }
}

// Default value functions
fn default_computation_delay_ms() -> u64 {
    500
}

fn default_queue_pacing_ms() -> u64 {
    100
}

fn default_audit_capacity() -> usize {
    DEFAULT_AUDIT_CAPACITY
}

fn default_transport_latency_ms() -> u64 {
    20
}
