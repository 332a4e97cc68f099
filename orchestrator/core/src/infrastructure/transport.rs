// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Party transport seam. The session only depends on per-party
//! success/failure of share delivery and result retrieval, not on any
//! concrete network mechanism.

use async_trait::async_trait;
use rand::Rng;
use std::time::Duration;

use crate::config::OrchestratorConfig;
use crate::domain::errors::TransportError;
use crate::domain::party::Party;
use crate::domain::session::{ComputationId, Share};

#[async_trait]
pub trait PartyTransport: Send + Sync {
    /// Deliver one share to one party. Each delivery independently
    /// succeeds or fails.
    async fn deliver_share(&self, party: &Party, share: &Share) -> Result<(), TransportError>;

    /// Request one party's computed result.
    async fn retrieve_result(
        &self,
        party: &Party,
        computation_id: ComputationId,
    ) -> Result<f64, TransportError>;
}

/// In-memory stand-in for the party network: a fixed per-call latency, an
/// optional injected delivery failure rate, and synthetic numeric results.
#[derive(Debug, Clone)]
pub struct SimulatedPartyNetwork {
    latency: Duration,
    failure_rate: f64,
}

impl SimulatedPartyNetwork {
    pub fn new(latency: Duration, failure_rate: f64) -> Self {
        Self {
            latency,
            failure_rate: failure_rate.clamp(0.0, 1.0),
        }
    }

    pub fn from_config(config: &OrchestratorConfig) -> Self {
        Self::new(config.transport_latency(), config.delivery_failure_rate)
    }

    fn roll_failure(&self) -> bool {
        self.failure_rate > 0.0 && rand::thread_rng().gen::<f64>() < self.failure_rate
    }
}

impl Default for SimulatedPartyNetwork {
    fn default() -> Self {
        Self::from_config(&OrchestratorConfig::default())
    }
}

#[async_trait]
impl PartyTransport for SimulatedPartyNetwork {
    async fn deliver_share(&self, party: &Party, share: &Share) -> Result<(), TransportError> {
        // roll before awaiting: the thread-local rng cannot be held across it
        let failed = self.roll_failure();
        tokio::time::sleep(self.latency).await;
        if failed {
            return Err(TransportError(format!(
                "share {} delivery to party {} failed",
                share.nonce, party.id
            )));
        }
        Ok(())
    }

    async fn retrieve_result(
        &self,
        party: &Party,
        computation_id: ComputationId,
    ) -> Result<f64, TransportError> {
        let failed = self.roll_failure();
        let value = rand::thread_rng().gen_range(0.0..100.0);
        tokio::time::sleep(self.latency).await;
        if failed {
            return Err(TransportError(format!(
                "result retrieval from party {} failed for computation {}",
                party.id, computation_id
            )));
        }
        Ok(value)
    }
}
