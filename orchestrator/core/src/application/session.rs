// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! # Computation Session Runner
//!
//! Drives one secure-computation round through its strictly sequential
//! stages: distribute shares, await the simulated remote computation,
//! collect per-party results, aggregate. A stage aborts the round when
//! strictly more than half of the parties fail it; the abort is captured
//! into an error-valued [`ComputationOutcome`] and never thrown past the
//! runner, so batch callers always receive a structured result.
//!
//! Every stage transition emits a protocol trace record tagged with the
//! computation id. These records are a lower-level side channel, distinct
//! from the governance audit log.

use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::domain::errors::SessionError;
use crate::domain::session::{ComputationOutcome, ComputationSession, PartyResult};
use crate::infrastructure::protocol::ProtocolStrategy;
use crate::infrastructure::transport::PartyTransport;

pub struct SessionRunner {
    protocol: Arc<dyn ProtocolStrategy>,
    transport: Arc<dyn PartyTransport>,
    computation_delay: Duration,
}

impl SessionRunner {
    pub fn new(
        protocol: Arc<dyn ProtocolStrategy>,
        transport: Arc<dyn PartyTransport>,
        computation_delay: Duration,
    ) -> Self {
        Self {
            protocol,
            transport,
            computation_delay,
        }
    }

    /// Run the session to a terminal state and return its outcome.
    pub async fn run(
        &self,
        session: &mut ComputationSession,
        input: &serde_json::Value,
    ) -> ComputationOutcome {
        let computation_id = session.id();
        info!(
            computation_id = %computation_id,
            task = session.task(),
            parties = session.parties().len(),
            protocol = self.protocol.name(),
            "computation session started"
        );

        match self.drive(session, input).await {
            Ok(result) => {
                session.succeed();
                info!(computation_id = %computation_id, result, "computation session succeeded");
                ComputationOutcome::Success {
                    computation_id,
                    task: session.task().to_string(),
                    result,
                    party_results: session.party_results().to_vec(),
                }
            }
            Err(err) => {
                session.fail();
                warn!(computation_id = %computation_id, error = %err, "computation session failed");
                ComputationOutcome::Error {
                    task: session.task().to_string(),
                    error: err.to_string(),
                }
            }
        }
    }

    async fn drive(
        &self,
        session: &mut ComputationSession,
        input: &serde_json::Value,
    ) -> Result<f64, SessionError> {
        let computation_id = session.id();
        let parties = session.parties().to_vec();
        let total = parties.len();

        // Distributing: one share per registered party, deliveries in flight
        // together, each succeeding or failing on its own.
        session.begin_distribution();
        debug!(computation_id = %computation_id, "distributing shares");
        let deliveries = parties.iter().map(|party| {
            let share = self.protocol.make_share(computation_id, party, input);
            async move {
                let delivered = self.transport.deliver_share(party, &share).await;
                (party, share, delivered)
            }
        });
        let mut failed = 0usize;
        for (party, share, delivered) in join_all(deliveries).await {
            match delivered {
                Ok(()) => session.record_share(share),
                Err(err) => {
                    failed += 1;
                    warn!(
                        computation_id = %computation_id,
                        party_id = %party.id,
                        error = %err,
                        "share delivery failed"
                    );
                }
            }
        }
        if failed * 2 > total {
            return Err(SessionError::DistributionThreshold { failed, total });
        }

        // AwaitingComputation: fixed synthetic delay, cannot fail.
        session.begin_await();
        debug!(computation_id = %computation_id, "awaiting party computation");
        tokio::time::sleep(self.computation_delay).await;

        // Collecting: same strict-majority threshold as distribution.
        session.begin_collection();
        debug!(computation_id = %computation_id, "collecting results");
        let retrievals = parties.iter().map(|party| async move {
            let retrieved = self.transport.retrieve_result(party, computation_id).await;
            (party, retrieved)
        });
        let mut failed = 0usize;
        for (party, retrieved) in join_all(retrievals).await {
            match retrieved {
                Ok(value) => session.record_result(PartyResult::new(party.id, value)),
                Err(err) => {
                    failed += 1;
                    warn!(
                        computation_id = %computation_id,
                        party_id = %party.id,
                        error = %err,
                        "result retrieval failed"
                    );
                }
            }
        }
        if failed * 2 > total {
            return Err(SessionError::CollectionThreshold { failed, total });
        }

        // Aggregating over the successful results only. The empty case is a
        // defensive double-check: it cannot occur once the collection
        // threshold passed with at least one success.
        session.begin_aggregation();
        debug!(
            computation_id = %computation_id,
            results = session.party_results().len(),
            "aggregating results"
        );
        self.protocol
            .reconstruct(session.party_results())
            .ok_or(SessionError::EmptyAggregation)
    }
}
