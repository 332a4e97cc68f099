// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Failure-threshold tests for the computation session, driven through a
//! scripted transport: strictly more than half of the parties failing a
//! stage aborts the round; exactly half (or fewer) does not.

use async_trait::async_trait;
use serde_json::json;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use aegis_mpc_core::application::server::ComputationServer;
use aegis_mpc_core::config::OrchestratorConfig;
use aegis_mpc_core::domain::errors::TransportError;
use aegis_mpc_core::domain::party::{Party, PartyId};
use aegis_mpc_core::domain::session::{ComputationId, ComputationOutcome, Share};
use aegis_mpc_core::infrastructure::protocol::SimulatedSecretSharing;
use aegis_mpc_core::infrastructure::transport::PartyTransport;

/// Transport double that fails scripted parties and reports a fixed value
/// for everyone else.
#[derive(Default)]
struct ScriptedTransport {
    fail_delivery: HashSet<PartyId>,
    fail_collection: HashSet<PartyId>,
    result_value: f64,
    retrievals: AtomicUsize,
}

impl ScriptedTransport {
    fn retrieval_count(&self) -> usize {
        self.retrievals.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PartyTransport for ScriptedTransport {
    async fn deliver_share(&self, party: &Party, _share: &Share) -> Result<(), TransportError> {
        if self.fail_delivery.contains(&party.id) {
            return Err(TransportError("scripted delivery failure".to_string()));
        }
        Ok(())
    }

    async fn retrieve_result(
        &self,
        party: &Party,
        _computation_id: ComputationId,
    ) -> Result<f64, TransportError> {
        self.retrievals.fetch_add(1, Ordering::SeqCst);
        if self.fail_collection.contains(&party.id) {
            return Err(TransportError("scripted retrieval failure".to_string()));
        }
        Ok(self.result_value)
    }
}

fn scripted_server(
    parties: Vec<Party>,
    transport: Arc<ScriptedTransport>,
) -> Arc<ComputationServer> {
    ComputationServer::with_collaborators(
        "scripted",
        parties,
        false,
        &OrchestratorConfig::fast(),
        transport,
        Arc::new(SimulatedSecretSharing),
    )
}

fn parties(count: usize) -> Vec<Party> {
    (0..count)
        .map(|i| Party::authenticated(format!("party-{i}")))
        .collect()
}

#[tokio::test]
async fn test_distribution_majority_failure_aborts_without_collection() {
    let roster = parties(4);
    let transport = Arc::new(ScriptedTransport {
        fail_delivery: roster.iter().take(3).map(|p| p.id).collect(),
        result_value: 10.0,
        ..ScriptedTransport::default()
    });
    let server = scripted_server(roster, Arc::clone(&transport));

    let outcome = server.execute_secure_computation("sum", &json!({})).await;

    assert_eq!(
        outcome.error().unwrap(),
        "too many parties failed during share distribution (3 of 4)"
    );
    // the session never reached the collection stage
    assert_eq!(transport.retrieval_count(), 0);
}

#[tokio::test]
async fn test_exactly_half_delivery_failures_proceeds_to_collection() {
    let roster = parties(4);
    let transport = Arc::new(ScriptedTransport {
        fail_delivery: roster.iter().take(2).map(|p| p.id).collect(),
        result_value: 10.0,
        ..ScriptedTransport::default()
    });
    let server = scripted_server(roster, Arc::clone(&transport));

    let outcome = server.execute_secure_computation("sum", &json!({})).await;

    assert!(outcome.is_success());
    assert_eq!(outcome.result(), Some(10.0));
    assert_eq!(transport.retrieval_count(), 4);
}

#[tokio::test]
async fn test_collection_majority_failure_aborts() {
    let roster = parties(3);
    let transport = Arc::new(ScriptedTransport {
        fail_collection: roster.iter().take(2).map(|p| p.id).collect(),
        result_value: 10.0,
        ..ScriptedTransport::default()
    });
    let server = scripted_server(roster, transport);

    let outcome = server.execute_secure_computation("sum", &json!({})).await;

    assert_eq!(
        outcome.error().unwrap(),
        "too many parties failed during result collection (2 of 3)"
    );
}

#[tokio::test]
async fn test_collection_half_failures_aggregates_over_survivors() {
    let roster = parties(4);
    let transport = Arc::new(ScriptedTransport {
        fail_collection: roster.iter().take(2).map(|p| p.id).collect(),
        result_value: 42.0,
        ..ScriptedTransport::default()
    });
    let server = scripted_server(roster, transport);

    let outcome = server.execute_secure_computation("sum", &json!({})).await;

    match outcome {
        ComputationOutcome::Success {
            result,
            party_results,
            ..
        } => {
            assert_eq!(result, 42.0);
            assert_eq!(party_results.len(), 2);
        }
        ComputationOutcome::Error { error, .. } => panic!("expected success, got: {error}"),
    }
}

#[tokio::test]
async fn test_failed_session_still_occupies_the_live_slot() {
    let roster = parties(2);
    let transport = Arc::new(ScriptedTransport {
        fail_delivery: roster.iter().map(|p| p.id).collect(),
        ..ScriptedTransport::default()
    });
    let server = scripted_server(roster, transport);

    let outcome = server.execute_secure_computation("sum", &json!({})).await;
    assert!(!outcome.is_success());

    // the failed session superseded any earlier pointer but stored no result
    assert!(server.current_computation().is_some());
    assert!(server.last_result().is_none());
}

#[tokio::test]
async fn test_new_session_supersedes_the_previous_one() {
    let roster = parties(2);
    let transport = Arc::new(ScriptedTransport {
        result_value: 7.0,
        ..ScriptedTransport::default()
    });
    let server = scripted_server(roster, transport);

    server.execute_secure_computation("first", &json!({})).await;
    let first_id = server.current_computation().unwrap();

    server.execute_secure_computation("second", &json!({})).await;
    let second_id = server.current_computation().unwrap();

    assert_ne!(first_id, second_id);
    assert_eq!(server.last_result(), Some(7.0));
}
