// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Pluggable protocol strategy: how shares are synthesized and how collected
//! results are reconstructed into one value. The session state machine never
//! depends on a concrete protocol, so a real cryptographic backend can be
//! substituted without touching it.

use chrono::Utc;
use rand::Rng;

use crate::domain::party::Party;
use crate::domain::session::{ComputationId, PartyResult, Share};

pub trait ProtocolStrategy: Send + Sync {
    fn name(&self) -> &str;

    /// Synthesize the share delivered to one party.
    fn make_share(
        &self,
        computation_id: ComputationId,
        party: &Party,
        input: &serde_json::Value,
    ) -> Share;

    /// Combine successfully-collected results into the final value.
    /// Returns `None` when there is nothing to reconstruct from.
    fn reconstruct(&self, results: &[PartyResult]) -> Option<f64>;
}

/// The simulated protocol: the share wraps the raw input whole, tagged with
/// the party and a random nonce (no cryptographic splitting), and
/// reconstruction is the arithmetic mean of the numeric results.
#[derive(Debug, Default)]
pub struct SimulatedSecretSharing;

impl ProtocolStrategy for SimulatedSecretSharing {
    fn name(&self) -> &str {
        "simulated-secret-sharing"
    }

    fn make_share(
        &self,
        computation_id: ComputationId,
        party: &Party,
        input: &serde_json::Value,
    ) -> Share {
        Share {
            computation_id,
            party_id: party.id,
            payload: input.clone(),
            nonce: rand::thread_rng().gen(),
            created_at: Utc::now(),
        }
    }

    fn reconstruct(&self, results: &[PartyResult]) -> Option<f64> {
        if results.is_empty() {
            return None;
        }
        let sum: f64 = results.iter().map(|r| r.value).sum();
        Some(sum / results.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::party::PartyId;

    fn result(value: f64) -> PartyResult {
        PartyResult::new(PartyId::new(), value)
    }

    #[test]
    fn test_reconstruct_is_arithmetic_mean() {
        let protocol = SimulatedSecretSharing;
        let results = vec![result(1.0), result(2.0), result(6.0)];
        assert_eq!(protocol.reconstruct(&results), Some(3.0));
    }

    #[test]
    fn test_reconstruct_empty_is_none() {
        let protocol = SimulatedSecretSharing;
        assert_eq!(protocol.reconstruct(&[]), None);
    }

    #[test]
    fn test_share_is_tagged_with_party_and_computation() {
        let protocol = SimulatedSecretSharing;
        let party = Party::authenticated("alice");
        let computation_id = ComputationId::new();
        let input = serde_json::json!({ "values": [1, 2, 3] });

        let share = protocol.make_share(computation_id, &party, &input);
        assert_eq!(share.computation_id, computation_id);
        assert_eq!(share.party_id, party.id);
        assert_eq!(share.payload, input);
    }
}
