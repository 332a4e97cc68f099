// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Computation session state: one end-to-end run of the
//! distribute / compute / collect / aggregate protocol.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::domain::party::{Party, PartyId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ComputationId(pub Uuid);

impl ComputationId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ComputationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ComputationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Protocol stages, strictly sequential. There is no branching back; a
/// session either walks the full chain or drops into `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionStatus {
    Init,
    Distributing,
    AwaitingComputation,
    Collecting,
    Aggregating,
    Succeeded,
    Failed,
}

/// Per-party wrapper around the raw input. This is the simulated stand-in
/// for a cryptographic split: the payload is carried whole, tagged with the
/// receiving party and a random nonce.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Share {
    pub computation_id: ComputationId,
    pub party_id: PartyId,
    pub payload: serde_json::Value,
    pub nonce: u64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartyResult {
    pub party_id: PartyId,
    pub value: f64,
    pub reported_at: DateTime<Utc>,
}

impl PartyResult {
    pub fn new(party_id: PartyId, value: f64) -> Self {
        Self {
            party_id,
            value,
            reported_at: Utc::now(),
        }
    }
}

/// Ephemeral per-invocation state. Created at the start of a secure
/// computation, superseded at the end; the owning server keeps only the id
/// of the most recently started session.
#[derive(Debug, Clone)]
pub struct ComputationSession {
    id: ComputationId,
    task: String,
    parties: Vec<Party>,
    status: SessionStatus,
    shares: Vec<Share>,
    party_results: Vec<PartyResult>,
}

impl ComputationSession {
    pub fn new(task: impl Into<String>, parties: Vec<Party>) -> Self {
        Self {
            id: ComputationId::new(),
            task: task.into(),
            parties,
            status: SessionStatus::Init,
            shares: Vec::new(),
            party_results: Vec::new(),
        }
    }

    pub fn id(&self) -> ComputationId {
        self.id
    }

    pub fn task(&self) -> &str {
        &self.task
    }

    pub fn parties(&self) -> &[Party] {
        &self.parties
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn shares(&self) -> &[Share] {
        &self.shares
    }

    pub fn party_results(&self) -> &[PartyResult] {
        &self.party_results
    }

    pub fn begin_distribution(&mut self) {
        self.status = SessionStatus::Distributing;
    }

    pub fn record_share(&mut self, share: Share) {
        self.shares.push(share);
    }

    pub fn begin_await(&mut self) {
        self.status = SessionStatus::AwaitingComputation;
    }

    pub fn begin_collection(&mut self) {
        self.status = SessionStatus::Collecting;
    }

    pub fn record_result(&mut self, result: PartyResult) {
        self.party_results.push(result);
    }

    pub fn begin_aggregation(&mut self) {
        self.status = SessionStatus::Aggregating;
    }

    pub fn succeed(&mut self) {
        self.status = SessionStatus::Succeeded;
    }

    pub fn fail(&mut self) {
        self.status = SessionStatus::Failed;
    }
}

/// The value every execution entry point returns. Protocol-level failures
/// are captured into the `Error` variant, never raised past the session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ComputationOutcome {
    Success {
        computation_id: ComputationId,
        task: String,
        result: f64,
        party_results: Vec<PartyResult>,
    },
    Error {
        task: String,
        error: String,
    },
}

impl ComputationOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn result(&self) -> Option<f64> {
        match self {
            Self::Success { result, .. } => Some(*result),
            Self::Error { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Success { .. } => None,
            Self::Error { error, .. } => Some(error),
        }
    }

    pub fn task(&self) -> &str {
        match self {
            Self::Success { task, .. } | Self::Error { task, .. } => task,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_walks_the_stage_chain() {
        let parties = vec![Party::authenticated("alice"), Party::authenticated("bob")];
        let mut session = ComputationSession::new("sum", parties);
        assert_eq!(session.status(), SessionStatus::Init);

        session.begin_distribution();
        assert_eq!(session.status(), SessionStatus::Distributing);
        session.begin_await();
        assert_eq!(session.status(), SessionStatus::AwaitingComputation);
        session.begin_collection();
        assert_eq!(session.status(), SessionStatus::Collecting);
        session.begin_aggregation();
        assert_eq!(session.status(), SessionStatus::Aggregating);
        session.succeed();
        assert_eq!(session.status(), SessionStatus::Succeeded);
    }

    #[test]
    fn test_fresh_sessions_get_distinct_ids() {
        let first = ComputationSession::new("sum", vec![]);
        let second = ComputationSession::new("sum", vec![]);
        assert_ne!(first.id(), second.id());
    }

    #[test]
    fn test_outcome_accessors() {
        let success = ComputationOutcome::Success {
            computation_id: ComputationId::new(),
            task: "sum".to_string(),
            result: 12.5,
            party_results: vec![],
        };
        assert!(success.is_success());
        assert_eq!(success.result(), Some(12.5));
        assert!(success.error().is_none());

        let failure = ComputationOutcome::Error {
            task: "sum".to_string(),
            error: "boom".to_string(),
        };
        assert!(!failure.is_success());
        assert_eq!(failure.error(), Some("boom"));
        assert_eq!(failure.task(), "sum");
    }

    #[test]
    fn test_outcome_serializes_with_status_tag() {
        let failure = ComputationOutcome::Error {
            task: "sum".to_string(),
            error: "boom".to_string(),
        };
        let value = serde_json::to_value(&failure).unwrap();
        assert_eq!(value["status"], "error");
        assert_eq!(value["error"], "boom");
    }
}
