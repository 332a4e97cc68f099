// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Error taxonomy for the orchestrator core.
//!
//! `OrchestrationError` propagates to the immediate caller: policy blocks
//! and misuse (unknown names, unsupported algorithms). `SessionError` never
//! crosses the session boundary; it is captured into an error-valued
//! `ComputationOutcome` so batch operations keep going.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum OrchestrationError {
    #[error("policy validation failed: {}", violations.join("; "))]
    PolicyViolation { violations: Vec<String> },

    #[error("server not found: {0}")]
    ServerNotFound(String),

    #[error("policy not found: {0}")]
    PolicyNotFound(String),

    #[error("unsupported key type: {0}")]
    UnsupportedKeyType(String),

    #[error("unsupported compliance standard: {0}")]
    UnsupportedStandard(String),
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("too many parties failed during share distribution ({failed} of {total})")]
    DistributionThreshold { failed: usize, total: usize },

    #[error("too many parties failed during result collection ({failed} of {total})")]
    CollectionThreshold { failed: usize, total: usize },

    #[error("no valid results received from parties")]
    EmptyAggregation,
}

#[derive(Debug, Clone, Error)]
#[error("party transport failure: {0}")]
pub struct TransportError(pub String);
