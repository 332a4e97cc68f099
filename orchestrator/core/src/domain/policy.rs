// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Security policies and per-policy validation results.
//!
//! Policies are named rule sets evaluated independently on every validation
//! call. A policy's minimum-party rule only applies when the policy declares
//! the requested data-sensitivity level among its scoped levels.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::domain::party::Party;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecurityPolicy {
    pub id: String,
    pub name: String,
    pub description: String,
    pub require_party_authentication: bool,
    pub minimum_parties: usize,
    pub require_encryption: bool,
    pub data_sensitivity_levels: BTreeSet<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SecurityPolicy {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            require_party_authentication: false,
            minimum_parties: 0,
            require_encryption: false,
            data_sensitivity_levels: BTreeSet::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn require_authentication(mut self, required: bool) -> Self {
        self.require_party_authentication = required;
        self
    }

    pub fn with_minimum_parties(mut self, minimum: usize) -> Self {
        self.minimum_parties = minimum;
        self
    }

    pub fn require_encryption(mut self, required: bool) -> Self {
        self.require_encryption = required;
        self
    }

    pub fn with_sensitivity_levels<I, S>(mut self, levels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.data_sensitivity_levels = levels.into_iter().map(Into::into).collect();
        self
    }

    /// Evaluate this policy against a proposed operation. All rule checks run;
    /// the result carries one violation message per broken rule.
    pub fn evaluate(&self, request: &ValidationRequest) -> ValidationResult {
        let mut violations = Vec::new();

        if self.require_party_authentication {
            for party in request
                .parties
                .iter()
                .filter(|party| !party.authenticated)
            {
                violations.push(format!(
                    "party {} ({}) is not authenticated",
                    party.id, party.display_name
                ));
            }
        }

        if self
            .data_sensitivity_levels
            .contains(&request.data_sensitivity)
            && request.parties.len() < self.minimum_parties
        {
            violations.push(format!(
                "{} sensitivity requires at least {} parties, got {}",
                request.data_sensitivity,
                self.minimum_parties,
                request.parties.len()
            ));
        }

        if self.require_encryption && !request.encrypted {
            violations.push(format!(
                "operation '{}' is not marked encrypted",
                request.operation
            ));
        }

        ValidationResult {
            policy_id: self.id.clone(),
            policy_name: self.name.clone(),
            passed: violations.is_empty(),
            violations,
        }
    }
}

/// A proposed operation submitted for policy validation: the operation
/// label, a snapshot of the participating parties, the declared data
/// sensitivity, and whether the operation runs over an encrypted channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationRequest {
    pub operation: String,
    pub parties: Vec<Party>,
    pub data_sensitivity: String,
    pub encrypted: bool,
}

impl ValidationRequest {
    pub fn new(
        operation: impl Into<String>,
        parties: Vec<Party>,
        data_sensitivity: impl Into<String>,
    ) -> Self {
        Self {
            operation: operation.into(),
            parties,
            data_sensitivity: data_sensitivity.into(),
            encrypted: false,
        }
    }

    pub fn encrypted(mut self) -> Self {
        self.encrypted = true;
        self
    }
}

/// Outcome of evaluating one policy against one operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    pub policy_id: String,
    pub policy_name: String,
    pub passed: bool,
    pub violations: Vec<String>,
}
