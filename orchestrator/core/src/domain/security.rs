// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Value types for key generation, compliance checks, and the aggregated
//! security report. Key material here is simulated: random bytes, never a
//! real asymmetric keypair.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::audit::AuditEntry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum KeyType {
    Rsa,
    EllipticCurve,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecureKeys {
    pub key_type: KeyType,
    /// Modulus bits for RSA, named curve for elliptic-curve keys.
    pub detail: String,
    pub public_key: String,
    pub private_key: String,
    pub fingerprint: String,
    pub generated_at: DateTime<Utc>,
}

/// Regulatory standards with canned findings reports.
pub const COMPLIANCE_STANDARDS: [&str; 4] = ["gdpr", "hipaa", "soc2", "iso27001"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplianceReport {
    pub standard: String,
    pub compliant: bool,
    pub findings: Vec<String>,
    pub checked_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityReport {
    pub generated_at: DateTime<Utc>,
    pub policy_count: usize,
    pub audit_entry_count: usize,
    /// Up to the 10 newest audit entries containing a failed validation.
    pub recent_failed_validations: Vec<AuditEntry>,
    pub compliance: Vec<ComplianceReport>,
}
