// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! # Security Governance
//!
//! Named security policies, the validation gate in front of every
//! computation, and the bounded audit trail recording each governance
//! decision. Owned by the orchestration manager and shared by handle; there
//! is no process-wide policy state.
//!
//! Validation evaluates every defined policy independently (no early exit)
//! and appends exactly one `operation_validation` audit entry per call.
//! The evaluate-and-append sequence runs under the audit lock so concurrent
//! validations never interleave partial writes.

use parking_lot::{Mutex, RwLock};
use rand::RngCore;
use serde_json::json;
use std::collections::HashMap;
use tracing::{debug, info, warn};

use crate::domain::audit::{AuditEntry, AuditLog};
use crate::domain::errors::OrchestrationError;
use crate::domain::policy::{SecurityPolicy, ValidationRequest, ValidationResult};
use crate::domain::security::{
    ComplianceReport, KeyType, SecureKeys, SecurityReport, COMPLIANCE_STANDARDS,
};

pub struct SecurityGovernance {
    policies: RwLock<HashMap<String, SecurityPolicy>>,
    audit: Mutex<AuditLog>,
}

impl SecurityGovernance {
    pub fn new(audit_capacity: usize) -> Self {
        Self {
            policies: RwLock::new(HashMap::new()),
            audit: Mutex::new(AuditLog::new(audit_capacity)),
        }
    }

    /// Insert or replace a policy. An update keeps the original creation
    /// timestamp; both paths refresh `updated_at` and write an audit entry.
    pub fn define_policy(&self, mut policy: SecurityPolicy) -> SecurityPolicy {
        let now = chrono::Utc::now();
        policy.updated_at = now;
        {
            let mut policies = self.policies.write();
            if let Some(existing) = policies.get(&policy.id) {
                policy.created_at = existing.created_at;
            } else {
                policy.created_at = now;
            }
            policies.insert(policy.id.clone(), policy.clone());
        }
        info!(policy_id = %policy.id, policy_name = %policy.name, "security policy defined");
        self.audit.lock().append(AuditEntry::new(
            "policy_defined",
            json!({
                "policy_id": policy.id,
                "policy_name": policy.name,
                "minimum_parties": policy.minimum_parties,
                "require_party_authentication": policy.require_party_authentication,
                "require_encryption": policy.require_encryption,
                "data_sensitivity_levels": policy.data_sensitivity_levels,
            }),
        ));
        policy
    }

    pub fn remove_policy(&self, id: &str) -> Result<SecurityPolicy, OrchestrationError> {
        let removed = self
            .policies
            .write()
            .remove(id)
            .ok_or_else(|| OrchestrationError::PolicyNotFound(id.to_string()))?;
        info!(policy_id = %id, "security policy removed");
        self.audit.lock().append(AuditEntry::new(
            "policy_removed",
            json!({ "policy_id": id }),
        ));
        Ok(removed)
    }

    pub fn get_policy(&self, id: &str) -> Option<SecurityPolicy> {
        self.policies.read().get(id).cloned()
    }

    pub fn policy_count(&self) -> usize {
        self.policies.read().len()
    }

    /// All defined policies, ordered by id for stable output.
    pub fn list_policies(&self) -> Vec<SecurityPolicy> {
        let mut policies: Vec<_> = self.policies.read().values().cloned().collect();
        policies.sort_by(|a, b| a.id.cmp(&b.id));
        policies
    }

    /// Evaluate every defined policy against the proposed operation and
    /// audit the full result list, pass or fail.
    pub fn validate(&self, request: &ValidationRequest) -> Vec<ValidationResult> {
        let mut audit = self.audit.lock();

        let results: Vec<ValidationResult> = {
            let policies = self.policies.read();
            let mut results: Vec<_> = policies
                .values()
                .map(|policy| policy.evaluate(request))
                .collect();
            results.sort_by(|a, b| a.policy_id.cmp(&b.policy_id));
            results
        };

        let failed = results.iter().filter(|result| !result.passed).count();
        if failed > 0 {
            warn!(
                operation = %request.operation,
                failed_policies = failed,
                "operation validation found policy violations"
            );
        } else {
            debug!(operation = %request.operation, "operation validation passed");
        }

        audit.append(AuditEntry::new(
            "operation_validation",
            json!({
                "operation": request.operation,
                "party_ids": request
                    .parties
                    .iter()
                    .map(|party| party.id.to_string())
                    .collect::<Vec<_>>(),
                "data_sensitivity": request.data_sensitivity,
                "encrypted": request.encrypted,
                "results": results,
            }),
        ));
        results
    }

    /// Produce a simulated keypair for the requested algorithm family.
    /// The material is random bytes, hex encoded; nothing here is real
    /// asymmetric cryptography.
    pub fn generate_secure_keys(
        &self,
        key_type: &str,
        size: u32,
    ) -> Result<SecureKeys, OrchestrationError> {
        let (kind, detail, private_len) = match key_type.to_ascii_lowercase().as_str() {
            "rsa" => (KeyType::Rsa, format!("{size}-bit modulus"), size as usize / 8),
            "ec" | "elliptic-curve" => {
                let curve = match size {
                    256 => "P-256",
                    384 => "P-384",
                    521 => "P-521",
                    other => {
                        return Err(OrchestrationError::UnsupportedKeyType(format!(
                            "elliptic-curve with size {other}"
                        )))
                    }
                };
                (KeyType::EllipticCurve, curve.to_string(), (size as usize + 7) / 8)
            }
            other => return Err(OrchestrationError::UnsupportedKeyType(other.to_string())),
        };

        let public_key = random_hex(32);
        let private_key = random_hex(private_len.max(32));
        let fingerprint = public_key[..16].to_string();

        info!(key_type = ?kind, detail = %detail, fingerprint = %fingerprint, "secure keys generated");
        self.audit.lock().append(AuditEntry::new(
            "key_generation",
            json!({
                "key_type": kind,
                "detail": detail,
                "fingerprint": fingerprint,
            }),
        ));

        Ok(SecureKeys {
            key_type: kind,
            detail,
            public_key,
            private_key,
            fingerprint,
            generated_at: chrono::Utc::now(),
        })
    }

    /// Canned findings report for one recognized regulatory standard.
    pub fn check_compliance(&self, standard: &str) -> Result<ComplianceReport, OrchestrationError> {
        let report = self
            .compliance_report(&standard.to_ascii_lowercase())
            .ok_or_else(|| OrchestrationError::UnsupportedStandard(standard.to_string()))?;

        self.audit.lock().append(AuditEntry::new(
            "compliance_check",
            json!({
                "standard": report.standard,
                "compliant": report.compliant,
                "finding_count": report.findings.len(),
            }),
        ));
        Ok(report)
    }

    /// Snapshot of the governance state: policy and audit counts, the most
    /// recent audit entries that contained a failed validation, and a
    /// per-standard compliance summary.
    pub fn generate_security_report(&self) -> SecurityReport {
        let (audit_entry_count, recent_failed_validations) = {
            let audit = self.audit.lock();
            let failed: Vec<AuditEntry> = audit
                .iter()
                .rev()
                .filter(|entry| has_failed_validation(entry))
                .take(10)
                .cloned()
                .collect();
            (audit.len(), failed)
        };

        let compliance = COMPLIANCE_STANDARDS
            .iter()
            .filter_map(|standard| self.compliance_report(standard))
            .collect();

        SecurityReport {
            generated_at: chrono::Utc::now(),
            policy_count: self.policy_count(),
            audit_entry_count,
            recent_failed_validations,
            compliance,
        }
    }

    pub fn audit_entries(&self) -> Vec<AuditEntry> {
        self.audit.lock().snapshot()
    }

    pub fn audit_len(&self) -> usize {
        self.audit.lock().len()
    }

    /// Findings for one standard, without touching the audit log. Shared by
    /// `check_compliance` (which audits) and the report generator (which
    /// must not append while summarizing).
    fn compliance_report(&self, standard: &str) -> Option<ComplianceReport> {
        let policy_count = self.policy_count();
        let findings = match standard {
            "gdpr" => vec![
                "audit trail retention is bounded; no indefinite personal-data history".to_string(),
                "party identifiers are opaque ids, no direct personal data in shares".to_string(),
            ],
            "hipaa" => vec![
                "access to computations is gated by per-operation policy validation".to_string(),
                format!("{policy_count} security policies currently enforce minimum-party rules"),
            ],
            "soc2" => vec![
                "every governance decision is written to the audit trail".to_string(),
                "policy changes are timestamped and attributable by entry id".to_string(),
            ],
            "iso27001" => vec![
                "key material is generated per request and never persisted".to_string(),
                format!("{policy_count} policies cover authentication and encryption controls"),
            ],
            _ => return None,
        };
        Some(ComplianceReport {
            standard: standard.to_string(),
            compliant: policy_count > 0,
            findings,
            checked_at: chrono::Utc::now(),
        })
    }
}

impl Default for SecurityGovernance {
    fn default() -> Self {
        Self::new(crate::domain::audit::DEFAULT_AUDIT_CAPACITY)
    }
}

fn has_failed_validation(entry: &AuditEntry) -> bool {
    entry.event_type == "operation_validation"
        && entry.details["results"]
            .as_array()
            .is_some_and(|results| {
                results
                    .iter()
                    .any(|result| result["passed"] == json!(false))
            })
}

fn random_hex(bytes: usize) -> String {
    let mut buf = vec![0u8; bytes];
    rand::thread_rng().fill_bytes(&mut buf);
    hex::encode(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::party::Party;

    fn governance_with_auth_policy() -> SecurityGovernance {
        let governance = SecurityGovernance::default();
        governance.define_policy(
            SecurityPolicy::new("auth", "Auth Required").require_authentication(true),
        );
        governance
    }

    #[test]
    fn test_define_policy_preserves_creation_timestamp_on_update() {
        let governance = SecurityGovernance::default();
        let first = governance.define_policy(SecurityPolicy::new("p", "Policy"));
        let second =
            governance.define_policy(SecurityPolicy::new("p", "Policy v2").with_minimum_parties(4));

        assert_eq!(second.created_at, first.created_at);
        assert!(second.updated_at >= first.updated_at);
        assert_eq!(governance.policy_count(), 1);
        assert_eq!(governance.get_policy("p").unwrap().minimum_parties, 4);
    }

    #[test]
    fn test_remove_unknown_policy_is_not_found() {
        let governance = SecurityGovernance::default();
        assert!(matches!(
            governance.remove_policy("ghost"),
            Err(OrchestrationError::PolicyNotFound(_))
        ));
    }

    #[test]
    fn test_validate_audits_every_call() {
        let governance = governance_with_auth_policy();
        let before = governance.audit_len();

        let request = ValidationRequest::new(
            "secure_computation",
            vec![Party::authenticated("alice")],
            "low",
        )
        .encrypted();
        let results = governance.validate(&request);

        assert_eq!(results.len(), 1);
        assert!(results[0].passed);
        assert_eq!(governance.audit_len(), before + 1);
        let entry = governance.audit_entries().pop().unwrap();
        assert_eq!(entry.event_type, "operation_validation");
        assert_eq!(entry.details["data_sensitivity"], "low");
    }

    #[test]
    fn test_validate_evaluates_all_policies_without_early_exit() {
        let governance = governance_with_auth_policy();
        governance.define_policy(
            SecurityPolicy::new("size", "Size Rule")
                .with_minimum_parties(3)
                .with_sensitivity_levels(["high"]),
        );

        let request = ValidationRequest::new(
            "secure_computation",
            vec![Party::unauthenticated("eve")],
            "high",
        )
        .encrypted();
        let results = governance.validate(&request);

        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|result| !result.passed));
    }

    #[test]
    fn test_generate_rsa_keys() {
        let governance = SecurityGovernance::default();
        let keys = governance.generate_secure_keys("rsa", 2048).unwrap();
        assert_eq!(keys.key_type, KeyType::Rsa);
        assert_eq!(keys.private_key.len(), 2048 / 8 * 2); // hex doubles
        assert_eq!(&keys.public_key[..16], keys.fingerprint.as_str());
    }

    #[test]
    fn test_generate_ec_keys_maps_size_to_curve() {
        let governance = SecurityGovernance::default();
        let keys = governance.generate_secure_keys("ec", 384).unwrap();
        assert_eq!(keys.key_type, KeyType::EllipticCurve);
        assert_eq!(keys.detail, "P-384");
    }

    #[test]
    fn test_unsupported_key_type_rejected() {
        let governance = SecurityGovernance::default();
        assert!(matches!(
            governance.generate_secure_keys("dsa", 1024),
            Err(OrchestrationError::UnsupportedKeyType(_))
        ));
        assert!(matches!(
            governance.generate_secure_keys("ec", 123),
            Err(OrchestrationError::UnsupportedKeyType(_))
        ));
    }

    #[test]
    fn test_unknown_compliance_standard_rejected() {
        let governance = SecurityGovernance::default();
        assert!(governance.check_compliance("soc2").is_ok());
        assert!(matches!(
            governance.check_compliance("sox"),
            Err(OrchestrationError::UnsupportedStandard(_))
        ));
    }

    #[test]
    fn test_security_report_collects_failed_validations() {
        let governance = governance_with_auth_policy();
        let bad_request = ValidationRequest::new(
            "secure_computation",
            vec![Party::unauthenticated("eve")],
            "low",
        )
        .encrypted();
        governance.validate(&bad_request);

        let report = governance.generate_security_report();
        assert_eq!(report.policy_count, 1);
        assert_eq!(report.recent_failed_validations.len(), 1);
        assert_eq!(report.compliance.len(), COMPLIANCE_STANDARDS.len());
        // summarizing must not grow the audit trail
        assert_eq!(report.audit_entry_count, governance.audit_len());
    }
}
